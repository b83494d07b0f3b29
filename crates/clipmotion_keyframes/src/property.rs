// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable property registry.

use serde::{Deserialize, Serialize};

/// An animatable clip property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyTag {
    /// Uniform scale factor
    Scale,
    /// Rotation in degrees
    Rotation,
    /// Horizontal position offset
    PositionX,
    /// Vertical position offset
    PositionY,
    /// Layer opacity
    Opacity,
    /// Audio volume
    Volume,
    /// Brightness adjustment
    Brightness,
    /// Contrast adjustment
    Contrast,
    /// Saturation adjustment
    Saturation,
}

/// Inclusive value range for a property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyRange {
    /// Lowest storable value
    pub min: f64,
    /// Highest storable value
    pub max: f64,
}

impl PropertyRange {
    /// Create a new range
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a value into this range
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Midpoint of the range, used as the value for keyframes added
    /// without an explicit value
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Width of the range
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Whether a value lies inside the range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl PropertyTag {
    /// All animatable properties, in panel display order
    pub const ALL: [PropertyTag; 9] = [
        Self::Scale,
        Self::Rotation,
        Self::PositionX,
        Self::PositionY,
        Self::Opacity,
        Self::Volume,
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
    ];

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scale => "Scale",
            Self::Rotation => "Rotation",
            Self::PositionX => "Position X",
            Self::PositionY => "Position Y",
            Self::Opacity => "Opacity",
            Self::Volume => "Volume",
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Saturation => "Saturation",
        }
    }

    /// Get the value range used for clamping and for slider bounds
    pub fn range(&self) -> PropertyRange {
        match self {
            Self::Scale => PropertyRange::new(0.0, 4.0),
            Self::Rotation => PropertyRange::new(0.0, 360.0),
            Self::PositionX | Self::PositionY => PropertyRange::new(-1000.0, 1000.0),
            Self::Opacity | Self::Volume => PropertyRange::new(0.0, 1.0),
            Self::Brightness => PropertyRange::new(-1.0, 1.0),
            Self::Contrast | Self::Saturation => PropertyRange::new(0.0, 2.0),
        }
    }

    /// Neutral value of an un-animated property, returned by evaluation
    /// when a track has no keyframes
    pub fn default_value(&self) -> f64 {
        match self {
            Self::Scale | Self::Opacity | Self::Volume | Self::Contrast | Self::Saturation => 1.0,
            Self::Rotation | Self::PositionX | Self::PositionY | Self::Brightness => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_range() {
        for tag in PropertyTag::ALL {
            let range = tag.range();
            assert!(
                range.contains(tag.default_value()),
                "{} default outside range",
                tag.name()
            );
        }
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(PropertyTag::Opacity.range().midpoint(), 0.5);
        assert_eq!(PropertyTag::Rotation.range().midpoint(), 180.0);
        assert_eq!(PropertyTag::Brightness.range().midpoint(), 0.0);
    }

    #[test]
    fn test_clamp() {
        let range = PropertyTag::Opacity.range();
        assert_eq!(range.clamp(1.5), 1.0);
        assert_eq!(range.clamp(-0.2), 0.0);
        assert_eq!(range.clamp(0.7), 0.7);
    }
}
