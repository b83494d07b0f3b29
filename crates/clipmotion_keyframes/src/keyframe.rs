// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the animation engine.

use crate::property::PropertyTag;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Easing rule shaping the curve from a keyframe to its successor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum EasingKind {
    /// Constant-rate interpolation
    #[default]
    Linear,
    /// Slow start, fast finish
    EaseIn,
    /// Fast start, slow finish
    EaseOut,
    /// Slow start and finish
    EaseInOut,
    /// Explicit control points, normalized to the segment's time/value
    /// deltas (both axes in `[0, 1]`)
    Custom {
        /// First control point as `[time_fraction, value_fraction]`
        cp1: [f64; 2],
        /// Second control point as `[time_fraction, value_fraction]`
        cp2: [f64; 2],
    },
}

impl EasingKind {
    /// Control point offsets as fractions of the segment's time/value
    /// deltas. The named easings use fixed design constants (the CSS
    /// `cubic-bezier` presets, plus a thirds rule for Linear) and must
    /// not be altered: stored projects depend on them.
    pub fn control_offsets(&self) -> ([f64; 2], [f64; 2]) {
        match self {
            Self::Linear => ([0.33, 0.33], [0.67, 0.67]),
            Self::EaseIn => ([0.42, 0.0], [1.0, 1.0]),
            Self::EaseOut => ([0.0, 0.0], [0.58, 1.0]),
            Self::EaseInOut => ([0.42, 0.0], [0.58, 1.0]),
            Self::Custom { cp1, cp2 } => {
                // Time fractions outside [0,1] would make the segment
                // non-invertible in time; clamp them, leave value free.
                (
                    [cp1[0].clamp(0.0, 1.0), cp1[1]],
                    [cp2[0].clamp(0.0, 1.0), cp2[1]],
                )
            }
        }
    }
}

/// A stored sample of an animatable property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Owning property track
    pub property: PropertyTag,
    /// Time in seconds
    pub time: f64,
    /// Property value at this time
    pub value: f64,
    /// Easing towards the next keyframe
    pub easing: EasingKind,
}

impl Keyframe {
    /// Create a new keyframe with linear easing
    pub fn new(property: PropertyTag, time: f64, value: f64) -> Self {
        Self {
            id: KeyframeId::new(),
            property,
            time,
            value,
            easing: EasingKind::default(),
        }
    }

    /// Set the easing kind
    pub fn with_easing(mut self, easing: EasingKind) -> Self {
        self.easing = easing;
        self
    }
}

/// Persistence shape of one keyframe. Ids are session-local and are
/// regenerated on import, so records carry only `{time, value, easing}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeRecord {
    /// Time in seconds
    pub time: f64,
    /// Property value
    pub value: f64,
    /// Easing towards the next keyframe
    pub easing: EasingKind,
}

impl From<&Keyframe> for KeyframeRecord {
    fn from(kf: &Keyframe) -> Self {
        Self {
            time: kf.time,
            value: kf.value,
            easing: kf.easing,
        }
    }
}

impl KeyframeRecord {
    /// Rehydrate into a keyframe with a fresh id
    pub fn into_keyframe(self, property: PropertyTag) -> Keyframe {
        Keyframe::new(property, self.time, self.value).with_easing(self.easing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_offsets_are_css_presets() {
        assert_eq!(
            EasingKind::EaseInOut.control_offsets(),
            ([0.42, 0.0], [0.58, 1.0])
        );
        assert_eq!(
            EasingKind::EaseIn.control_offsets(),
            ([0.42, 0.0], [1.0, 1.0])
        );
        assert_eq!(
            EasingKind::EaseOut.control_offsets(),
            ([0.0, 0.0], [0.58, 1.0])
        );
        assert_eq!(
            EasingKind::Linear.control_offsets(),
            ([0.33, 0.33], [0.67, 0.67])
        );
    }

    #[test]
    fn test_custom_time_fractions_clamped() {
        let easing = EasingKind::Custom {
            cp1: [-0.5, 0.3],
            cp2: [1.8, -0.2],
        };
        let (cp1, cp2) = easing.control_offsets();
        assert_eq!(cp1, [0.0, 0.3]);
        assert_eq!(cp2, [1.0, -0.2]);
    }

    #[test]
    fn test_record_round_trip() {
        let kf = Keyframe::new(PropertyTag::Opacity, 1.5, 0.25).with_easing(EasingKind::EaseIn);
        let record = KeyframeRecord::from(&kf);
        let back = record.into_keyframe(PropertyTag::Opacity);
        assert_eq!(back.time, kf.time);
        assert_eq!(back.value, kf.value);
        assert_eq!(back.easing, kf.easing);
        // Ids are intentionally not stable across persistence
        assert_ne!(back.id, kf.id);
    }
}
