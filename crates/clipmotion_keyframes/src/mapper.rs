// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bidirectional (time, value) ↔ (x, y) graph transforms.
//!
//! Pure and stateless: a mapper is a value parameterized by the curve
//! graph's pixel dimensions, the clip duration and the property range.
//! Time maps left-to-right, value maps bottom-to-top (y grows downward
//! in screen space). Each transform is the exact inverse of its partner
//! within floating-point tolerance.

use crate::property::{PropertyRange, PropertyTag};

/// Pixel-space transform for one property's curve graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphMapper {
    width: f64,
    height: f64,
    duration: f64,
    range: PropertyRange,
}

impl GraphMapper {
    /// Create a mapper for a graph of `width` x `height` pixels showing
    /// `duration` seconds of the given value range
    pub fn new(width: f64, height: f64, duration: f64, range: PropertyRange) -> Self {
        Self {
            width,
            height,
            duration,
            range,
        }
    }

    /// Create a mapper using a property's registered range
    pub fn for_property(width: f64, height: f64, duration: f64, property: PropertyTag) -> Self {
        Self::new(width, height, duration, property.range())
    }

    /// Convert a time to an x position
    pub fn time_to_x(&self, time: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (time / self.duration) * self.width
    }

    /// Convert an x position to a time
    pub fn x_to_time(&self, x: f64) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        (x / self.width) * self.duration
    }

    /// Convert a value to a y position
    pub fn value_to_y(&self, value: f64) -> f64 {
        let span = self.range.span();
        if span <= 0.0 {
            return self.height;
        }
        self.height - ((value - self.range.min) / span) * self.height
    }

    /// Convert a y position to a value
    pub fn y_to_value(&self, y: f64) -> f64 {
        if self.height <= 0.0 {
            return self.range.min;
        }
        self.range.min + ((self.height - y) / self.height) * self.range.span()
    }

    /// Convert a pixel position to a `(time, value)` pair
    pub fn point_to_time_value(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x_to_time(x), self.y_to_value(y))
    }

    /// Convert a `(time, value)` pair to a pixel position
    pub fn time_value_to_point(&self, time: f64, value: f64) -> (f64, f64) {
        (self.time_to_x(time), self.value_to_y(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn mapper() -> GraphMapper {
        GraphMapper::for_property(640.0, 240.0, 8.0, PropertyTag::Rotation)
    }

    #[test]
    fn test_time_endpoints() {
        let m = mapper();
        assert_eq!(m.time_to_x(0.0), 0.0);
        assert_eq!(m.time_to_x(8.0), 640.0);
        assert_eq!(m.time_to_x(4.0), 320.0);
    }

    #[test]
    fn test_value_axis_is_flipped() {
        let m = mapper();
        // min at the bottom of the graph, max at the top
        assert_eq!(m.value_to_y(0.0), 240.0);
        assert_eq!(m.value_to_y(360.0), 0.0);
        assert_eq!(m.value_to_y(180.0), 120.0);
    }

    #[test]
    fn test_round_trips() {
        let m = mapper();
        for i in 0..=16 {
            let t = i as f64 * 0.5;
            assert!((m.x_to_time(m.time_to_x(t)) - t).abs() < TOLERANCE);
        }
        for i in 0..=12 {
            let v = i as f64 * 30.0;
            assert!((m.y_to_value(m.value_to_y(v)) - v).abs() < TOLERANCE);
        }
        for &(x, y) in &[(0.0, 0.0), (320.0, 120.0), (640.0, 240.0), (13.5, 77.25)] {
            let (t, v) = m.point_to_time_value(x, y);
            let (rx, ry) = m.time_value_to_point(t, v);
            assert!((rx - x).abs() < TOLERANCE && (ry - y).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_negative_range() {
        let m = GraphMapper::for_property(100.0, 100.0, 1.0, PropertyTag::Brightness);
        assert_eq!(m.value_to_y(-1.0), 100.0);
        assert_eq!(m.value_to_y(1.0), 0.0);
        assert_eq!(m.y_to_value(50.0), 0.0);
    }

    #[test]
    fn test_degenerate_dimensions_do_not_divide_by_zero() {
        let m = GraphMapper::new(0.0, 0.0, 0.0, PropertyRange::new(0.5, 0.5));
        assert_eq!(m.time_to_x(3.0), 0.0);
        assert_eq!(m.x_to_time(3.0), 0.0);
        assert!(m.value_to_y(0.5).is_finite());
        assert_eq!(m.y_to_value(10.0), 0.5);
    }
}
