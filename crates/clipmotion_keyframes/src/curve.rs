// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing-curve construction and track evaluation.
//!
//! Each adjacent keyframe pair defines a cubic Bezier segment whose
//! control points are derived from the first keyframe's easing. Segments
//! are derived on demand and never stored. Evaluation is a pure function
//! of an immutable keyframe slice, so it is safe to call from a playback
//! tick while the edit thread mutates the store (the store swaps whole
//! lists, see [`crate::store`]).

use crate::keyframe::Keyframe;
use crate::property::PropertyTag;

/// Iterations of Newton refinement before falling back to bisection
const NEWTON_ITERATIONS: usize = 8;
/// Iterations of the bisection fallback
const BISECTION_ITERATIONS: usize = 32;
/// Acceptable residual when solving the time axis for the curve parameter
const SOLVE_EPSILON: f64 = 1e-7;

/// A derived interpolation segment between two adjacent keyframes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSegment {
    /// Segment start, `(time, value)` of the earlier keyframe
    pub start: [f64; 2],
    /// First Bezier control point in absolute `(time, value)` coordinates
    pub cp1: [f64; 2],
    /// Second Bezier control point in absolute `(time, value)` coordinates
    pub cp2: [f64; 2],
    /// Segment end, `(time, value)` of the later keyframe
    pub end: [f64; 2],
}

impl AnimationSegment {
    /// Build the segment between two keyframes, deriving control points
    /// from the earlier keyframe's easing
    pub fn between(kf1: &Keyframe, kf2: &Keyframe) -> Self {
        let (cp1, cp2) = control_points(kf1, kf2);
        Self {
            start: [kf1.time, kf1.value],
            cp1,
            cp2,
            end: [kf2.time, kf2.value],
        }
    }

    /// Evaluate the segment at an absolute time. Times outside the
    /// segment return the nearest endpoint value; stored keyframe times
    /// evaluate to their stored value exactly.
    pub fn value_at(&self, time: f64) -> f64 {
        let dt = self.end[0] - self.start[0];
        if time <= self.start[0] || dt <= 0.0 {
            return self.start[1];
        }
        if time >= self.end[0] {
            return self.end[1];
        }

        // Normalize the time axis to [0, 1] and solve x(s) = target for
        // the curve parameter, then read the value axis at s. Evaluating
        // both axes with s taken directly from the normalized time would
        // be cheaper but does not match what the control-point constants
        // mean in standard easing tools.
        let target = (time - self.start[0]) / dt;
        let x1 = (self.cp1[0] - self.start[0]) / dt;
        let x2 = (self.cp2[0] - self.start[0]) / dt;
        let s = solve_parameter(x1, x2, target);

        cubic_bezier(self.start[1], self.cp1[1], self.cp2[1], self.end[1], s)
    }
}

/// Derive the Bezier control points for the segment between two
/// keyframes, in absolute `(time, value)` coordinates
pub fn control_points(kf1: &Keyframe, kf2: &Keyframe) -> ([f64; 2], [f64; 2]) {
    let dt = kf2.time - kf1.time;
    let dv = kf2.value - kf1.value;
    let (f1, f2) = kf1.easing.control_offsets();

    (
        [kf1.time + f1[0] * dt, kf1.value + f1[1] * dv],
        [kf1.time + f2[0] * dt, kf1.value + f2[1] * dv],
    )
}

/// Evaluate the cubic Bezier basis in one dimension
pub fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    p0 * mt3 + 3.0 * p1 * mt2 * t + 3.0 * p2 * mt * t2 + p3 * t3
}

/// Derivative of the cubic Bezier basis in one dimension
fn cubic_bezier_derivative(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * (p1 - p0) + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
}

/// Solve `x(s) = target` for the curve parameter `s`, where the time
/// axis runs through `(0, x1, x2, 1)` with `x1`, `x2` in `[0, 1]`.
/// Newton iteration starting from the target, with a bisection fallback
/// when the derivative degenerates. `target` must be in `[0, 1]`.
fn solve_parameter(x1: f64, x2: f64, target: f64) -> f64 {
    let mut s = target;

    for _ in 0..NEWTON_ITERATIONS {
        let residual = cubic_bezier(0.0, x1, x2, 1.0, s) - target;
        if residual.abs() < SOLVE_EPSILON {
            return s.clamp(0.0, 1.0);
        }
        let slope = cubic_bezier_derivative(0.0, x1, x2, 1.0, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= residual / slope;
        if !(0.0..=1.0).contains(&s) {
            break;
        }
    }

    // x(0) = 0 and x(1) = 1 bracket the target, so bisection always
    // converges even where Newton escapes the interval.
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    s = target;
    for _ in 0..BISECTION_ITERATIONS {
        let x = cubic_bezier(0.0, x1, x2, 1.0, s);
        if (x - target).abs() < SOLVE_EPSILON {
            break;
        }
        if x < target {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

/// Evaluate a property track at an arbitrary time.
///
/// - No keyframes: the property's neutral default.
/// - One keyframe: that keyframe's value everywhere.
/// - Before the first / after the last keyframe: constant hold.
/// - On a stored keyframe time: the stored value, exactly.
///
/// `keyframes` must be strictly sorted by ascending time; the store
/// guarantees this for every slice it hands out.
pub fn evaluate(property: PropertyTag, keyframes: &[Keyframe], time: f64) -> f64 {
    let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
        return property.default_value();
    };
    if time <= first.time {
        return first.value;
    }
    if time >= last.time {
        return last.value;
    }

    // First keyframe at or after the requested time; the bounds checks
    // above guarantee it exists and has a predecessor.
    let Some(next_idx) = keyframes.iter().position(|k| k.time >= time) else {
        return last.value;
    };
    let next = &keyframes[next_idx];
    if next.time == time {
        return next.value;
    }

    AnimationSegment::between(&keyframes[next_idx - 1], next).value_at(time)
}
