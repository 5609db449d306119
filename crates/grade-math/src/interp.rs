//! Interpolation and range helpers.
//!
//! ```rust
//! use grade_math::{lerp, wrap01};
//!
//! assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
//! assert_eq!(wrap01(-0.25), 0.75);
//! ```

/// Linear interpolation: `a + (b - a) * t`, extrapolating outside [0, 1].
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// f32 variant of [`lerp`], used on pixel buffers.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fractional part, `x - floor(x)`; always in [0, 1) for finite input.
#[inline]
pub fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// Wraps a periodic coordinate (hue) into [0, 1).
#[inline]
pub fn wrap01(x: f64) -> f64 {
    let w = fract(x);
    // fract of a tiny negative number can round up to exactly 1.0
    if w >= 1.0 { 0.0 } else { w }
}

/// Shortest distance between two periodic coordinates in [0, 1).
#[inline]
pub fn wrapped_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 1.0;
    d.min(1.0 - d)
}
