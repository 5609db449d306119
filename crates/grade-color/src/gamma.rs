//! Power-law transfer between the two RGB encodings.
//!
//! The pipeline's "linear" input is raised to [`GAMMA`] before entering XYZ,
//! and the inverse exponent brings it back. Negative components are clamped
//! to zero first; `powf` of a negative base with a fractional exponent is NaN.

use grade_math::Vec3;

/// Transfer exponent.
pub const GAMMA: f64 = 2.2;

/// Inverse transfer exponent.
pub const INVERSE_GAMMA: f64 = 1.0 / GAMMA;

/// `max(rgb, 0) ^ 2.2`, component-wise.
#[inline]
pub fn linear_to_gamma(rgb: Vec3) -> Vec3 {
    rgb.max_scalar(0.0).powf(GAMMA)
}

/// `max(rgb, 0) ^ (1 / 2.2)`, component-wise.
#[inline]
pub fn gamma_to_linear(rgb: Vec3) -> Vec3 {
    rgb.max_scalar(0.0).powf(INVERSE_GAMMA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_negative_inputs_clamped() {
        let v = linear_to_gamma(Vec3::new(-0.5, -1e-9, 0.5));
        assert!(!v.is_nan());
        assert_eq!(v.x, 0.0);
        assert_eq!(v.y, 0.0);
        let w = gamma_to_linear(Vec3::splat(-2.0));
        assert_eq!(w, Vec3::ZERO);
    }

    #[test]
    fn test_roundtrip() {
        for &x in &[1e-6, 0.01, 0.18, 0.5, 1.0, 3.0] {
            let v = gamma_to_linear(linear_to_gamma(Vec3::splat(x)));
            assert_abs_diff_eq!(v.x, x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_known_value() {
        assert_abs_diff_eq!(linear_to_gamma(Vec3::splat(0.5)).x, 0.217637640824031, epsilon = 1e-12);
    }
}
