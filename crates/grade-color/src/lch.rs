//! Polar form of normalized Lab, and the composite RGB <-> LCh conversions.
//!
//! Hue is an angle expressed as a fraction of a full turn and always
//! wrapped into [0, 1). Chroma is the radius in the normalized a/b plane,
//! so real colors sit well below 0.13.

use crate::lab::{lab_to_xyz, xyz_to_lab};
use crate::xyz::{rgb_to_xyz, xyz_to_rgb};
use grade_math::{Vec3, wrap01};
use std::f64::consts::TAU;

/// A color in normalized LCh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lch {
    /// Lightness, ~0 (black) to ~0.99 (white).
    pub l: f64,
    /// Chroma, >= 0.
    pub c: f64,
    /// Hue as a fraction of a turn, [0, 1).
    pub h: f64,
}

impl Lch {
    /// Creates an LCh triple. Hue is taken as given.
    #[inline]
    pub const fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    /// Shorthand for [`lch_to_rgb`].
    #[inline]
    pub fn to_rgb(self) -> Vec3 {
        lch_to_rgb(self)
    }
}

/// Cartesian Lab -> polar LCh.
#[inline]
pub fn lab_to_lch(lab: Vec3) -> Lch {
    Lch::new(lab.x, lab.y.hypot(lab.z), wrap01(lab.z.atan2(lab.y) / TAU))
}

/// Polar LCh -> Cartesian Lab.
#[inline]
pub fn lch_to_lab(lch: Lch) -> Vec3 {
    let (s, c) = (lch.h * TAU).sin_cos();
    Vec3::new(lch.l, lch.c * c, lch.c * s)
}

/// Full forward chain: RGB -> XYZ -> Lab -> LCh.
///
/// ```rust
/// use grade_color::rgb_to_lch;
/// use grade_math::Vec3;
///
/// let gray = rgb_to_lch(Vec3::splat(0.5));
/// assert!((gray.l - 0.21625).abs() < 1e-5);
/// assert!(gray.c < 1e-3);
/// ```
#[inline]
pub fn rgb_to_lch(rgb: Vec3) -> Lch {
    lab_to_lch(xyz_to_lab(rgb_to_xyz(rgb)))
}

/// Full inverse chain: LCh -> Lab -> XYZ -> RGB.
///
/// Out-of-gamut colors come back with components below 0 clamped away by
/// the gamma stage and components above 1 left as-is.
#[inline]
pub fn lch_to_rgb(lch: Lch) -> Vec3 {
    xyz_to_rgb(lab_to_xyz(lch_to_lab(lch)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_lch(got: Lch, l: f64, c: f64, h: f64) {
        assert_abs_diff_eq!(got.l, l, epsilon = 1e-9);
        assert_abs_diff_eq!(got.c, c, epsilon = 1e-9);
        assert_abs_diff_eq!(got.h, h, epsilon = 1e-9);
    }

    #[test]
    fn test_known_values() {
        assert_lch(
            rgb_to_lch(Vec3::splat(0.5)),
            0.21625042400515215,
            0.0004230717014034672,
            0.8136730924443917,
        );
        assert_lch(
            rgb_to_lch(Vec3::ONE),
            0.9890587561159698,
            0.0017851275867534707,
            0.813904549142847,
        );
        assert_lch(
            rgb_to_lch(Vec3::new(1.0, 0.0, 0.0)),
            0.2113173071818518,
            0.07166369543134009,
            0.053607044522553944,
        );
        assert_lch(
            rgb_to_lch(Vec3::new(0.0, 1.0, 0.0)),
            0.7105937669029632,
            0.12638453102413785,
            0.4012229745535644,
        );
        assert_lch(
            rgb_to_lch(Vec3::new(0.0, 0.0, 1.0)),
            0.07171495120370383,
            0.10529545584541672,
            0.8054303235391888,
        );
    }

    #[test]
    fn test_black_is_origin() {
        assert_eq!(rgb_to_lch(Vec3::ZERO), Lch::default());
        assert_eq!(lch_to_rgb(Lch::default()), Vec3::ZERO);
    }

    #[test]
    fn test_hue_wraps_into_unit_range() {
        // negative b gives a negative angle before wrapping
        let lch = lab_to_lch(Vec3::new(0.5, 0.01, -0.01));
        assert_abs_diff_eq!(lch.h, 0.875, epsilon = 1e-12);
        let lab = lch_to_lab(lch);
        assert_abs_diff_eq!(lab.y, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(lab.z, -0.01, epsilon = 1e-12);
        // a full turn is the same color
        let a = lch_to_lab(Lch::new(0.5, 0.05, 0.2));
        let b = lch_to_lab(Lch::new(0.5, 0.05, 1.2));
        assert!(a.max_abs_diff(b) < 1e-12);
    }

    #[test]
    fn test_roundtrip_grid() {
        let steps = [0.0, 0.05, 0.2, 0.5, 0.77, 1.0];
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let rgb = Vec3::new(r, g, b);
                    let back = lch_to_rgb(rgb_to_lch(rgb));
                    assert!(rgb.max_abs_diff(back) < 1e-9, "{rgb:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn test_out_of_gamut_extrapolates() {
        let rgb = lch_to_rgb(Lch::new(0.5, 0.3, 0.1));
        assert!(!rgb.is_nan());
        assert!(rgb.min_element() >= 0.0);
        assert!(rgb.max_element() > 1.0);
    }
}
