//! RGB <-> CIE XYZ.
//!
//! Primaries are the standard sRGB/Rec.709 set. The reference white is kept
//! in CIE's 0..100 scale while RGB is 0..1, so XYZ values here are around
//! 0.01 for white; the Lab normalization in [`crate::lab`] is tuned to that
//! scale.
//!
//! Reference: <http://www.brucelindbloom.com/index.html?Eqn_XYZ_to_RGB.html>

use crate::gamma::{gamma_to_linear, linear_to_gamma};
use grade_math::{Mat3, Vec3};

/// Reference white point. Process-wide constant.
pub const WHITE_POINT: Vec3 = Vec3::new(94.811, 100.0, 107.304);

/// RGB -> XYZ primaries matrix.
pub const RGB_TO_XYZ: Mat3 = Mat3::from_rows([
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
]);

/// Exact inverse of [`RGB_TO_XYZ`].
///
/// The commonly published 7-digit inverse is only accurate to ~1e-7, which
/// the inverse gamma amplifies to ~1e-4 near black.
pub const XYZ_TO_RGB: Mat3 = Mat3::from_rows([
    [3.240454836021409, -1.5371388501025753, -0.498531546868481],
    [-0.9692663898756538, 1.8760109288424913, 0.041556082346673524],
    [0.05564341960421366, -0.20402585426769815, 1.0572251624579287],
]);

/// `(linear_to_gamma(rgb) * M_rgb->xyz) / white_point`.
#[inline]
pub fn rgb_to_xyz(rgb: Vec3) -> Vec3 {
    RGB_TO_XYZ.transform(linear_to_gamma(rgb)) / WHITE_POINT
}

/// Inverse of [`rgb_to_xyz`].
#[inline]
pub fn xyz_to_rgb(xyz: Vec3) -> Vec3 {
    gamma_to_linear(XYZ_TO_RGB.transform(xyz * WHITE_POINT))
}
