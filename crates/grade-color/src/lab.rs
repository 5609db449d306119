//! CIE XYZ <-> normalized CIE Lab.
//!
//! Uses the exact CIE constants `e = 216/24389`, `k = 24389/27` for the
//! piecewise cube root, which keeps the derivative finite near black. The
//! result is divided by [`LAB_RANGE`] so all three channels are small
//! numbers instead of CIE's 0..100 / -128..127.

use grade_math::Vec3;

/// CIE epsilon, `216 / 24389`.
pub const LAB_E: f64 = 216.0 / 24389.0;

/// CIE kappa, `24389 / 27`.
pub const LAB_K: f64 = 24389.0 / 27.0;

/// `e * k` (= 8), the lightness at which the cube branch starts.
pub const LAB_EK: f64 = LAB_E * LAB_K;

/// Per-channel normalization applied after the CIE formula.
///
/// The lightness divisor pairs with the 0..100 white point in
/// [`crate::xyz::WHITE_POINT`]: white comes out at L ~ 0.989.
pub const LAB_RANGE: Vec3 = Vec3::new(100.0 / 11.0, 128.0, 128.0);

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > LAB_E {
        t.cbrt()
    } else {
        (LAB_K * t + 16.0) / 116.0
    }
}

#[inline]
fn pow3(t: f64) -> f64 {
    t * t * t
}

/// XYZ -> normalized Lab.
#[inline]
pub fn xyz_to_lab(xyz: Vec3) -> Vec3 {
    let fx = lab_f(xyz.x);
    let fy = lab_f(xyz.y);
    let fz = lab_f(xyz.z);
    Vec3::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)) / LAB_RANGE
}

/// Normalized Lab -> XYZ, the algebraic inverse of [`xyz_to_lab`].
#[inline]
pub fn lab_to_xyz(lab: Vec3) -> Vec3 {
    let lab = lab * LAB_RANGE;
    let fy = (lab.x + 16.0) / 116.0;
    let fz = fy - lab.z / 200.0;
    let fx = lab.y / 500.0 + fy;
    let (fx3, fy3, fz3) = (pow3(fx), pow3(fy), pow3(fz));

    Vec3::new(
        if fx3 > LAB_E { fx3 } else { (116.0 * fx - 16.0) / LAB_K },
        if lab.x > LAB_EK { fy3 } else { lab.x / LAB_K },
        if fz3 > LAB_E { fz3 } else { (116.0 * fz - 16.0) / LAB_K },
    )
}
