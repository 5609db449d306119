//! # grade-color
//!
//! The colorimetric chain every kernel of the grading engine links against:
//!
//! ```text
//! rgb --linear_to_gamma--> * M_rgb->xyz / white --> xyz --f(t)--> nLab --polar--> LCh
//! rgb <-gamma_to_linear--- * M_xyz->rgb * white <-- xyz <-f^-1--- nLab <-cart.--- LCh
//! ```
//!
//! - [`gamma`] - power-law encode/decode with the negative-input guard
//! - [`xyz`] - RGB <-> CIE XYZ with the fixed primaries and reference white
//! - [`lab`] - XYZ <-> normalized CIE Lab (piecewise CIE nonlinearity)
//! - [`lch`] - Lab <-> polar LCh and the composite [`rgb_to_lch`] / [`lch_to_rgb`]
//!
//! Every function here is total: values outside nominal ranges are
//! extrapolated, never rejected.
//!
//! # Normalized ranges
//!
//! Lab is divided by [`lab::LAB_RANGE`] so that lightness lands in [0, 1)
//! and the chroma plane is small. Hue is `angle / 2pi` wrapped into [0, 1).
//!
//! ```rust
//! use grade_color::{rgb_to_lch, lch_to_rgb};
//! use grade_math::Vec3;
//!
//! let rgb = Vec3::new(0.8, 0.4, 0.1);
//! let back = lch_to_rgb(rgb_to_lch(rgb));
//! assert!(rgb.max_abs_diff(back) < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod gamma;
pub mod lab;
pub mod lch;
pub mod xyz;

pub use gamma::{GAMMA, gamma_to_linear, linear_to_gamma};
pub use lab::{lab_to_xyz, xyz_to_lab};
pub use lch::{Lch, lab_to_lch, lch_to_lab, lch_to_rgb, rgb_to_lch};
pub use xyz::{rgb_to_xyz, xyz_to_rgb};

// Re-export the math crate for convenience
pub use grade_math as math;
