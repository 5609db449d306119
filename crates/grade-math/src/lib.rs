//! # grade-math
//!
//! Math primitives for the colorimetric pipeline:
//!
//! - [`Mat3`] - 3x3 matrices for RGB/XYZ transforms
//! - [`Vec3`] - 3-component vectors for RGB/XYZ/Lab triplets
//! - Interpolation utilities ([`lerp`], [`fract`], [`wrap01`], [`wrapped_distance`])
//!
//! # Precision
//!
//! Everything here is `f64`. The gamma stage raises values to the 2.2th
//! power, so single-precision cancellation near black is amplified by the
//! inverse gamma on the way back; doubles keep RGB -> XYZ -> RGB exact to
//! well below 1e-5.
//!
//! # Convention
//!
//! Matrices are **row-major** and multiply **column vectors**:
//!
//! ```rust
//! use grade_math::{Mat3, Vec3};
//!
//! let m = Mat3::from_rows([
//!     [0.4124564, 0.3575761, 0.1804375],
//!     [0.2126729, 0.7151522, 0.0721750],
//!     [0.0193339, 0.1191920, 0.9503041],
//! ]);
//! let xyz = m * Vec3::ONE;
//! assert!((xyz.y - 1.0).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod interp;
mod mat3;
mod vec3;

pub use interp::*;
pub use mat3::*;
pub use vec3::*;

/// Re-export glam types for direct use
pub mod glam {
    pub use ::glam::{DMat3, DVec3};
}
