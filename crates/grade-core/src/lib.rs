//! # grade-core
//!
//! Core types shared by every crate of the grading engine:
//!
//! - [`RgbaImage`] - Owned RGBA f32 buffer with bilinear texture-style sampling
//! - [`Rgb`], [`Rgba`] - Plain pixel arrays
//! - [`GradeError`] / [`GradeResult`] - Error type for the API seams
//!
//! ## Crate Structure
//!
//! ```text
//! grade-core (this crate)
//!    ^
//!    |
//!    +-- grade-math (vectors, matrices, interpolation)
//!    +-- grade-color (RGB / XYZ / Lab / LCh)
//!    +-- grade-ops (gamut table, tone curve, render kernel, histogram)
//! ```
//!
//! The numerical core never fails: conversions and the per-pixel kernel are
//! total functions. Errors only appear where buffers and named inputs are
//! handed across the API boundary.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod pixel;

pub use error::{GradeError, GradeResult};
pub use image::RgbaImage;
pub use pixel::{Rgb, Rgba, TRANSPARENT, u8_to_unit};
