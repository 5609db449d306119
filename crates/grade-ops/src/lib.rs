//! # grade-ops
//!
//! The numerical core of the LCh grading engine.
//!
//! # Modules
//!
//! - [`gamut`] - Gamut boundary searches and the precomputed [`GamutTable`]
//! - [`tone_curve`] - Control points and the dense [`ToneCurve`] lookup
//! - [`render`] - The per-pixel [`Kernel`] and viewport [`ViewTransform`]
//! - [`histogram`] - LCh [`Histogram`] of a source image
//! - [`params`] - Serializable [`RenderParams`], [`GradeSettings`], [`PipelineConfig`]
//! - [`bindings`] - Named inputs resolved to typed slots
//! - [`pipeline`] - The [`Pipeline`] context and per-draw [`Frame`]
//!
//! # Data flow
//!
//! ```text
//! source image --+--> Histogram (side channel)
//!                |
//!                +--> Kernel --> viewport image
//!                       ^   ^
//!          GamutTable --+   +-- ToneCurve lookup
//! ```
//!
//! The gamut table and the curve are built ahead of time and shared
//! read-only with every render pass.
//!
//! # Features
//!
//! - `parallel` (default) - rayon over table rows, render rows and histogram
//!   pixels

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bindings;
pub mod gamut;
pub mod histogram;
pub mod params;
pub mod pipeline;
pub mod render;
pub mod tone_curve;

pub use bindings::{BindingTable, InputKind, InputValue};
pub use gamut::{GamutLimits, GamutTable, LightnessRange, lightness_range, max_chroma};
pub use histogram::{Channel, Histogram};
pub use params::{GradeSettings, PipelineConfig, RenderParams, auto_exposure, dither_amplitude_from_slider};
pub use pipeline::{Frame, Pipeline};
pub use render::{Kernel, ViewTransform};
pub use tone_curve::{ControlPoint, ToneCurve};

pub use grade_core::{GradeError, GradeResult};
