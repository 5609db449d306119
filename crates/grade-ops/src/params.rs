//! User-facing render parameters and pipeline tunables.
//!
//! [`RenderParams`] and [`GradeSettings`] are plain serde documents so the
//! UI layer (or the CLI) can load them from JSON; missing fields take their
//! defaults.

use grade_core::{Rgb, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::tone_curve::{self, ControlPoint};
use crate::{gamut, histogram};

/// Default background behind the image.
pub const DEFAULT_BACKGROUND: Rgb = [0.1, 0.1, 0.1];

/// Default overscan: the image fills 1/1.1 of the viewport's limiting axis.
pub const DEFAULT_OVERSCAN: f64 = 1.1;

/// Largest side of the grid [`auto_exposure`] scans.
pub const AUTO_EXPOSURE_RESOLUTION: u32 = 256;

/// Scalar inputs of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Multiplier applied to RGB before conversion.
    pub exposure: f64,
    /// Lightness bend strength; positive pushes toward the upper gamut limit.
    pub intensity: f64,
    /// Peak-to-peak amplitude of the dither noise.
    pub dither_amplitude: f64,
    /// Replace out-of-gamut results with a striped marker.
    pub show_gamut_border: bool,
    /// Color outside the image and under transparent pixels.
    pub background: Rgb,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            intensity: 0.0,
            dither_amplitude: 0.0,
            show_gamut_border: false,
            background: DEFAULT_BACKGROUND,
        }
    }
}

/// A saved grading session: scalar parameters plus the curve points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeSettings {
    /// Scalar parameters.
    pub params: RenderParams,
    /// Tone curve control points.
    pub points: Vec<ControlPoint>,
}

impl Default for GradeSettings {
    fn default() -> Self {
        Self {
            params: RenderParams::default(),
            points: ControlPoint::default_set(),
        }
    }
}

/// Resolutions and view constants fixed when a pipeline is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gamut table cells per axis.
    pub gamut_resolution: usize,
    /// Tone curve lookup length.
    pub curve_len: usize,
    /// Side of the grid the histogram is computed over; 0 uses every pixel.
    pub histogram_resolution: u32,
    /// Viewport overscan factor.
    pub overscan: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gamut_resolution: gamut::DEFAULT_RESOLUTION,
            curve_len: tone_curve::DEFAULT_LOOKUP_LEN,
            histogram_resolution: histogram::DEFAULT_RESOLUTION,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

/// Dither amplitude for a slider position: 0 stays 0, otherwise `2^-v`.
#[inline]
pub fn dither_amplitude_from_slider(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { (-value).exp2() }
}

/// Exposure that brings the brightest channel of `image` to 1 after the
/// 2.2 transfer: `1 / max_rgb^(1/2.2)`. Black or empty images get 1.
///
/// The image is first reduced to a square grid of side
/// `min(256, (width + height) / 2)`.
pub fn auto_exposure(image: &RgbaImage) -> f64 {
    if image.is_empty() {
        return 1.0;
    }
    let side = ((image.width() + image.height()) / 2).clamp(1, AUTO_EXPOSURE_RESOLUTION);
    let max = image.resample(side, side).max_rgb() as f64;
    if max <= 0.0 {
        return 1.0;
    }
    1.0 / max.powf(1.0 / grade_color::GAMMA)
}
