//! The per-pixel grading kernel and the viewport pass that drives it.
//!
//! For every output pixel [`Kernel::shade`]:
//!
//! 1. maps the pixel into image space; outside the image it returns the
//!    background
//! 2. samples the source and adds coordinate-seeded dither noise
//! 3. applies exposure and converts to LCh
//! 4. clips chroma against the gamut table at the pixel's lightness
//! 5. bends lightness inside the gamut's lightness range at the pixel's
//!    chroma, with a strength modulated by the tone curve
//! 6. re-clips chroma at the new lightness
//! 7. converts back to RGB, optionally replacing out-of-gamut results with
//!    a striped marker
//! 8. clamps and composites over the background with the source alpha
//!
//! The kernel is stateless; [`render`] runs it over a viewport, rows in
//! parallel when the `parallel` feature is on.

use grade_color::{Lch, lch_to_rgb, rgb_to_lch};
use grade_core::{Rgba, RgbaImage};
use grade_math::{Vec3, lerp_f32};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use crate::gamut::{GamutTable, LightnessRange};
use crate::params::RenderParams;
use crate::tone_curve::ToneCurve;

/// Fraction of the table's chroma limit a pixel may use.
pub const CHROMA_MARGIN: f64 = 0.98;

/// Intensity scale in the bend exponent `2^(-intensity * 5)`.
pub const BEND_SCALE: f64 = 5.0;

/// Slack around [0, 1] before a result counts as out of gamut.
pub const GAMUT_TOLERANCE: f64 = 1e-4;

/// Width of one marker stripe, in image uv units along `u + v`.
pub const CHECKER_STRIPE: f32 = 0.007;

/// Hash noise in [0, 1): `fract(sin(dot(p, (12.9898, 78.233))) * 43758.5453)`.
#[inline]
pub fn noise(p: [f32; 2]) -> f32 {
    let v = (p[0] * 12.9898 + p[1] * 78.233).sin() * 43758.5453;
    v - v.floor()
}

/// Three decorrelated noise values, at `p`, `0.9 p` and `1.1 p`.
#[inline]
pub fn noise3(p: [f32; 2]) -> [f32; 3] {
    [
        noise(p),
        noise([p[0] * 0.9, p[1] * 0.9]),
        noise([p[0] * 1.1, p[1] * 1.1]),
    ]
}

/// `true` on odd stripes of width `size` along `t`.
#[inline]
pub fn checker(t: f32, size: f32) -> bool {
    (t / size) as i32 % 2 == 1
}

/// Exponent applied to the normalized lightness: `2^(-intensity * 5)`.
#[inline]
pub fn bend_exponent(intensity: f64) -> f64 {
    (-intensity * BEND_SCALE).exp2()
}

/// Bends `lightness` inside `range`.
///
/// The lightness is normalized to the range, raised to
/// [`bend_exponent`], and mapped back. Zero intensity leaves lightness
/// inside the range untouched; large positive intensity converges to
/// `range.max`, large negative intensity to `range.min`. Values below
/// `range.min` are pinned to it. An empty range returns the input.
pub fn bend_lightness(lightness: f64, range: LightnessRange, intensity: f64) -> f64 {
    let span = range.span();
    if span.is_nan() || span <= 0.0 {
        return lightness;
    }
    let normalized = (lightness - range.min) / span;
    let adjusted = normalized.max(0.0).powf(bend_exponent(intensity));
    adjusted * span + range.min
}

#[inline]
fn outside_band(v: f64) -> bool {
    v.is_nan() || v < -GAMUT_TOLERANCE || v > 1.0 + GAMUT_TOLERANCE
}

/// `true` if the converted color or its LCh source is visibly out of range.
pub fn is_gamut_violation(rgb: Vec3, lch: Lch) -> bool {
    rgb.to_array().into_iter().any(outside_band) || outside_band(lch.l) || outside_band(lch.c)
}

/// Maps viewport pixels into image uv space.
///
/// `uv = (ndc * scale + offset) * 0.5 + 0.5`, with `ndc` in [-1, 1] and both
/// buffers stored top row first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Per-axis scale, including aspect correction and overscan.
    pub scale: [f64; 2],
    /// Pan, in ndc units.
    pub offset: [f64; 2],
}

impl ViewTransform {
    /// Viewport and image coincide.
    pub const IDENTITY: Self = Self {
        scale: [1.0, 1.0],
        offset: [0.0, 0.0],
    };

    /// Fits an image into a viewport, preserving the image aspect ratio and
    /// leaving a margin controlled by `overscan`.
    pub fn fit(image_aspect: f64, viewport_aspect: f64, overscan: f64) -> Self {
        let aspect = image_aspect / viewport_aspect;
        let scale = if aspect > 1.0 {
            [overscan, overscan * aspect]
        } else {
            [overscan / aspect, overscan]
        };
        Self {
            scale,
            offset: [0.0, 0.0],
        }
    }

    /// [`ViewTransform::fit`] for concrete buffer sizes.
    pub fn fit_image(image: &RgbaImage, width: u32, height: u32, overscan: f64) -> Self {
        if image.is_empty() || width == 0 || height == 0 {
            return Self::IDENTITY;
        }
        Self::fit(image.aspect() as f64, width as f64 / height as f64, overscan)
    }

    /// Image uv for a point in normalized device coordinates.
    #[inline]
    pub fn uv(&self, ndc: [f64; 2]) -> [f32; 2] {
        [
            ((ndc[0] * self.scale[0] + self.offset[0]) * 0.5 + 0.5) as f32,
            ((ndc[1] * self.scale[1] + self.offset[1]) * 0.5 + 0.5) as f32,
        ]
    }

    /// Image uv for the centre of viewport pixel `(x, y)`.
    #[inline]
    pub fn pixel_uv(&self, x: u32, y: u32, width: u32, height: u32) -> [f32; 2] {
        let ndc_x = (x as f64 + 0.5) / width as f64 * 2.0 - 1.0;
        let ndc_y = (y as f64 + 0.5) / height as f64 * 2.0 - 1.0;
        self.uv([ndc_x, ndc_y])
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The grading kernel with its read-only resources for one pass.
#[derive(Debug, Clone, Copy)]
pub struct Kernel<'a> {
    gamut: &'a GamutTable,
    curve: &'a ToneCurve,
    params: &'a RenderParams,
}

impl<'a> Kernel<'a> {
    /// Creates a kernel over borrowed resources.
    pub fn new(gamut: &'a GamutTable, curve: &'a ToneCurve, params: &'a RenderParams) -> Self {
        Self {
            gamut,
            curve,
            params,
        }
    }

    /// Parameters of this pass.
    #[inline]
    pub fn params(&self) -> &RenderParams {
        self.params
    }

    #[inline]
    fn background(&self) -> Rgba {
        let [r, g, b] = self.params.background;
        [r, g, b, 1.0]
    }

    /// Chroma clip, lightness bend and re-clip.
    ///
    /// The bend strength is modulated per pixel by the tone curve:
    /// `intensity * 2 * curve.sample(L)`. Only a neutral curve (0.5
    /// everywhere) gives the plain `2^(-intensity * 5)` exponent; any other
    /// curve, including the default session point set, changes the exponent
    /// wherever it leaves 0.5.
    pub fn grade_lch(&self, lch: Lch) -> Lch {
        let range = self.gamut.lightness_range_at(lch.c, lch.h);
        let limit = self.gamut.max_chroma_at(lch.l, lch.h) * CHROMA_MARGIN;
        let chroma = lch.c.min(limit);

        let intensity = self.params.intensity * 2.0 * self.curve.sample(lch.l);
        let lightness = bend_lightness(lch.l, range, intensity);

        let limit = self.gamut.max_chroma_at(lightness, lch.h) * CHROMA_MARGIN;
        Lch::new(lightness, chroma.min(limit), lch.h)
    }

    /// Grades a source sample that was read at image coordinate `uv`.
    pub fn grade(&self, src: Rgba, uv: [f32; 2]) -> Rgba {
        let params = self.params;
        let amplitude = params.dither_amplitude as f32;
        let n = noise3(uv);
        let dithered = |c: usize| (src[c] + (n[c] - 0.5) * amplitude).clamp(0.0, 1.0);
        let rgb = Vec3::from_f32([dithered(0), dithered(1), dithered(2)]);

        let lch = self.grade_lch(rgb_to_lch(rgb * params.exposure));
        let mut result = lch_to_rgb(lch);

        if params.show_gamut_border && is_gamut_violation(result, lch) {
            result = if checker(uv[0] + uv[1], CHECKER_STRIPE) {
                Vec3::ONE
            } else {
                Vec3::ZERO
            };
        }

        let [r, g, b] = result.clamp01().to_f32();
        let bg = params.background;
        let alpha = src[3];
        [
            lerp_f32(bg[0], r, alpha),
            lerp_f32(bg[1], g, alpha),
            lerp_f32(bg[2], b, alpha),
            1.0,
        ]
    }

    /// Full kernel for one viewport sample at image coordinate `uv`.
    pub fn shade(&self, source: &RgbaImage, uv: [f32; 2]) -> Rgba {
        if !(0.0..=1.0).contains(&uv[0]) || !(0.0..=1.0).contains(&uv[1]) {
            return self.background();
        }
        self.grade(source.sample(uv[0], uv[1]), uv)
    }
}

fn shade_row(
    kernel: &Kernel<'_>,
    source: &RgbaImage,
    view: &ViewTransform,
    y: usize,
    row: &mut [f32],
    size: (u32, u32),
) {
    let (width, height) = size;
    for (x, px) in row.chunks_exact_mut(RgbaImage::CHANNELS).enumerate() {
        let uv = view.pixel_uv(x as u32, y as u32, width, height);
        px.copy_from_slice(&kernel.shade(source, uv));
    }
}

/// Runs the kernel over every pixel of `out`.
pub fn render_into(
    kernel: &Kernel<'_>,
    source: &RgbaImage,
    view: &ViewTransform,
    out: &mut RgbaImage,
) {
    let size = out.dimensions();
    if out.is_empty() {
        return;
    }
    let row_len = size.0 as usize * RgbaImage::CHANNELS;
    trace!(width = size.0, height = size.1, "render pass");

    #[cfg(feature = "parallel")]
    out.data_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| shade_row(kernel, source, view, y, row, size));

    #[cfg(not(feature = "parallel"))]
    out.data_mut()
        .chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| shade_row(kernel, source, view, y, row, size));
}

/// Renders a `width x height` viewport.
pub fn render(
    kernel: &Kernel<'_>,
    source: &RgbaImage,
    view: &ViewTransform,
    width: u32,
    height: u32,
) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    render_into(kernel, source, view, &mut out);
    out
}
