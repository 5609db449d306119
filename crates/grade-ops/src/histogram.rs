//! Per-channel LCh histograms of a source image.
//!
//! Each pixel is converted with [`rgb_to_lch`] and its lightness, chroma and
//! hue are binned independently into [`HISTOGRAM_BINS`] buckets at
//! `floor(value * 255)`. Buckets hold the fraction of all pixels, so every
//! channel sums to 1. The histogram is recomputed in full for every new
//! image.

use grade_color::rgb_to_lch;
use grade_core::{GradeError, GradeResult, RgbaImage};
use grade_math::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

/// Buckets per channel.
pub const HISTOGRAM_BINS: usize = 256;

/// Fraction of the display height the tallest bucket is scaled to.
pub const DISPLAY_HEADROOM: f32 = 0.9;

/// Default side length of the resampled grid used by [`Histogram::compute_resampled`].
pub const DEFAULT_RESOLUTION: u32 = 256;

/// A histogram channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Lightness.
    Lightness = 0,
    /// Chroma.
    Chroma = 1,
    /// Hue.
    Hue = 2,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Self; 3] = [Self::Lightness, Self::Chroma, Self::Hue];

    /// Short name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lightness => "lightness",
            Self::Chroma => "chroma",
            Self::Hue => "hue",
        }
    }
}

/// Bucket index of a normalized channel value, clamped to the valid range.
#[inline]
pub fn bin_index(value: f64) -> usize {
    // `as` saturates, and maps NaN to 0
    ((value * 255.0).floor() as usize).min(HISTOGRAM_BINS - 1)
}

type Counts = [[u32; HISTOGRAM_BINS]; 3];

fn count_pixel(mut counts: Box<Counts>, px: &[f32]) -> Box<Counts> {
    let lch = rgb_to_lch(Vec3::from_f32([px[0], px[1], px[2]]));
    counts[0][bin_index(lch.l)] += 1;
    counts[1][bin_index(lch.c)] += 1;
    counts[2][bin_index(lch.h)] += 1;
    counts
}

fn merge(mut a: Box<Counts>, b: Box<Counts>) -> Box<Counts> {
    for (ca, cb) in a.iter_mut().zip(b.iter()) {
        for (x, y) in ca.iter_mut().zip(cb.iter()) {
            *x += *y;
        }
    }
    a
}

fn zero_counts() -> Box<Counts> {
    Box::new([[0; HISTOGRAM_BINS]; 3])
}

/// Lightness, chroma and hue histograms with their per-channel maxima.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: [[f32; HISTOGRAM_BINS]; 3],
    max: [f32; 3],
    samples: usize,
}

impl Histogram {
    /// Histogram over every pixel of `image`. Alpha is ignored.
    pub fn compute(image: &RgbaImage) -> Self {
        let data = image.data();

        #[cfg(feature = "parallel")]
        let counts = data
            .par_chunks_exact(RgbaImage::CHANNELS)
            .fold(zero_counts, count_pixel)
            .reduce(zero_counts, merge);

        #[cfg(not(feature = "parallel"))]
        let counts = data
            .chunks_exact(RgbaImage::CHANNELS)
            .fold(zero_counts(), count_pixel);

        let histogram = Self::from_counts(&counts, image.pixel_count());
        debug!(
            width = image.width(),
            height = image.height(),
            peak_lightness = histogram.peak(Channel::Lightness).0,
            "computed histogram"
        );
        histogram
    }

    /// Histogram over a `resolution x resolution` bilinear resample of `image`.
    ///
    /// # Errors
    ///
    /// [`GradeError::InvalidParameter`] if `resolution` is zero.
    pub fn compute_resampled(image: &RgbaImage, resolution: u32) -> GradeResult<Self> {
        if resolution == 0 {
            return Err(GradeError::invalid_parameter(
                "resolution",
                "histogram sampling grid must not be empty",
            ));
        }
        if image.is_empty() {
            return Ok(Self::compute(image));
        }
        Ok(Self::compute(&image.resample(resolution, resolution)))
    }

    fn from_counts(counts: &Counts, samples: usize) -> Self {
        let mut bins = [[0.0f32; HISTOGRAM_BINS]; 3];
        let mut max = [0.0f32; 3];

        if samples == 0 {
            warn!("histogram of an empty image");
        } else {
            let n = samples as f64;
            for (ch, channel) in counts.iter().enumerate() {
                for (bin, &count) in channel.iter().enumerate() {
                    let value = (count as f64 / n) as f32;
                    bins[ch][bin] = value;
                    max[ch] = max[ch].max(value);
                }
            }
        }

        Self { bins, max, samples }
    }

    /// Buckets of one channel.
    #[inline]
    pub fn channel(&self, channel: Channel) -> &[f32; HISTOGRAM_BINS] {
        &self.bins[channel as usize]
    }

    /// Lightness buckets.
    #[inline]
    pub fn lightness(&self) -> &[f32; HISTOGRAM_BINS] {
        self.channel(Channel::Lightness)
    }

    /// Chroma buckets.
    #[inline]
    pub fn chroma(&self) -> &[f32; HISTOGRAM_BINS] {
        self.channel(Channel::Chroma)
    }

    /// Hue buckets.
    #[inline]
    pub fn hue(&self) -> &[f32; HISTOGRAM_BINS] {
        self.channel(Channel::Hue)
    }

    /// Tallest bucket of a channel.
    #[inline]
    pub fn max(&self, channel: Channel) -> f32 {
        self.max[channel as usize]
    }

    /// Pixels that contributed.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Sum of a channel's buckets; 1 for any non-empty image.
    pub fn sum(&self, channel: Channel) -> f64 {
        self.channel(channel).iter().map(|&v| v as f64).sum()
    }

    /// Index and value of the tallest bucket (first one on ties).
    pub fn peak(&self, channel: Channel) -> (usize, f32) {
        self.channel(channel)
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0), |best, (i, v)| if v > best.1 { (i, v) } else { best })
    }

    /// Buckets scaled for display, tallest at [`DISPLAY_HEADROOM`].
    pub fn normalized(&self, channel: Channel) -> [f32; HISTOGRAM_BINS] {
        let max = self.max(channel);
        let mut out = *self.channel(channel);
        if max > 0.0 {
            for v in &mut out {
                *v = *v * DISPLAY_HEADROOM / max;
            }
        }
        out
    }
}
