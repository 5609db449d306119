//! RGBA image buffer.
//!
//! [`RgbaImage`] is the only image container the engine needs: the source the
//! UI layer hands over, the rendered output, and the downsampled copies used
//! for statistics all share it.
//!
//! # Memory Layout
//!
//! Pixels are stored **row-major**, top-to-bottom, alpha interleaved:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//! ```
//!
//! # Sampling
//!
//! [`RgbaImage::sample`] behaves like a linearly filtered texture with
//! clamp-to-edge addressing: normalized coordinates in [0, 1], texel centres at
//! `(i + 0.5) / size`.
//!
//! ```rust
//! use grade_core::RgbaImage;
//!
//! let img = RgbaImage::filled(4, 4, [0.5, 0.25, 0.125, 1.0]);
//! assert_eq!(img.sample(0.3, 0.7), [0.5, 0.25, 0.125, 1.0]);
//! ```

use crate::pixel::{Rgba, u8_to_unit};
use crate::{GradeError, GradeResult};
use rayon::prelude::*;
use std::sync::Arc;

/// Owned RGBA f32 image.
///
/// The buffer is kept in an [`Arc`] so cloning an image for a worker or a
/// second consumer (histogram and renderer both read the source) is free.
/// Mutation goes through copy-on-write via [`data_mut`](Self::data_mut).
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    data: Arc<Vec<f32>>,
    width: u32,
    height: u32,
}

impl RgbaImage {
    /// Channels per pixel.
    pub const CHANNELS: usize = 4;

    /// Creates a transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: Arc::new(vec![0.0; width as usize * height as usize * Self::CHANNELS]),
            width,
            height,
        }
    }

    /// Creates an image from interleaved RGBA data.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::InvalidDimensions`] if `data.len()` is not
    /// `width * height * 4`.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> GradeResult<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(GradeError::invalid_dimensions(
                width,
                height,
                format!("expected {} elements, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Creates an image from a decoded 8-bit RGBA buffer.
    ///
    /// Values are mapped to [0, 1] without any transfer function, which is how
    /// an 8-bit texture upload presents them to a shader.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> GradeResult<Self> {
        Self::from_data(width, height, bytes.iter().copied().map(u8_to_unit).collect())
    }

    /// Creates an image where every pixel has the same value.
    pub fn filled(width: u32, height: u32, pixel: Rgba) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * Self::CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data: Arc::new(data),
            width,
            height,
        }
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel, rows in parallel.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> Rgba + Sync,
    {
        let mut data = vec![0.0f32; width as usize * height as usize * Self::CHANNELS];
        let row_len = (width as usize * Self::CHANNELS).max(1);
        data.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(Self::CHANNELS).enumerate() {
                    px.copy_from_slice(&f(x as u32, y as u32));
                }
            });
        Self {
            data: Arc::new(data),
            width,
            height,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width divided by height; 1.0 for degenerate images.
    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw interleaved data.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw data (copy-on-write if shared).
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Iterates over pixels in memory order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data
            .chunks_exact(Self::CHANNELS)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * Self::CHANNELS
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]]
    }

    /// Bilinear sample at normalized coordinates, clamp-to-edge.
    ///
    /// Returns transparent black for empty images.
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        if self.is_empty() {
            return crate::pixel::TRANSPARENT;
        }
        let w = self.width as usize;
        let h = self.height as usize;

        let fx = u * w as f32 - 0.5;
        let fy = v * h as f32 - 0.5;
        let x0f = fx.floor();
        let y0f = fy.floor();
        let tx = fx - x0f;
        let ty = fy - y0f;

        let clamp_x = |i: f32| (i.max(0.0) as usize).min(w - 1);
        let clamp_y = |i: f32| (i.max(0.0) as usize).min(h - 1);
        let (x0, x1) = (clamp_x(x0f), clamp_x(x0f + 1.0));
        let (y0, y1) = (clamp_y(y0f), clamp_y(y0f + 1.0));

        let p00 = self.pixel(x0 as u32, y0 as u32);
        let p10 = self.pixel(x1 as u32, y0 as u32);
        let p01 = self.pixel(x0 as u32, y1 as u32);
        let p11 = self.pixel(x1 as u32, y1 as u32);

        let mut out = [0.0f32; 4];
        for c in 0..Self::CHANNELS {
            let top = p00[c] * (1.0 - tx) + p10[c] * tx;
            let bot = p01[c] * (1.0 - tx) + p11[c] * tx;
            out[c] = top * (1.0 - ty) + bot * ty;
        }
        out
    }

    /// Resamples to `width` x `height` by bilinear sampling at output texel centres.
    pub fn resample(&self, width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |x, y| {
            let u = (x as f32 + 0.5) / width as f32;
            let v = (y as f32 + 0.5) / height as f32;
            self.sample(u, v)
        })
    }

    /// Largest R, G or B value in the image (alpha ignored); 0.0 when empty.
    pub fn max_rgb(&self) -> f32 {
        self.data
            .par_chunks_exact(Self::CHANNELS)
            .map(|px| px[0].max(px[1]).max(px[2]))
            .reduce(|| 0.0f32, f32::max)
    }
}
