//! Pixel aliases.
//!
//! Components are real-valued. Color channels are linear light unless a
//! function says otherwise; alpha is in [0, 1] and never touched by color
//! conversions.

/// RGB triple.
pub type Rgb = [f32; 3];

/// RGBA quadruple, alpha last.
pub type Rgba = [f32; 4];

/// Fully transparent black.
pub const TRANSPARENT: Rgba = [0.0, 0.0, 0.0, 0.0];

/// Maps an 8-bit channel value to [0, 1].
#[inline]
pub fn u8_to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}
