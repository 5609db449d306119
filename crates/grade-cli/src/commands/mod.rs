//! CLI command implementations

pub mod curve;
pub mod render;
pub mod table;

use anyhow::{Context, Result};
use grade_color::Lch;
use grade_core::RgbaImage;
use grade_ops::GradeSettings;
use std::fs;
use std::path::Path;

/// Load a settings document; missing fields take their defaults.
pub fn load_settings(path: &Path) -> Result<GradeSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings: {}", path.display()))
}

/// Hue runs left to right, lightness top (1) to bottom (0), at fixed chroma.
/// Colors outside the display gamut are clamped.
pub fn hue_lightness_chart(width: u32, height: u32, chroma: f64) -> RgbaImage {
    let w = width.max(1) as f64;
    let h = height.max(1) as f64;
    RgbaImage::from_fn(width, height, |x, y| {
        let hue = (x as f64 + 0.5) / w;
        let lightness = 1.0 - (y as f64 + 0.5) / h;
        let [r, g, b] = Lch::new(lightness, chroma, hue).to_rgb().clamp01().to_f32();
        [r, g, b, 1.0]
    })
}

pub fn print_default_settings() -> Result<()> {
    let json = serde_json::to_string_pretty(&GradeSettings::default())
        .context("Failed to serialize settings")?;
    println!("{json}");
    Ok(())
}
