//! Render command.
//!
//! Grades a synthetic hue/lightness chart and reports gamut violations,
//! mean output lightness and histogram peaks.

use crate::RenderArgs;
use anyhow::{Result, bail};
use grade_color::{lch_to_rgb, rgb_to_lch};
use grade_core::RgbaImage;
use grade_math::Vec3;
use grade_ops::render::is_gamut_violation;
use grade_ops::{
    Channel, GradeSettings, Histogram, Kernel, Pipeline, PipelineConfig, RenderParams,
    dither_amplitude_from_slider,
};
use std::time::Instant;
use tracing::debug;

pub fn run(args: RenderArgs, verbose: bool) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        bail!("chart must not be empty: {}x{}", args.width, args.height);
    }

    let mut settings = match &args.params {
        Some(path) => super::load_settings(path)?,
        None => GradeSettings::default(),
    };
    apply_overrides(&mut settings.params, &args);

    let config = PipelineConfig {
        gamut_resolution: args.table_resolution,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::with_points(config, settings.points)?;

    let chart = super::hue_lightness_chart(args.width, args.height, args.chroma);
    if args.auto_exposure {
        settings.params.exposure = pipeline.auto_exposure(&chart);
    }
    debug!(params = ?settings.params, "render settings");

    let (vw, vh) = args.viewport.unwrap_or((args.width, args.height));
    let start = Instant::now();
    let output = pipeline.render(&chart, &settings.params, vw, vh)?;
    let elapsed = start.elapsed();

    let violations = count_violations(&pipeline, &chart, &settings.params);
    let mean_l = mean_lightness(&output);
    let source_hist = pipeline.histogram(&chart)?;
    let output_hist = Histogram::compute(&output);

    if args.json {
        let report = serde_json::json!({
            "chart": [args.width, args.height],
            "viewport": [vw, vh],
            "params": settings.params,
            "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
            "gamut_violations": violations,
            "mean_lightness": mean_l,
            "source_peaks": peaks(&source_hist),
            "output_peaks": peaks(&output_hist),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Chart {}x{} -> viewport {vw}x{vh}", args.width, args.height);
    if verbose {
        let p = &settings.params;
        println!(
            "  exposure={:.4} intensity={:.4} dither={:.6} border={}",
            p.exposure, p.intensity, p.dither_amplitude, p.show_gamut_border
        );
    }
    println!("  Render time:      {:.1} ms", elapsed.as_secs_f64() * 1000.0);
    println!("  Gamut violations: {violations} / {}", chart.pixel_count());
    println!("  Mean lightness:   {mean_l:.4}");
    print_peaks("Source", &source_hist);
    print_peaks("Output", &output_hist);

    Ok(())
}

fn apply_overrides(params: &mut RenderParams, args: &RenderArgs) {
    if let Some(intensity) = args.intensity {
        params.intensity = intensity;
    }
    if let Some(exposure) = args.exposure {
        params.exposure = exposure;
    }
    if let Some(slider) = args.dither {
        params.dither_amplitude = dither_amplitude_from_slider(slider);
    }
    if args.gamut_border {
        params.show_gamut_border = true;
    }
}

/// Source pixels whose graded color leaves the tolerance band, before dither.
fn count_violations(pipeline: &Pipeline, chart: &RgbaImage, params: &RenderParams) -> usize {
    let gamut = pipeline.gamut_table();
    let curve = pipeline.tone_curve();
    let kernel = Kernel::new(&gamut, &curve, params);
    chart
        .pixels()
        .filter(|px| {
            let rgb = Vec3::from_f32([px[0], px[1], px[2]]) * params.exposure;
            let lch = kernel.grade_lch(rgb_to_lch(rgb));
            is_gamut_violation(lch_to_rgb(lch), lch)
        })
        .count()
}

fn mean_lightness(image: &RgbaImage) -> f64 {
    if image.is_empty() {
        return 0.0;
    }
    let sum: f64 = image
        .pixels()
        .map(|px| rgb_to_lch(Vec3::from_f32([px[0], px[1], px[2]])).l)
        .sum();
    sum / image.pixel_count() as f64
}

fn peaks(hist: &Histogram) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for ch in Channel::ALL {
        let (bin, value) = hist.peak(ch);
        map.insert(ch.name().to_string(), serde_json::json!({ "bin": bin, "value": value }));
    }
    serde_json::Value::Object(map)
}

fn print_peaks(label: &str, hist: &Histogram) {
    let parts: Vec<String> = Channel::ALL
        .iter()
        .map(|&ch| {
            let (bin, value) = hist.peak(ch);
            format!("{} {bin} ({:.1}%)", ch.name(), value * 100.0)
        })
        .collect();
    println!("  {label:<7} peaks:   {}", parts.join(", "));
}
