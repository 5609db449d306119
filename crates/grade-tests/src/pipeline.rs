//! End-to-end pipeline runs: source image in, graded viewport and
//! histogram out.

use approx::assert_abs_diff_eq;
use grade_core::RgbaImage;
use grade_ops::histogram::HISTOGRAM_BINS;
use grade_ops::{
    Channel, ControlPoint, GradeSettings, Histogram, Pipeline, PipelineConfig, RenderParams,
    ToneCurve,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use crate::{SEED, TEST_TABLE_RESOLUTION};

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig {
        gamut_resolution: TEST_TABLE_RESOLUTION,
        ..PipelineConfig::default()
    })
    .unwrap()
}

fn random_image(rng: &mut StdRng, width: u32, height: u32) -> RgbaImage {
    let data = (0..width * height * 4).map(|_| rng.random::<f32>()).collect();
    RgbaImage::from_data(width, height, data).unwrap()
}

#[test]
fn test_curve_without_points_is_neutral() {
    let curve = ToneCurve::new(Vec::new(), 256).unwrap();
    assert_eq!(curve.len(), 256);
    assert!(curve.lookup().iter().all(|&v| v == 0.5));
    assert_eq!(curve.sample(0.37), 0.5);
}

#[test]
fn test_histogram_channels_sum_to_one() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for (w, h) in [(1, 1), (7, 3), (64, 48)] {
        let image = random_image(&mut rng, w, h);
        let hist = Histogram::compute(&image);
        for ch in Channel::ALL {
            assert_abs_diff_eq!(hist.sum(ch), 1.0, epsilon = 1e-6);
        }
        let resampled = Histogram::compute_resampled(&image, 32).unwrap();
        for ch in Channel::ALL {
            assert_abs_diff_eq!(resampled.sum(ch), 1.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_mid_gray_end_to_end() {
    let pipeline = pipeline();
    let gray = [0.5, 0.5, 0.5, 1.0];
    let source = RgbaImage::filled(2, 2, gray);

    let mut frame = pipeline.frame();
    frame
        .set_params(&RenderParams {
            intensity: 0.0,
            exposure: 1.0,
            dither_amplitude: 0.0,
            ..RenderParams::default()
        })
        .bind("source", source.clone().into())
        .unwrap();
    let out = frame.render(2, 2).unwrap();

    assert_eq!(out.dimensions(), (2, 2));
    for px in out.pixels() {
        for c in 0..3 {
            assert_abs_diff_eq!(px[c], 0.5, epsilon = 1e-5);
        }
        assert_eq!(px[3], 1.0);
    }

    let hist = pipeline.histogram(&source).unwrap();
    let expected = [(Channel::Lightness, 55), (Channel::Chroma, 0), (Channel::Hue, 207)];
    for (channel, bin) in expected {
        let buckets = hist.channel(channel);
        assert_eq!(buckets[bin], 1.0, "{}", channel.name());
        for (i, &v) in buckets.iter().enumerate().filter(|&(i, _)| i != bin) {
            assert_eq!(v, 0.0, "{} bucket {i}", channel.name());
        }
    }
    assert_eq!(hist.channel(Channel::Hue).len(), HISTOGRAM_BINS);
}

#[test]
fn test_zero_intensity_is_identity_for_random_image() {
    let pipeline = pipeline();
    let mut rng = StdRng::seed_from_u64(SEED ^ 7);
    // keep away from the gamut edge where the 2% chroma margin applies
    let data: Vec<f32> = (0..16 * 16)
        .flat_map(|_| {
            let base = rng.random_range(0.2f32..0.8);
            let mut tint = || rng.random_range(-0.02f32..0.02);
            [base + tint(), base + tint(), base + tint(), 1.0]
        })
        .collect();
    let source = RgbaImage::from_data(16, 16, data).unwrap();

    let mut frame = pipeline.frame();
    frame.bind("source", source.clone().into()).unwrap();
    let out = frame.render(16, 16).unwrap();
    for (a, b) in source.pixels().zip(out.pixels()) {
        for c in 0..3 {
            assert_abs_diff_eq!(a[c], b[c], epsilon = 1e-4);
        }
    }
}

#[test]
fn test_settings_document_drives_render() {
    let json = r#"{
        "params": { "intensity": 0.6, "background": [0.0, 0.0, 0.0] },
        "points": [ { "x": 0.2, "y": 0.5, "size": 0.05 } ]
    }"#;
    let settings: GradeSettings = serde_json::from_str(json).unwrap();
    assert_eq!(settings.points, vec![ControlPoint::new(0.2, 0.5, 0.05)]);

    let pipeline = Pipeline::with_points(
        PipelineConfig {
            gamut_resolution: 32,
            ..PipelineConfig::default()
        },
        settings.points.clone(),
    )
    .unwrap();
    let source = RgbaImage::filled(8, 4, [0.3, 0.3, 0.3, 1.0]);
    let out = pipeline.render(&source, &settings.params, 16, 16).unwrap();

    // letterboxed with the overscan margin: corners are background
    assert_eq!(out.pixel(0, 0), [0.0, 0.0, 0.0, 1.0]);
    // positive intensity brightens the image
    let centre = out.pixel(8, 8);
    assert!(centre[0] > 0.3, "{centre:?}");
}

#[test]
fn test_rebuild_during_render_keeps_frames_consistent() {
    let pipeline = Arc::new(Pipeline::new(PipelineConfig {
        gamut_resolution: 16,
        ..PipelineConfig::default()
    })
    .unwrap());
    let source = RgbaImage::filled(4, 4, [0.4, 0.2, 0.1, 1.0]);

    let mut frame = pipeline.frame();
    frame.bind("source", source.clone().into()).unwrap();
    let before = frame.render(4, 4).unwrap();

    std::thread::scope(|s| {
        s.spawn(|| pipeline.rebuild_gamut_table(24).unwrap());
        s.spawn(|| {
            pipeline
                .set_control_points(vec![ControlPoint::new(0.5, 0.9, 0.1)])
                .unwrap()
        });
        // the frame still reads the resources it started with
        assert_eq!(frame.render(4, 4).unwrap(), before);
    });

    assert_eq!(pipeline.gamut_table().resolution(), 24);
    assert_eq!(pipeline.tone_curve().points().len(), 1);
    assert_eq!(frame.render(4, 4).unwrap(), before);
}
