//! Render kernel behavior across the gamut table and tone curve.

use approx::assert_abs_diff_eq;
use grade_color::{Lch, lch_to_rgb, rgb_to_lch};
use grade_math::Vec3;
use grade_ops::render::{bend_lightness, is_gamut_violation};
use grade_ops::{GamutTable, Kernel, RenderParams, ToneCurve};
use std::sync::OnceLock;

fn table() -> &'static GamutTable {
    static TABLE: OnceLock<GamutTable> = OnceLock::new();
    TABLE.get_or_init(|| GamutTable::build(crate::TEST_TABLE_RESOLUTION).unwrap())
}

fn graded(lch: Lch, intensity: f64) -> Lch {
    let curve = ToneCurve::neutral(256).unwrap();
    let params = RenderParams {
        intensity,
        ..RenderParams::default()
    };
    Kernel::new(table(), &curve, &params).grade_lch(lch)
}

#[test]
fn test_zero_intensity_keeps_lightness() {
    for v in [0.05, 0.3, 0.5, 0.8] {
        let lch = rgb_to_lch(Vec3::splat(v));
        assert_abs_diff_eq!(graded(lch, 0.0).l, lch.l, epsilon = 1e-12);
    }
}

#[test]
fn test_intensity_converges_to_range_ends() {
    let lch = rgb_to_lch(Vec3::splat(0.5));
    let range = table().lightness_range_at(lch.c, lch.h);
    assert!(range.span() > 0.0);

    let mut previous = lch.l;
    for intensity in [0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0] {
        let l = graded(lch, intensity).l;
        assert!(l >= previous, "intensity {intensity}: {l} < {previous}");
        assert!(l <= range.max + 1e-12);
        previous = l;
    }
    assert_abs_diff_eq!(previous, range.max, epsilon = 1e-6);

    let mut previous = lch.l;
    for intensity in [-0.25, -0.5, -1.0, -2.0, -4.0, -8.0, -16.0] {
        let l = graded(lch, intensity).l;
        assert!(l <= previous, "intensity {intensity}: {l} > {previous}");
        assert!(l >= range.min - 1e-12);
        previous = l;
    }
    assert_abs_diff_eq!(previous, range.min, epsilon = 1e-6);
}

#[test]
fn test_kernel_reads_table_with_both_axis_meanings() {
    let lch = Lch::new(0.4, 0.12, 0.6);
    let intensity = 0.7;
    let out = graded(lch, intensity);

    // lightness range from (chroma, hue), chroma limits from (lightness, hue)
    let range = table().lightness_range_at(lch.c, lch.h);
    let clipped = lch.c.min(table().max_chroma_at(lch.l, lch.h) * 0.98);
    let l = bend_lightness(lch.l, range, intensity);
    let c = clipped.min(table().max_chroma_at(l, lch.h) * 0.98);

    assert_abs_diff_eq!(out.l, l, epsilon = 1e-12);
    assert_abs_diff_eq!(out.c, c, epsilon = 1e-12);
    assert_eq!(out.h, lch.h);
}

#[test]
fn test_chroma_never_exceeds_table_limit() {
    let lch = Lch::new(0.5, 0.9, 0.25);
    let out = graded(lch, 0.3);
    assert!(out.c <= table().max_chroma_at(out.l, out.h) * 0.98 + 1e-12);
    assert!(out.c < lch.c);
}

#[test]
fn test_overexposed_white_shows_checker() {
    let curve = ToneCurve::neutral(256).unwrap();
    let params = RenderParams {
        exposure: 3.0,
        show_gamut_border: true,
        background: [0.0; 3],
        ..RenderParams::default()
    };
    let kernel = Kernel::new(table(), &curve, &params);
    for uv in [[0.1f32, 0.2], [0.5, 0.5], [0.73, 0.11]] {
        let out = kernel.grade([1.0, 1.0, 1.0, 1.0], uv);
        assert!(out[0] == 0.0 || out[0] == 1.0, "{out:?}");
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert_eq!(out[3], 1.0);
    }

    let hidden = RenderParams {
        show_gamut_border: false,
        ..params
    };
    let out = Kernel::new(table(), &curve, &hidden).grade([1.0, 1.0, 1.0, 1.0], [0.1, 0.2]);
    assert_eq!(out, [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_violation_marker_inputs() {
    let red = Lch::new(0.5, 0.3, 0.1);
    assert!(is_gamut_violation(lch_to_rgb(red), red));
    let gray = rgb_to_lch(Vec3::splat(0.5));
    assert!(!is_gamut_violation(lch_to_rgb(gray), gray));
}
