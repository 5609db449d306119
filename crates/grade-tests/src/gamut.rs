//! Gamut table properties.

use grade_color::{Lch, lch_to_rgb, rgb_to_lch};
use grade_math::Vec3;
use grade_ops::gamut::{DEFAULT_RESOLUTION, FALLBACK_LIGHTNESS_RANGE};
use grade_ops::{GamutTable, lightness_range, max_chroma};

const GRID: usize = DEFAULT_RESOLUTION;

/// Cell centres of the default-resolution table, as (lightness, hue).
fn grid() -> impl Iterator<Item = (f64, f64)> {
    (0..GRID).flat_map(|i| {
        (0..GRID).map(move |j| ((i as f64 + 0.5) / GRID as f64, (j as f64 + 0.5) / GRID as f64))
    })
}

/// `(lightness, hue, rgb)` for every cell centre where the chroma limit
/// converts outside `[-1/255, 1 + 1/255]`.
fn chroma_limit_outliers() -> Vec<(f64, f64, Vec3)> {
    let tolerance = 1.0 / 255.0;
    grid()
        .filter_map(|(lightness, hue)| {
            let chroma = max_chroma(lightness, hue);
            assert!(chroma >= 0.0);
            let rgb = lch_to_rgb(Lch::new(lightness, chroma, hue));
            let inside = rgb
                .to_array()
                .iter()
                .all(|v| (-tolerance..=1.0 + tolerance).contains(v));
            (!inside).then_some((lightness, hue, rgb))
        })
        .collect()
}

#[test]
fn test_max_chroma_stays_in_band_below_white() {
    // Lightness above white is not displayable even at zero chroma.
    let white = rgb_to_lch(Vec3::ONE).l;
    let outliers = chroma_limit_outliers();
    for (lightness, hue, rgb) in &outliers {
        assert!(*lightness > white, "L={lightness} h={hue} -> {rgb:?}");
    }
    // The top row sits above white, and it is where the band is left.
    let top = (GRID as f64 - 0.5) / GRID as f64;
    assert!(top > white);
    assert!(outliers.iter().any(|&(l, _, _)| l == top));
    for &(_, _, rgb) in &outliers {
        assert!(rgb.max_element() > 1.0 && rgb.min_element() >= 0.0, "{rgb:?}");
    }
}

#[test]
fn test_achromatic_range_spans_nearly_everything() {
    for j in 0..GRID {
        let hue = j as f64 / GRID as f64;
        let range = lightness_range(0.0, hue);
        assert!(range.min < 0.01, "hue {hue}: {range:?}");
        assert!(range.max > 0.97, "hue {hue}: {range:?}");
    }
}

#[test]
fn test_unreachable_chroma_falls_back() {
    // far beyond any displayable chroma
    assert_eq!(lightness_range(5.0, 0.3), FALLBACK_LIGHTNESS_RANGE);
}

// The table's first axis is read as lightness by the chroma search and as
// chroma by the lightness scan. These tests pin that layout down.
#[test]
fn test_table_axis1_has_two_meanings() {
    let res = crate::TEST_TABLE_RESOLUTION;
    let table = GamutTable::build(res).unwrap();
    for (i, j) in [(0, 0), (5, 17), (20, 40), (63, 63)] {
        let axis1 = (i as f64 + 0.5) / res as f64;
        let hue = (j as f64 + 0.5) / res as f64;
        let cell = table.cell(i, j).unwrap();
        assert_eq!(cell.max_chroma, max_chroma(axis1, hue));
        assert_eq!(cell.lightness_range(), lightness_range(axis1, hue));
    }

    // Column 2 read as lightness 0.04 still allows chroma above 0.25, read
    // as chroma 0.04 it caps the lightness range below white.
    let cell = table.cell(2, 32).unwrap();
    assert!(cell.max_chroma > 0.25, "{cell:?}");
    assert_eq!(cell.min_lightness, 0.0);
    assert!(cell.max_lightness > 0.8 && cell.max_lightness < 0.95, "{cell:?}");
}

#[test]
fn test_rebuild_is_deterministic() {
    let a = GamutTable::build(16).unwrap();
    let b = GamutTable::build(16).unwrap();
    assert_eq!(a.cells(), b.cells());
    assert_eq!(a.empty_slices(), b.empty_slices());
}
