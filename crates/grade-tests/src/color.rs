//! Color conversion round trips over random samples.

use grade_color::{lch_to_rgb, rgb_to_lch, rgb_to_xyz, xyz_to_rgb};
use grade_math::{Vec3, wrapped_distance};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::SEED;

const SAMPLES: usize = 10_000;

fn random_rgb(rng: &mut StdRng) -> Vec3 {
    // strictly inside the unit cube
    let mut c = || rng.random_range(1e-6..1.0 - 1e-6);
    Vec3::new(c(), c(), c())
}

#[test]
fn test_lch_roundtrip_random() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..SAMPLES {
        let rgb = random_rgb(&mut rng);
        let a = rgb_to_lch(rgb);
        let b = rgb_to_lch(lch_to_rgb(a));
        assert!((a.l - b.l).abs() < 1e-4, "lightness {rgb:?}: {a:?} vs {b:?}");
        assert!((a.c - b.c).abs() < 1e-4, "chroma {rgb:?}: {a:?} vs {b:?}");
        // hue is undefined for neutral colors
        if a.c > 1e-6 {
            assert!(wrapped_distance(a.h, b.h) < 1e-4, "hue {rgb:?}: {a:?} vs {b:?}");
        }
    }
}

#[test]
fn test_xyz_roundtrip_random() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);
    for _ in 0..SAMPLES {
        let rgb = random_rgb(&mut rng);
        let back = xyz_to_rgb(rgb_to_xyz(rgb));
        assert!(back.max_abs_diff(rgb) < 1e-5, "{rgb:?} -> {back:?}");
    }
}

#[test]
fn test_conversions_total_outside_unit_cube() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 2);
    for _ in 0..1000 {
        let mut c = || rng.random_range(-2.0..3.0);
        let rgb = Vec3::new(c(), c(), c());
        let lch = rgb_to_lch(rgb);
        assert!(!lch.l.is_nan() && !lch.c.is_nan() && !lch.h.is_nan(), "{rgb:?}");
        assert!((0.0..1.0).contains(&lch.h));
        assert!(!lch_to_rgb(lch).is_nan());
    }
}
