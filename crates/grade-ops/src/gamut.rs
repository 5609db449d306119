//! Gamut boundary of the display RGB cube inside normalized LCh.
//!
//! Two numerical searches run over [`lch_to_rgb`]:
//!
//! - [`max_chroma`] bisects the chroma axis at a fixed (lightness, hue)
//! - [`lightness_range`] scans the lightness axis at a fixed (chroma, hue)
//!   looking for the entry and exit of the gamut
//!
//! [`GamutTable`] precomputes both on an `R x R` grid. Each cell is computed
//! at one grid coordinate `(axis1, hue)`, but the two searches read `axis1`
//! differently: the chroma limit treats it as lightness, the lightness range
//! treats it as chroma. Lookups follow the same convention, so
//! [`GamutTable::max_chroma_at`] takes a lightness and
//! [`GamutTable::lightness_range_at`] takes a chroma.
//!
//! # Example
//!
//! ```rust
//! use grade_ops::gamut::{GamutTable, max_chroma};
//!
//! let table = GamutTable::build(16).unwrap();
//! let limit = table.max_chroma_at(0.5, 0.25);
//! assert!(limit > 0.0 && limit < 1.0);
//! assert!((limit - max_chroma(0.5, 0.25)).abs() < 0.1);
//! ```

use std::time::Instant;

use grade_color::{Lch, lch_to_rgb};
use grade_core::{GradeError, GradeResult};
use grade_math::{Vec3, lerp, wrap01};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

/// Default cells per axis.
pub const DEFAULT_RESOLUTION: usize = 256;

/// Bisection steps in [`max_chroma`].
pub const CHROMA_SEARCH_STEPS: usize = 12;

/// Lightness samples in [`lightness_range`], evenly spaced over [0, 1].
pub const LIGHTNESS_SCAN_SAMPLES: usize = 256;

/// Range reported when the lightness scan never enters the gamut.
pub const FALLBACK_LIGHTNESS_RANGE: LightnessRange = LightnessRange { min: 0.2, max: 0.8 };

const CHROMA_CORRECTION: f64 = 1.0 / 255.0;

/// `true` if every channel is inside [0, 1]. NaN is never displayable.
#[inline]
pub fn is_displayable(rgb: Vec3) -> bool {
    rgb.to_array().iter().all(|c| (0.0..=1.0).contains(c))
}

/// `true` if the LCh color converts to a displayable RGB triple.
#[inline]
pub fn lch_in_gamut(lch: Lch) -> bool {
    is_displayable(lch_to_rgb(lch))
}

/// Largest chroma at `(lightness, hue)` that still converts to displayable RGB.
///
/// Bisection from 0.5 with an initial step of 0.25, followed by up to two
/// `1/255` decrements while the result is still outside. Lightness values
/// where even the achromatic color is not displayable (very close to 1)
/// yield 0.
pub fn max_chroma(lightness: f64, hue: f64) -> f64 {
    let mut lch = Lch::new(lightness, 0.5, hue);
    let mut step = 0.25;

    for _ in 0..CHROMA_SEARCH_STEPS {
        lch.c += if lch_in_gamut(lch) { step } else { -step };
        step *= 0.5;
    }

    for _ in 0..2 {
        if !lch_in_gamut(lch) {
            lch.c -= CHROMA_CORRECTION;
        }
    }

    lch.c.max(0.0)
}

/// Lightness interval of the gamut along one (chroma, hue) line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightnessRange {
    /// First scanned lightness inside the gamut.
    pub min: f64,
    /// Last scanned lightness inside the gamut before leaving it.
    pub max: f64,
}

impl LightnessRange {
    /// `max - min`.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for LightnessRange {
    fn default() -> Self {
        FALLBACK_LIGHTNESS_RANGE
    }
}

/// Scans lightness at a fixed (chroma, hue). `None` if no sample is inside.
fn scan_lightness(chroma: f64, hue: f64) -> Option<LightnessRange> {
    let mut range = FALLBACK_LIGHTNESS_RANGE;
    let mut entered = false;
    let mut previously_inside = false;
    let mut previous = 0.0;

    for i in 0..LIGHTNESS_SCAN_SAMPLES {
        let lightness = i as f64 / (LIGHTNESS_SCAN_SAMPLES - 1) as f64;
        let inside = lch_in_gamut(Lch::new(lightness, chroma, hue));

        if inside && !previously_inside && !entered {
            range.min = lightness;
            entered = true;
        }
        if !inside && previously_inside {
            range.max = previous;
        }

        previously_inside = inside;
        previous = lightness;
    }

    entered.then_some(range)
}

/// Lightness interval of the gamut at `(chroma, hue)`.
///
/// A linear scan of [`LIGHTNESS_SCAN_SAMPLES`] samples. The first entry
/// into the gamut sets `min`, the last exit sets `max` to the final sample
/// that was still inside. Lines that never enter the gamut report
/// [`FALLBACK_LIGHTNESS_RANGE`].
pub fn lightness_range(chroma: f64, hue: f64) -> LightnessRange {
    scan_lightness(chroma, hue).unwrap_or(FALLBACK_LIGHTNESS_RANGE)
}

/// One table record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamutLimits {
    /// Lower end of the lightness range.
    pub min_lightness: f64,
    /// Chroma limit.
    pub max_chroma: f64,
    /// Upper end of the lightness range.
    pub max_lightness: f64,
}

impl GamutLimits {
    /// Assembles a record from its two search results.
    #[inline]
    pub fn from_parts(range: LightnessRange, max_chroma: f64) -> Self {
        Self {
            min_lightness: range.min,
            max_chroma,
            max_lightness: range.max,
        }
    }

    /// The lightness part of the record.
    #[inline]
    pub fn lightness_range(&self) -> LightnessRange {
        LightnessRange {
            min: self.min_lightness,
            max: self.max_lightness,
        }
    }

    fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self {
            min_lightness: lerp(a.min_lightness, b.min_lightness, t),
            max_chroma: lerp(a.max_chroma, b.max_chroma, t),
            max_lightness: lerp(a.max_lightness, b.max_lightness, t),
        }
    }
}

impl Default for GamutLimits {
    fn default() -> Self {
        Self::from_parts(FALLBACK_LIGHTNESS_RANGE, 0.0)
    }
}

/// Precomputed gamut limits on an `R x R` grid.
///
/// Rows are hue, columns are `axis1`; cell `(i, j)` is computed at
/// `axis1 = (i + 0.5) / R`, `hue = (j + 0.5) / R`. Immutable once built.
#[derive(Debug, Clone)]
pub struct GamutTable {
    resolution: usize,
    cells: Vec<GamutLimits>,
    empty_slices: usize,
}

/// Fills one hue row; returns how many cells never entered the gamut.
fn fill_row(resolution: usize, j: usize, row: &mut [GamutLimits]) -> usize {
    let hue = (j as f64 + 0.5) / resolution as f64;
    let mut empty = 0;
    for (i, cell) in row.iter_mut().enumerate() {
        let axis1 = (i as f64 + 0.5) / resolution as f64;
        let range = scan_lightness(axis1, hue).unwrap_or_else(|| {
            empty += 1;
            FALLBACK_LIGHTNESS_RANGE
        });
        *cell = GamutLimits::from_parts(range, max_chroma(axis1, hue));
    }
    empty
}

impl GamutTable {
    /// Builds the table, blocking until every cell is computed.
    ///
    /// # Errors
    ///
    /// [`GradeError::InvalidParameter`] if `resolution` is zero.
    pub fn build(resolution: usize) -> GradeResult<Self> {
        if resolution == 0 {
            return Err(GradeError::invalid_parameter(
                "resolution",
                "gamut table needs at least one cell per axis",
            ));
        }

        let start = Instant::now();
        let mut cells = vec![GamutLimits::default(); resolution * resolution];

        #[cfg(feature = "parallel")]
        let empty: usize = cells
            .par_chunks_mut(resolution)
            .enumerate()
            .map(|(j, row)| fill_row(resolution, j, row))
            .sum();

        #[cfg(not(feature = "parallel"))]
        let empty: usize = cells
            .chunks_mut(resolution)
            .enumerate()
            .map(|(j, row)| fill_row(resolution, j, row))
            .sum();

        debug!(
            resolution,
            empty_slices = empty,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built gamut table"
        );
        if empty == cells.len() {
            warn!(resolution, "gamut table has no displayable cell");
        }

        Ok(Self {
            resolution,
            cells,
            empty_slices: empty,
        })
    }

    /// Cells per axis.
    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Cells whose lightness scan never entered the gamut and hold
    /// [`FALLBACK_LIGHTNESS_RANGE`].
    #[inline]
    pub fn empty_slices(&self) -> usize {
        self.empty_slices
    }

    /// All cells, hue-major.
    #[inline]
    pub fn cells(&self) -> &[GamutLimits] {
        &self.cells
    }

    /// Cell at column `i` (axis1) and row `j` (hue), or `None` if out of range.
    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> Option<GamutLimits> {
        if i >= self.resolution || j >= self.resolution {
            return None;
        }
        Some(self.cells[j * self.resolution + i])
    }

    /// Bilinear lookup, clamped on `axis1` and repeating on `hue`.
    pub fn sample(&self, axis1: f64, hue: f64) -> GamutLimits {
        let n = self.resolution;
        let last = (n - 1) as isize;

        let fx = axis1 * n as f64 - 0.5;
        let fy = wrap01(hue) * n as f64 - 0.5;
        let (x0, y0) = (fx.floor(), fy.floor());
        let (tx, ty) = (fx - x0, fy - y0);

        let col = |x: f64| (x as isize).clamp(0, last) as usize;
        let row = |y: f64| (y as isize).rem_euclid(n as isize) as usize;
        let (i0, i1) = (col(x0), col(x0 + 1.0));
        let (j0, j1) = (row(y0), row(y0 + 1.0));

        let at = |i: usize, j: usize| self.cells[j * n + i];
        let top = GamutLimits::lerp(at(i0, j0), at(i1, j0), tx);
        let bottom = GamutLimits::lerp(at(i0, j1), at(i1, j1), tx);
        GamutLimits::lerp(top, bottom, ty)
    }

    /// Interpolated chroma limit at `(lightness, hue)`.
    #[inline]
    pub fn max_chroma_at(&self, lightness: f64, hue: f64) -> f64 {
        self.sample(lightness, hue).max_chroma
    }

    /// Interpolated lightness range at `(chroma, hue)`.
    #[inline]
    pub fn lightness_range_at(&self, chroma: f64, hue: f64) -> LightnessRange {
        self.sample(chroma, hue).lightness_range()
    }
}
