//! Lightness tone curve built from sparse control points.
//!
//! Every point contributes an unnormalized Gaussian bump
//! `2^(-(x - p.x)^2 / p.size) * p.y`; contributions are summed, so order
//! does not matter and overlapping points can add up beyond [-1, 1]. The
//! sum is mapped to `value * 0.5 + 0.5` and clamped into a dense lookup.
//! With no points the lookup is 0.5 everywhere.
//!
//! ```rust
//! use grade_ops::tone_curve::{ControlPoint, ToneCurve};
//!
//! let curve = ToneCurve::new(vec![ControlPoint::new(0.5, 0.4, 0.01)], 256).unwrap();
//! assert!((curve.sample(0.5) - 0.7).abs() < 1e-3);
//! assert!((curve.sample(0.0) - 0.5).abs() < 1e-6);
//! ```

use grade_core::{GradeError, GradeResult};
use grade_math::lerp;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default lookup length.
pub const DEFAULT_LOOKUP_LEN: usize = 256;

/// Horizontal drag gain, in curve units per viewport width.
pub const DRAG_GAIN_X: f64 = 6.0;

/// Vertical drag gain, in curve units per viewport height.
pub const DRAG_GAIN_Y: f64 = 2.0;

/// User-authored control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Lightness position.
    pub x: f64,
    /// Offset at the position; positive brightens.
    pub y: f64,
    /// Influence radius; the squared distance is divided by it.
    pub size: f64,
}

impl ControlPoint {
    /// Creates a control point.
    #[inline]
    pub const fn new(x: f64, y: f64, size: f64) -> Self {
        Self { x, y, size }
    }

    /// Contribution at `x`. Points with a non-positive size contribute nothing.
    #[inline]
    pub fn weight(&self, x: f64) -> f64 {
        if self.size <= 0.0 || self.size.is_nan() {
            return 0.0;
        }
        let d = x - self.x;
        (-(d * d) / self.size).exp2() * self.y
    }

    /// The point set a fresh session starts with.
    pub fn default_set() -> Vec<Self> {
        vec![Self::default()]
    }
}

impl Default for ControlPoint {
    fn default() -> Self {
        Self::new(0.8, -0.8, 0.003)
    }
}

/// Raw curve value at `x`: the sum of all point contributions.
pub fn evaluate(points: &[ControlPoint], x: f64) -> f64 {
    points.iter().map(|p| p.weight(x)).sum()
}

/// Control points plus their dense lookup.
///
/// The lookup is rebuilt in full whenever the points change; there is no
/// incremental update.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneCurve {
    points: Vec<ControlPoint>,
    lookup: Vec<f64>,
}

impl ToneCurve {
    /// Builds a curve with a lookup of `len` samples at `i / (len - 1)`.
    ///
    /// # Errors
    ///
    /// [`GradeError::InvalidParameter`] if `len < 2`.
    pub fn new(points: Vec<ControlPoint>, len: usize) -> GradeResult<Self> {
        if len < 2 {
            return Err(GradeError::invalid_parameter(
                "len",
                format!("tone curve lookup needs at least 2 samples, got {len}"),
            ));
        }
        let mut curve = Self {
            points,
            lookup: vec![0.5; len],
        };
        curve.rebuild();
        Ok(curve)
    }

    /// A curve without points: 0.5 everywhere.
    pub fn neutral(len: usize) -> GradeResult<Self> {
        Self::new(Vec::new(), len)
    }

    fn rebuild(&mut self) {
        let last = (self.lookup.len() - 1) as f64;
        for (i, slot) in self.lookup.iter_mut().enumerate() {
            let value = evaluate(&self.points, i as f64 / last);
            *slot = (value * 0.5 + 0.5).clamp(0.0, 1.0);
        }
        debug!(points = self.points.len(), len = self.lookup.len(), "rebuilt tone curve");
    }

    /// Control points in authoring order.
    #[inline]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Dense lookup values in [0, 1].
    #[inline]
    pub fn lookup(&self) -> &[f64] {
        &self.lookup
    }

    /// Lookup length.
    #[inline]
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Always `false`; a curve has at least two samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Unclamped curve value at `x`, straight from the points.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        evaluate(&self.points, x)
    }

    /// Lookup value at lightness `l`, linearly interpolated and clamped to the ends.
    pub fn sample(&self, l: f64) -> f64 {
        let last = self.lookup.len() - 1;
        let pos = (l * last as f64).clamp(0.0, last as f64);
        if pos.is_nan() {
            return self.lookup[0];
        }
        let i0 = (pos.floor() as usize).min(last);
        let i1 = (i0 + 1).min(last);
        lerp(self.lookup[i0], self.lookup[i1], pos - i0 as f64)
    }

    /// Replaces all points and rebuilds, keeping the lookup length.
    pub fn set_points(&mut self, points: Vec<ControlPoint>) {
        self.points = points;
        self.rebuild();
    }

    /// Moves point `index` by a pointer delta given as fractions of the
    /// viewport (`dx` of its width, `dy` of its height, y pointing down) and
    /// rebuilds.
    ///
    /// # Errors
    ///
    /// [`GradeError::InvalidParameter`] if `index` is out of range.
    pub fn drag(&mut self, index: usize, dx: f64, dy: f64) -> GradeResult<()> {
        let count = self.points.len();
        let point = self.points.get_mut(index).ok_or_else(|| {
            GradeError::invalid_parameter(
                "index",
                format!("control point {index} does not exist ({count} points)"),
            )
        })?;
        point.x += DRAG_GAIN_X * dx;
        point.y -= DRAG_GAIN_Y * dy;
        self.rebuild();
        Ok(())
    }
}

impl Default for ToneCurve {
    fn default() -> Self {
        let points = ControlPoint::default_set();
        let mut curve = Self {
            points,
            lookup: vec![0.5; DEFAULT_LOOKUP_LEN],
        };
        curve.rebuild();
        curve
    }
}
