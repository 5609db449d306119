//! The grading context: shared resources, input bindings and frames.
//!
//! A [`Pipeline`] owns the gamut table and the tone curve. Both are
//! published as immutable [`Arc`] snapshots behind an [`RwLock`]: rebuilds
//! happen off to the side and are swapped in whole, and a [`Frame`] clones
//! both `Arc`s once when it is created. A frame therefore renders with
//! either the complete previous resource or the complete new one.
//!
//! # Example
//!
//! ```rust
//! use grade_core::RgbaImage;
//! use grade_ops::{Pipeline, PipelineConfig, RenderParams};
//!
//! let config = PipelineConfig { gamut_resolution: 16, ..PipelineConfig::default() };
//! let pipeline = Pipeline::new(config).unwrap();
//!
//! let image = RgbaImage::filled(4, 4, [0.5, 0.5, 0.5, 1.0]);
//! let mut frame = pipeline.frame();
//! frame.bind("source", image.into()).unwrap();
//! frame.bind("intensity", 0.3.into()).unwrap();
//! let out = frame.render(8, 8).unwrap();
//! assert_eq!(out.dimensions(), (8, 8));
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use grade_core::{GradeError, GradeResult, RgbaImage};
use tracing::debug;

use crate::bindings::{Binding, BindingTable, BoundInputs, InputKind, InputValue, Texture};
use crate::gamut::GamutTable;
use crate::histogram::Histogram;
use crate::params::{self, PipelineConfig, RenderParams};
use crate::render::{self, Kernel, ViewTransform};
use crate::tone_curve::{ControlPoint, ToneCurve};

/// Inputs of the render program, in slot-assignment order.
pub const RENDER_INPUTS: [(&str, InputKind); 10] = [
    ("source", InputKind::Image),
    ("tone_curve", InputKind::Curve),
    ("gamut_limits", InputKind::Gamut),
    ("intensity", InputKind::Float),
    ("exposure", InputKind::Float),
    ("dither_amplitude", InputKind::Float),
    ("show_gamut_border", InputKind::Flag),
    ("background", InputKind::Color),
    ("view_scale", InputKind::Vec2),
    ("view_offset", InputKind::Vec2),
];

/// Bindings of [`RENDER_INPUTS`], resolved once.
#[derive(Debug, Clone, Copy)]
struct RenderSlots {
    source: Binding,
    tone_curve: Binding,
    gamut_limits: Binding,
    intensity: Binding,
    exposure: Binding,
    dither_amplitude: Binding,
    show_gamut_border: Binding,
    background: Binding,
    view_scale: Binding,
    view_offset: Binding,
}

impl RenderSlots {
    fn resolve(table: &BindingTable) -> GradeResult<Self> {
        Ok(Self {
            source: table.resolve("source", InputKind::Image)?,
            tone_curve: table.resolve("tone_curve", InputKind::Curve)?,
            gamut_limits: table.resolve("gamut_limits", InputKind::Gamut)?,
            intensity: table.resolve("intensity", InputKind::Float)?,
            exposure: table.resolve("exposure", InputKind::Float)?,
            dither_amplitude: table.resolve("dither_amplitude", InputKind::Float)?,
            show_gamut_border: table.resolve("show_gamut_border", InputKind::Flag)?,
            background: table.resolve("background", InputKind::Color)?,
            view_scale: table.resolve("view_scale", InputKind::Vec2)?,
            view_offset: table.resolve("view_offset", InputKind::Vec2)?,
        })
    }
}

fn snapshot<T>(lock: &RwLock<Arc<T>>) -> Arc<T> {
    Arc::clone(&lock.read().unwrap_or_else(PoisonError::into_inner))
}

fn publish<T>(lock: &RwLock<Arc<T>>, value: T) {
    *lock.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(value);
}

/// Explicit grading context; no global state.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    table: BindingTable,
    slots: RenderSlots,
    gamut: RwLock<Arc<GamutTable>>,
    curve: RwLock<Arc<ToneCurve>>,
}

impl Pipeline {
    /// Builds the gamut table (blocking) and the default tone curve.
    ///
    /// # Errors
    ///
    /// [`GradeError::InvalidParameter`] for a zero table resolution or a
    /// curve length below 2.
    pub fn new(config: PipelineConfig) -> GradeResult<Self> {
        Self::with_points(config, ControlPoint::default_set())
    }

    /// Like [`Pipeline::new`] with an explicit initial point set.
    pub fn with_points(config: PipelineConfig, points: Vec<ControlPoint>) -> GradeResult<Self> {
        let table = BindingTable::new(RENDER_INPUTS)?;
        let slots = RenderSlots::resolve(&table)?;
        let curve = ToneCurve::new(points, config.curve_len)?;
        let gamut = GamutTable::build(config.gamut_resolution)?;
        debug!(?config, "pipeline ready");
        Ok(Self {
            config,
            table,
            slots,
            gamut: RwLock::new(Arc::new(gamut)),
            curve: RwLock::new(Arc::new(curve)),
        })
    }

    /// Tunables the pipeline was built with.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The render program's input declarations.
    #[inline]
    pub fn bindings(&self) -> &BindingTable {
        &self.table
    }

    /// Current gamut table snapshot.
    pub fn gamut_table(&self) -> Arc<GamutTable> {
        snapshot(&self.gamut)
    }

    /// Current tone curve snapshot.
    pub fn tone_curve(&self) -> Arc<ToneCurve> {
        snapshot(&self.curve)
    }

    /// Rebuilds the gamut table at a new resolution and swaps it in once
    /// complete. Frames already created keep the old table.
    pub fn rebuild_gamut_table(&self, resolution: usize) -> GradeResult<()> {
        let table = GamutTable::build(resolution)?;
        publish(&self.gamut, table);
        Ok(())
    }

    /// Replaces the control points, rebuilding the curve lookup.
    pub fn set_control_points(&self, points: Vec<ControlPoint>) -> GradeResult<()> {
        let curve = ToneCurve::new(points, self.config.curve_len)?;
        publish(&self.curve, curve);
        Ok(())
    }

    /// Drags one control point; see [`ToneCurve::drag`].
    pub fn drag_control_point(&self, index: usize, dx: f64, dy: f64) -> GradeResult<()> {
        let mut guard = self.curve.write().unwrap_or_else(PoisonError::into_inner);
        let mut curve = ToneCurve::clone(&guard);
        curve.drag(index, dx, dy)?;
        *guard = Arc::new(curve);
        Ok(())
    }

    /// Starts a frame: snapshots the shared resources and fills the scalar
    /// inputs with [`RenderParams::default`] and an identity view.
    pub fn frame(&self) -> Frame<'_> {
        let mut inputs = BoundInputs::new(&self.table);
        inputs.store(self.slots.tone_curve.slot, InputValue::Curve(self.tone_curve()));
        inputs.store(self.slots.gamut_limits.slot, InputValue::Gamut(self.gamut_table()));
        let mut frame = Frame {
            pipeline: self,
            inputs,
        };
        frame.set_params(&RenderParams::default());
        frame.set_view(ViewTransform::IDENTITY);
        frame
    }

    /// Renders `source` into a `width x height` viewport, fitted with the
    /// configured overscan.
    pub fn render(
        &self,
        source: &RgbaImage,
        params: &RenderParams,
        width: u32,
        height: u32,
    ) -> GradeResult<RgbaImage> {
        let mut frame = self.frame();
        frame.set_params(params);
        frame.set_view(ViewTransform::fit_image(source, width, height, self.config.overscan));
        frame.bind("source", source.clone().into())?;
        frame.render(width, height)
    }

    /// Histogram over the configured sampling grid, or every pixel when the
    /// configured resolution is 0.
    pub fn histogram(&self, source: &RgbaImage) -> GradeResult<Histogram> {
        match self.config.histogram_resolution {
            0 => Ok(Histogram::compute(source)),
            r => Histogram::compute_resampled(source, r),
        }
    }

    /// See [`params::auto_exposure`].
    pub fn auto_exposure(&self, source: &RgbaImage) -> f64 {
        params::auto_exposure(source)
    }
}

/// One draw: a set of bound inputs over resource snapshots.
#[derive(Debug, Clone)]
pub struct Frame<'p> {
    pipeline: &'p Pipeline,
    inputs: BoundInputs,
}

impl Frame<'_> {
    /// Binds a named input.
    ///
    /// # Errors
    ///
    /// [`GradeError::UnknownInput`] or [`GradeError::InputKindMismatch`].
    pub fn bind(&mut self, name: &str, value: InputValue) -> GradeResult<&mut Self> {
        self.inputs.bind(&self.pipeline.table, name, value)?;
        Ok(self)
    }

    /// Writes all scalar parameters at once.
    pub fn set_params(&mut self, params: &RenderParams) -> &mut Self {
        let s = self.pipeline.slots;
        self.inputs.store(s.intensity.slot, InputValue::Float(params.intensity));
        self.inputs.store(s.exposure.slot, InputValue::Float(params.exposure));
        self.inputs.store(s.dither_amplitude.slot, InputValue::Float(params.dither_amplitude));
        self.inputs.store(s.show_gamut_border.slot, InputValue::Flag(params.show_gamut_border));
        self.inputs.store(s.background.slot, InputValue::Color(params.background));
        self
    }

    /// Writes the view scale and offset.
    pub fn set_view(&mut self, view: ViewTransform) -> &mut Self {
        let s = self.pipeline.slots;
        self.inputs.store(s.view_scale.slot, InputValue::Vec2(view.scale));
        self.inputs.store(s.view_offset.slot, InputValue::Vec2(view.offset));
        self
    }

    /// Scalar parameters as currently bound.
    pub fn params(&self) -> RenderParams {
        let s = self.pipeline.slots;
        let [r, g, b] = self.inputs.vector(s.background.slot);
        RenderParams {
            exposure: self.inputs.scalar(s.exposure.slot),
            intensity: self.inputs.scalar(s.intensity.slot),
            dither_amplitude: self.inputs.scalar(s.dither_amplitude.slot),
            show_gamut_border: self.inputs.flag(s.show_gamut_border.slot),
            background: [r as f32, g as f32, b as f32],
        }
    }

    /// View as currently bound.
    pub fn view(&self) -> ViewTransform {
        let s = self.pipeline.slots;
        let [sx, sy, _] = self.inputs.vector(s.view_scale.slot);
        let [ox, oy, _] = self.inputs.vector(s.view_offset.slot);
        ViewTransform {
            scale: [sx, sy],
            offset: [ox, oy],
        }
    }

    fn texture(&self, name: &str, binding: Binding) -> GradeResult<&Texture> {
        self.inputs.texture(binding.slot).ok_or_else(|| {
            GradeError::invalid_parameter("inputs", format!("input `{name}` has no value bound"))
        })
    }

    /// Runs the kernel over a `width x height` viewport.
    ///
    /// # Errors
    ///
    /// [`GradeError::InvalidParameter`] if no source image was bound.
    pub fn render(&self, width: u32, height: u32) -> GradeResult<RgbaImage> {
        let s = self.pipeline.slots;
        let source = match self.texture("source", s.source)? {
            Texture::Image(image) => image,
            other => return Err(mismatch("source", InputKind::Image, other)),
        };
        let curve = match self.texture("tone_curve", s.tone_curve)? {
            Texture::Curve(curve) => curve,
            other => return Err(mismatch("tone_curve", InputKind::Curve, other)),
        };
        let gamut = match self.texture("gamut_limits", s.gamut_limits)? {
            Texture::Gamut(gamut) => gamut,
            other => return Err(mismatch("gamut_limits", InputKind::Gamut, other)),
        };

        let params = self.params();
        let kernel = Kernel::new(gamut, curve, &params);
        Ok(render::render(&kernel, source, &self.view(), width, height))
    }
}

fn mismatch(name: &str, expected: InputKind, got: &Texture) -> GradeError {
    let got = match got {
        Texture::Image(_) => InputKind::Image,
        Texture::Curve(_) => InputKind::Curve,
        Texture::Gamut(_) => InputKind::Gamut,
    };
    GradeError::InputKindMismatch {
        name: name.to_owned(),
        expected: expected.name(),
        got: got.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::OnceLock;

    fn pipeline() -> &'static Pipeline {
        static PIPELINE: OnceLock<Pipeline> = OnceLock::new();
        PIPELINE.get_or_init(|| {
            let config = PipelineConfig {
                gamut_resolution: 32,
                ..PipelineConfig::default()
            };
            Pipeline::new(config).unwrap()
        })
    }

    #[test]
    fn test_render_inputs_resolve() {
        let p = pipeline();
        assert_eq!(p.bindings().len(), RENDER_INPUTS.len());
        assert_eq!(p.bindings().lookup("gamut_limits").unwrap().slot, 2);
        assert_eq!(p.bindings().lookup("view_offset").unwrap().slot, 2);
    }

    #[test]
    fn test_frame_binding_errors() {
        let mut frame = pipeline().frame();
        assert!(matches!(
            frame.bind("viewScale", [1.0, 1.0].into()),
            Err(GradeError::UnknownInput(_))
        ));
        assert!(matches!(
            frame.bind("exposure", true.into()),
            Err(GradeError::InputKindMismatch { .. })
        ));
        // no source bound yet
        assert!(frame.render(2, 2).is_err());
    }

    #[test]
    fn test_frame_params_roundtrip() {
        let mut frame = pipeline().frame();
        assert_eq!(frame.params(), RenderParams::default());
        let params = RenderParams {
            exposure: 2.0,
            intensity: -0.5,
            dither_amplitude: 0.125,
            show_gamut_border: true,
            background: [0.25, 0.5, 0.75],
        };
        frame.set_params(&params);
        assert_eq!(frame.params(), params);
        frame.bind("intensity", 0.75.into()).unwrap();
        assert_eq!(frame.params().intensity, 0.75);

        let view = ViewTransform::fit(2.0, 1.0, 1.1);
        frame.set_view(view);
        assert_eq!(frame.view(), view);
    }

    #[test]
    fn test_identity_render() {
        let source = RgbaImage::filled(2, 2, [0.5, 0.5, 0.5, 1.0]);
        let mut frame = pipeline().frame();
        frame.bind("source", source.clone().into()).unwrap();
        let out = frame.render(2, 2).unwrap();
        for (a, b) in out.data().iter().zip(source.data()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_frame_keeps_its_snapshot() {
        let config = PipelineConfig {
            gamut_resolution: 8,
            curve_len: 16,
            ..PipelineConfig::default()
        };
        let p = Pipeline::with_points(config, Vec::new()).unwrap();
        let frame = p.frame();
        let before = p.tone_curve();

        p.set_control_points(vec![ControlPoint::new(0.5, 1.0, 0.1)]).unwrap();
        p.rebuild_gamut_table(4).unwrap();

        let after = p.tone_curve();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), 16);
        assert_eq!(p.gamut_table().resolution(), 4);
        // the earlier frame still holds the neutral curve and the 8x8 table
        match frame.inputs.texture(p.slots.tone_curve.slot) {
            Some(Texture::Curve(c)) => assert!(Arc::ptr_eq(c, &before)),
            _ => panic!("curve slot empty"),
        }
        match frame.inputs.texture(p.slots.gamut_limits.slot) {
            Some(Texture::Gamut(g)) => assert_eq!(g.resolution(), 8),
            _ => panic!("gamut slot empty"),
        }
    }

    #[test]
    fn test_drag_publishes_new_curve() {
        let config = PipelineConfig {
            gamut_resolution: 4,
            ..PipelineConfig::default()
        };
        let p = Pipeline::new(config).unwrap();
        let before = p.tone_curve();
        p.drag_control_point(0, -0.05, 0.0).unwrap();
        let after = p.tone_curve();
        assert_abs_diff_eq!(after.points()[0].x, before.points()[0].x - 0.3, epsilon = 1e-12);
        assert!(p.drag_control_point(5, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let zero_table = PipelineConfig {
            gamut_resolution: 0,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(zero_table).is_err());
        let short_curve = PipelineConfig {
            gamut_resolution: 4,
            curve_len: 1,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(short_curve).is_err());
    }
}
