//! Named render inputs resolved to typed slots.
//!
//! A [`BindingTable`] is declared once when a pipeline is built: every
//! input name gets an [`InputKind`] and a slot index, assigned in
//! declaration order within the kind's [`SlotClass`]. Binding a value by
//! name afterwards is a table lookup plus a kind check; nothing is
//! renumbered per draw.
//!
//! ```rust
//! use grade_ops::bindings::{BindingTable, BoundInputs, InputKind, SlotClass};
//!
//! let table = BindingTable::new([
//!     ("source", InputKind::Image),
//!     ("exposure", InputKind::Float),
//!     ("intensity", InputKind::Float),
//! ])
//! .unwrap();
//! assert_eq!(table.lookup("intensity").unwrap().slot, 1);
//! assert_eq!(table.slot_count(SlotClass::Texture), 1);
//!
//! let mut inputs = BoundInputs::new(&table);
//! inputs.bind(&table, "exposure", 2.0.into()).unwrap();
//! assert!(inputs.bind(&table, "exposure", true.into()).is_err());
//! assert!(inputs.bind(&table, "gamma", 1.0.into()).is_err());
//! ```

use std::sync::Arc;

use grade_core::{GradeError, GradeResult, Rgb, RgbaImage};

use crate::gamut::GamutTable;
use crate::tone_curve::ToneCurve;

/// Storage class shared by several kinds; slots are numbered per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotClass {
    /// Images and lookup tables.
    Texture = 0,
    /// Floating-point scalars.
    Scalar = 1,
    /// Booleans.
    Flag = 2,
    /// Two- and three-component vectors.
    Vector = 3,
}

/// Declared type of a named input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Source RGBA image.
    Image,
    /// Tone curve lookup.
    Curve,
    /// Gamut boundary table.
    Gamut,
    /// Scalar.
    Float,
    /// Boolean switch.
    Flag,
    /// 2-vector.
    Vec2,
    /// RGB color.
    Color,
}

impl InputKind {
    /// Storage class of this kind.
    pub const fn class(self) -> SlotClass {
        match self {
            Self::Image | Self::Curve | Self::Gamut => SlotClass::Texture,
            Self::Float => SlotClass::Scalar,
            Self::Flag => SlotClass::Flag,
            Self::Vec2 | Self::Color => SlotClass::Vector,
        }
    }

    /// Name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Curve => "tone curve",
            Self::Gamut => "gamut table",
            Self::Float => "float",
            Self::Flag => "bool",
            Self::Vec2 => "vec2",
            Self::Color => "color",
        }
    }
}

/// Kind and slot of one declared input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Declared kind.
    pub kind: InputKind,
    /// Index within the kind's slot class.
    pub slot: usize,
}

/// Input declarations, fixed at pipeline-build time.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: Vec<(String, Binding)>,
    counts: [usize; 4],
}

impl BindingTable {
    /// Declares inputs in order.
    ///
    /// # Errors
    ///
    /// [`GradeError::InvalidParameter`] if a name is declared twice.
    pub fn new<'a>(declarations: impl IntoIterator<Item = (&'a str, InputKind)>) -> GradeResult<Self> {
        let mut table = Self::default();
        for (name, kind) in declarations {
            if table.entries.iter().any(|(n, _)| n == name) {
                return Err(GradeError::invalid_parameter(
                    "declarations",
                    format!("input `{name}` declared twice"),
                ));
            }
            let counter = &mut table.counts[kind.class() as usize];
            let slot = *counter;
            *counter += 1;
            table.entries.push((name.to_owned(), Binding { kind, slot }));
        }
        Ok(table)
    }

    /// Binding of a declared input.
    ///
    /// # Errors
    ///
    /// [`GradeError::UnknownInput`] if `name` was never declared.
    pub fn lookup(&self, name: &str) -> GradeResult<Binding> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| *b)
            .ok_or_else(|| GradeError::UnknownInput(name.to_owned()))
    }

    /// Looks up `name` and checks that `kind` matches its declaration.
    ///
    /// # Errors
    ///
    /// [`GradeError::UnknownInput`] or [`GradeError::InputKindMismatch`].
    pub fn resolve(&self, name: &str, kind: InputKind) -> GradeResult<Binding> {
        let binding = self.lookup(name)?;
        if binding.kind != kind {
            return Err(GradeError::InputKindMismatch {
                name: name.to_owned(),
                expected: binding.kind.name(),
                got: kind.name(),
            });
        }
        Ok(binding)
    }

    /// Number of slots used in a class.
    #[inline]
    pub fn slot_count(&self, class: SlotClass) -> usize {
        self.counts[class as usize]
    }

    /// Declared inputs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Binding)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), *b))
    }

    /// Number of declared inputs.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing was declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Texture-class value.
#[derive(Debug, Clone)]
pub enum Texture {
    /// Source image.
    Image(RgbaImage),
    /// Tone curve snapshot.
    Curve(Arc<ToneCurve>),
    /// Gamut table snapshot.
    Gamut(Arc<GamutTable>),
}

/// A value bound to a named input.
#[derive(Debug, Clone)]
pub enum InputValue {
    /// Source image.
    Image(RgbaImage),
    /// Tone curve snapshot.
    Curve(Arc<ToneCurve>),
    /// Gamut table snapshot.
    Gamut(Arc<GamutTable>),
    /// Scalar.
    Float(f64),
    /// Boolean.
    Flag(bool),
    /// 2-vector.
    Vec2([f64; 2]),
    /// RGB color.
    Color(Rgb),
}

impl InputValue {
    /// Kind of this value.
    pub const fn kind(&self) -> InputKind {
        match self {
            Self::Image(_) => InputKind::Image,
            Self::Curve(_) => InputKind::Curve,
            Self::Gamut(_) => InputKind::Gamut,
            Self::Float(_) => InputKind::Float,
            Self::Flag(_) => InputKind::Flag,
            Self::Vec2(_) => InputKind::Vec2,
            Self::Color(_) => InputKind::Color,
        }
    }
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for InputValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<[f64; 2]> for InputValue {
    fn from(v: [f64; 2]) -> Self {
        Self::Vec2(v)
    }
}

impl From<Rgb> for InputValue {
    fn from(v: Rgb) -> Self {
        Self::Color(v)
    }
}

impl From<RgbaImage> for InputValue {
    fn from(v: RgbaImage) -> Self {
        Self::Image(v)
    }
}

impl From<Arc<ToneCurve>> for InputValue {
    fn from(v: Arc<ToneCurve>) -> Self {
        Self::Curve(v)
    }
}

impl From<Arc<GamutTable>> for InputValue {
    fn from(v: Arc<GamutTable>) -> Self {
        Self::Gamut(v)
    }
}

/// Slot storage for one draw, sized from a [`BindingTable`].
#[derive(Debug, Clone)]
pub struct BoundInputs {
    textures: Vec<Option<Texture>>,
    scalars: Vec<f64>,
    flags: Vec<bool>,
    vectors: Vec<[f64; 3]>,
}

impl BoundInputs {
    /// Empty slots: no textures, zeros, `false`.
    pub fn new(table: &BindingTable) -> Self {
        Self {
            textures: vec![None; table.slot_count(SlotClass::Texture)],
            scalars: vec![0.0; table.slot_count(SlotClass::Scalar)],
            flags: vec![false; table.slot_count(SlotClass::Flag)],
            vectors: vec![[0.0; 3]; table.slot_count(SlotClass::Vector)],
        }
    }

    /// Binds `value` to the input `name` declared in `table`.
    ///
    /// # Errors
    ///
    /// [`GradeError::UnknownInput`] or [`GradeError::InputKindMismatch`].
    pub fn bind(&mut self, table: &BindingTable, name: &str, value: InputValue) -> GradeResult<Binding> {
        let binding = table.resolve(name, value.kind())?;
        self.store(binding.slot, value);
        Ok(binding)
    }

    /// Writes a value whose kind was already checked against `slot`.
    pub(crate) fn store(&mut self, slot: usize, value: InputValue) {
        match value {
            InputValue::Image(v) => self.textures[slot] = Some(Texture::Image(v)),
            InputValue::Curve(v) => self.textures[slot] = Some(Texture::Curve(v)),
            InputValue::Gamut(v) => self.textures[slot] = Some(Texture::Gamut(v)),
            InputValue::Float(v) => self.scalars[slot] = v,
            InputValue::Flag(v) => self.flags[slot] = v,
            InputValue::Vec2([x, y]) => self.vectors[slot] = [x, y, 0.0],
            InputValue::Color([r, g, b]) => self.vectors[slot] = [r as f64, g as f64, b as f64],
        }
    }

    /// Texture slot, if bound.
    #[inline]
    pub fn texture(&self, slot: usize) -> Option<&Texture> {
        self.textures.get(slot).and_then(Option::as_ref)
    }

    /// Scalar slot.
    #[inline]
    pub fn scalar(&self, slot: usize) -> f64 {
        self.scalars[slot]
    }

    /// Flag slot.
    #[inline]
    pub fn flag(&self, slot: usize) -> bool {
        self.flags[slot]
    }

    /// Vector slot; 2-vectors leave the third component at 0.
    #[inline]
    pub fn vector(&self, slot: usize) -> [f64; 3] {
        self.vectors[slot]
    }
}
