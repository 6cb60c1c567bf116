//! Attribute registry.
//!
//! Every widget class owns an [`AttributeTable`] that describes how each of
//! its attributes behaves: the default value, how user input is coerced and
//! transformed into the calculated form, whether a change triggers a reflow
//! or a redraw, which sibling attributes an assignment clears, and how the
//! attribute animates.
//!
//! Tables are built from [`AttributeSpec`]s. A spec only carries the fields a
//! registration cares about; a derived class inherits its parent's table and
//! overlays the fields its own specs set. Any field may instead be a
//! reference to the same field of another attribute ([`Field::Ref`]), and a
//! whole spec may clone another attribute's descriptor
//! ([`AttributeSpec::reference`]). References are resolved after all specs
//! are merged, so they may point forward and into inherited attributes.
//!
//! # Example
//!
//! ```
//! use trellis_core::attribute::{AttributeSpec, AttributeTable, Reflow};
//! use trellis_core::{Value, ValueType};
//!
//! let base = AttributeTable::root("Widget", [
//!     ("w", AttributeSpec::new().coerce(ValueType::Number).reflow(Reflow::Full)),
//!     ("label", AttributeSpec::new().default_value("").coerce(ValueType::String)),
//! ]).unwrap();
//!
//! let button = AttributeTable::derive(&base, "Button", [
//!     // Only the default changes; coercion and reflow are inherited.
//!     ("label", AttributeSpec::new().default_value("OK")),
//!     ("minw", AttributeSpec::reference("w")),
//! ]).unwrap();
//!
//! assert_eq!(button.get("minw").unwrap().reflow, Reflow::Full);
//! let calc = button.calculate("w", &Value::from("20"), &Default::default()).unwrap();
//! assert_eq!(calc.value, Value::Number(20.0));
//! ```

mod shorthand;
mod table;

use std::fmt;

pub use shorthand::{
    border_getter, border_shorthand, parse_border, parse_sides, sides_getter, sides_shorthand,
    Sides,
};
pub use table::AttributeTable;

use crate::error::AttributeResult;
use crate::value::{AttrMap, Value, ValueType};

/// Attribute names the instance API reserves.
pub const RESERVED_NAMES: &[&str] = &["id", "get", "defaults"];

/// How much layout work an attribute change requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reflow {
    /// Nothing to lay out.
    None,
    /// Re-run layout of this widget inside its last offered box.
    #[default]
    Partial,
    /// Re-run layout of the whole window.
    Full,
}

/// Lazily computes a default from the instance's exterior values.
pub type FactoryFn = fn(&AttrMap, &str) -> Value;
/// Custom coercion.
pub type CoerceFn = fn(Value) -> Value;
/// Calculation that may read already-calculated sibling values.
pub type DeriveFn = fn(&AttrMap, &Value) -> AttributeResult<Value>;
/// Calculation that fans one value out into several calculated fields.
pub type ShorthandFn = fn(&str, &Value) -> AttributeResult<Calculated>;
/// Animation step: `(src, dst, eased_t) -> interim`.
pub type StepFn = fn(&Value, &Value, f64) -> Value;
/// Getter override: `(exterior, calc, name) -> value`.
pub type GetFn = fn(&AttrMap, &AttrMap, &str) -> Value;
/// Exterior setter override: `(calc, assigned) -> stored`.
pub type SetFn = fn(&AttrMap, Value) -> Value;

/// Default value of an attribute.
#[derive(Clone)]
pub enum DefaultValue {
    /// No default; the attribute starts unset.
    Unset,
    /// A constant.
    Const(Value),
    /// Computed per instance when the instance is created.
    Factory(FactoryFn),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "Unset"),
            Self::Const(v) => f.debug_tuple("Const").field(v).finish(),
            Self::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

/// Coercion applied to a value before its transform.
#[derive(Clone, Copy)]
pub enum Coerce {
    /// Convert to a semantic type.
    Type(ValueType),
    /// Custom conversion.
    With(CoerceFn),
}

impl Coerce {
    /// Apply the coercion.
    pub fn apply(&self, value: Value) -> Value {
        match self {
            Self::Type(ty) => value.coerce(*ty),
            Self::With(f) => f(value),
        }
    }
}

impl fmt::Debug for Coerce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(ty) => f.debug_tuple("Type").field(ty).finish(),
            Self::With(_) => write!(f, "With(..)"),
        }
    }
}

/// A case-insensitive string to integer-constant table.
#[derive(Debug)]
pub struct EnumTable {
    /// `(name, constant)` pairs.
    pub entries: &'static [(&'static str, i64)],
    /// Constant a nil value maps to, if any.
    pub nil: Option<i64>,
}

impl EnumTable {
    /// Look up a value. Numbers that already equal a constant pass through.
    pub fn lookup(&self, value: &Value) -> Option<i64> {
        match value {
            Value::Nil => self.nil,
            Value::Str(s) => {
                let s = s.trim();
                self.entries
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(s))
                    .map(|(_, c)| *c)
            }
            Value::Number(n) => self
                .entries
                .iter()
                .map(|(_, c)| *c)
                .find(|c| *c as f64 == *n),
            _ => None,
        }
    }

    /// The name registered for a constant.
    pub fn name_of(&self, constant: i64) -> Option<&'static str> {
        self.entries.iter().find(|(_, c)| *c == constant).map(|(n, _)| *n)
    }
}

/// How the calculated value is derived from the (coerced) exterior value.
#[derive(Clone, Copy)]
pub enum Transform {
    /// The coerced value is the calculated value.
    Identity,
    /// Enum-like string to constant translation.
    EnumMap(&'static EnumTable),
    /// Computed from the value and other calculated values.
    Derive(DeriveFn),
    /// The value fans out into several calculated fields.
    Shorthand(ShorthandFn),
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "Identity"),
            Self::EnumMap(t) => f.debug_tuple("EnumMap").field(t).finish(),
            Self::Derive(_) => write!(f, "Derive(..)"),
            Self::Shorthand(_) => write!(f, "Shorthand(..)"),
        }
    }
}

/// The result of calculating an attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculated {
    /// The calculated value of the attribute itself.
    pub value: Value,
    /// Additional calculated fields written alongside it.
    pub fields: Vec<(String, Value)>,
}

impl Calculated {
    /// A calculation with no extra fields.
    pub fn plain(value: Value) -> Self {
        Self {
            value,
            fields: Vec::new(),
        }
    }
}

/// One field of an [`AttributeSpec`].
#[derive(Debug, Clone)]
pub enum Field<T> {
    /// Not specified; inherited or defaulted.
    Unset,
    /// Specified here.
    Set(T),
    /// Copy the same field from the named attribute.
    Ref(&'static str),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

impl<T> Field<T> {
    fn overlay(self, base: Field<T>) -> Field<T> {
        match self {
            Field::Unset => base,
            other => other,
        }
    }
}

/// A resolved attribute descriptor.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    /// Default value.
    pub default: DefaultValue,
    /// Coercion applied before the transform.
    pub coerce: Option<Coerce>,
    /// Calculation.
    pub calculate: Transform,
    /// Calculated after all non-priority attributes.
    pub priority: bool,
    /// Layout work a change requires.
    pub reflow: Reflow,
    /// Whether a change requests a repaint.
    pub redraw: bool,
    /// Sibling attributes cleared when this one is assigned.
    pub replaces: &'static [&'static str],
    /// Animation step override.
    pub animate: Option<StepFn>,
    /// Getter override.
    pub get: Option<GetFn>,
    /// Exterior setter override.
    pub set: Option<SetFn>,
}

impl Default for AttributeDescriptor {
    fn default() -> Self {
        Self {
            default: DefaultValue::Unset,
            coerce: None,
            calculate: Transform::Identity,
            priority: false,
            reflow: Reflow::Partial,
            redraw: true,
            replaces: &[],
            animate: None,
            get: None,
            set: None,
        }
    }
}

/// Builder for a partial attribute registration.
#[derive(Debug, Clone, Default)]
pub struct AttributeSpec {
    pub(crate) whole: Option<&'static str>,
    pub(crate) default: Field<DefaultValue>,
    pub(crate) coerce: Field<Option<Coerce>>,
    pub(crate) calculate: Field<Transform>,
    pub(crate) priority: Field<bool>,
    pub(crate) reflow: Field<Reflow>,
    pub(crate) redraw: Field<bool>,
    pub(crate) replaces: Field<&'static [&'static str]>,
    pub(crate) animate: Field<Option<StepFn>>,
    pub(crate) get: Field<Option<GetFn>>,
    pub(crate) set: Field<Option<SetFn>>,
}

/// Names a field of a spec, for field-level references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// [`AttributeDescriptor::default`].
    Default,
    /// [`AttributeDescriptor::coerce`].
    Coerce,
    /// [`AttributeDescriptor::calculate`].
    Calculate,
    /// [`AttributeDescriptor::priority`].
    Priority,
    /// [`AttributeDescriptor::reflow`].
    Reflow,
    /// [`AttributeDescriptor::redraw`].
    Redraw,
    /// [`AttributeDescriptor::replaces`].
    Replaces,
    /// [`AttributeDescriptor::animate`].
    Animate,
    /// [`AttributeDescriptor::get`].
    Get,
    /// [`AttributeDescriptor::set`].
    Set,
}

impl AttributeSpec {
    /// An empty spec; every field inherits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the whole descriptor of another attribute. Fields set on the
    /// returned spec still override the clone.
    pub fn reference(name: &'static str) -> Self {
        Self {
            whole: Some(name),
            ..Self::default()
        }
    }

    /// Constant default.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Field::Set(DefaultValue::Const(value.into()));
        self
    }

    /// Per-instance default factory.
    pub fn factory(mut self, f: FactoryFn) -> Self {
        self.default = Field::Set(DefaultValue::Factory(f));
        self
    }

    /// Explicitly no default, even if the parent class had one.
    pub fn no_default(mut self) -> Self {
        self.default = Field::Set(DefaultValue::Unset);
        self
    }

    /// Coerce to a semantic type.
    pub fn coerce(mut self, ty: ValueType) -> Self {
        self.coerce = Field::Set(Some(Coerce::Type(ty)));
        self
    }

    /// Custom coercion.
    pub fn coerce_with(mut self, f: CoerceFn) -> Self {
        self.coerce = Field::Set(Some(Coerce::With(f)));
        self
    }

    /// Enum-like translation.
    pub fn enum_map(mut self, table: &'static EnumTable) -> Self {
        self.calculate = Field::Set(Transform::EnumMap(table));
        self
    }

    /// Derived calculation.
    pub fn derive(mut self, f: DeriveFn) -> Self {
        self.calculate = Field::Set(Transform::Derive(f));
        self
    }

    /// Fan-out calculation.
    pub fn shorthand(mut self, f: ShorthandFn) -> Self {
        self.calculate = Field::Set(Transform::Shorthand(f));
        self
    }

    /// Calculate in the second (priority) pass.
    pub fn priority(mut self) -> Self {
        self.priority = Field::Set(true);
        self
    }

    /// Reflow policy.
    pub fn reflow(mut self, reflow: Reflow) -> Self {
        self.reflow = Field::Set(reflow);
        self
    }

    /// Changes do not request a repaint.
    pub fn no_redraw(mut self) -> Self {
        self.redraw = Field::Set(false);
        self
    }

    /// Siblings cleared on assignment.
    pub fn replaces(mut self, names: &'static [&'static str]) -> Self {
        self.replaces = Field::Set(names);
        self
    }

    /// Animation step override.
    pub fn animate(mut self, step: StepFn) -> Self {
        self.animate = Field::Set(Some(step));
        self
    }

    /// Getter override.
    pub fn getter(mut self, f: GetFn) -> Self {
        self.get = Field::Set(Some(f));
        self
    }

    /// Exterior setter override.
    pub fn setter(mut self, f: SetFn) -> Self {
        self.set = Field::Set(Some(f));
        self
    }

    /// Copy one field from another attribute's descriptor.
    pub fn field_ref(mut self, field: FieldKind, name: &'static str) -> Self {
        match field {
            FieldKind::Default => self.default = Field::Ref(name),
            FieldKind::Coerce => self.coerce = Field::Ref(name),
            FieldKind::Calculate => self.calculate = Field::Ref(name),
            FieldKind::Priority => self.priority = Field::Ref(name),
            FieldKind::Reflow => self.reflow = Field::Ref(name),
            FieldKind::Redraw => self.redraw = Field::Ref(name),
            FieldKind::Replaces => self.replaces = Field::Ref(name),
            FieldKind::Animate => self.animate = Field::Ref(name),
            FieldKind::Get => self.get = Field::Ref(name),
            FieldKind::Set => self.set = Field::Ref(name),
        }
        self
    }

    /// Overlay `self` on top of an inherited spec.
    pub(crate) fn overlay(self, base: AttributeSpec) -> AttributeSpec {
        AttributeSpec {
            whole: self.whole.or(base.whole),
            default: self.default.overlay(base.default),
            coerce: self.coerce.overlay(base.coerce),
            calculate: self.calculate.overlay(base.calculate),
            priority: self.priority.overlay(base.priority),
            reflow: self.reflow.overlay(base.reflow),
            redraw: self.redraw.overlay(base.redraw),
            replaces: self.replaces.overlay(base.replaces),
            animate: self.animate.overlay(base.animate),
            get: self.get.overlay(base.get),
            set: self.set.overlay(base.set),
        }
    }
}

/// Default animation step: [`Value::lerp`].
pub fn step_lerp(src: &Value, dst: &Value, t: f64) -> Value {
    src.lerp(dst, t)
}

/// Animation step that rounds numeric interim values.
pub fn step_round(src: &Value, dst: &Value, t: f64) -> Value {
    match src.lerp(dst, t) {
        Value::Number(n) => Value::Number(n.round()),
        other => other,
    }
}
