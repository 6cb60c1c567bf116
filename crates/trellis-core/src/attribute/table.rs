//! Resolved per-class attribute tables.

use std::collections::HashMap;

use super::{
    AttributeDescriptor, AttributeSpec, Calculated, DefaultValue, Field, RESERVED_NAMES,
    Transform,
};
use crate::error::{AttributeError, AttributeResult};
use crate::value::{AttrMap, Value};

/// The resolved attribute descriptors of one widget class.
///
/// Tables are immutable once built. Widget classes keep theirs in a
/// `LazyLock` static and derived classes build on top of their parent's.
#[derive(Debug, Clone)]
pub struct AttributeTable {
    class: &'static str,
    lineage: Vec<&'static str>,
    specs: HashMap<String, AttributeSpec>,
    descriptors: HashMap<String, AttributeDescriptor>,
    // Non-priority names in registration order, then priority names.
    calc_order: Vec<String>,
    registration: Vec<String>,
}

impl AttributeTable {
    /// Build the table of a class with no parent.
    pub fn root<I, S>(class: &'static str, specs: I) -> AttributeResult<Self>
    where
        I: IntoIterator<Item = (S, AttributeSpec)>,
        S: Into<String>,
    {
        Self::build(class, Vec::new(), HashMap::new(), Vec::new(), specs)
            .inspect_err(|err| crate::trellis_warn!(class, %err, "attribute table rejected"))
    }

    /// Build the table of a class inheriting from `parent`.
    ///
    /// Specs naming an inherited attribute overlay only the fields they set.
    pub fn derive<I, S>(parent: &AttributeTable, class: &'static str, specs: I) -> AttributeResult<Self>
    where
        I: IntoIterator<Item = (S, AttributeSpec)>,
        S: Into<String>,
    {
        Self::build(
            class,
            parent.lineage.clone(),
            parent.specs.clone(),
            parent.registration.clone(),
            specs,
        )
        .inspect_err(|err| crate::trellis_warn!(class, %err, "attribute table rejected"))
    }

    fn build<I, S>(
        class: &'static str,
        mut lineage: Vec<&'static str>,
        mut merged: HashMap<String, AttributeSpec>,
        mut registration: Vec<String>,
        specs: I,
    ) -> AttributeResult<Self>
    where
        I: IntoIterator<Item = (S, AttributeSpec)>,
        S: Into<String>,
    {
        lineage.push(class);
        for (name, spec) in specs {
            let name = name.into();
            if RESERVED_NAMES.contains(&name.as_str()) {
                return Err(AttributeError::ReservedName { class, name });
            }
            match merged.remove(&name) {
                Some(inherited) => {
                    merged.insert(name, spec.overlay(inherited));
                }
                None => {
                    registration.push(name.clone());
                    merged.insert(name, spec);
                }
            }
        }

        let mut descriptors = HashMap::with_capacity(merged.len());
        for name in &registration {
            descriptors.insert(name.clone(), resolve(class, &merged, name)?);
        }

        let (priority, normal): (Vec<&String>, Vec<&String>) =
            registration.iter().partition(|n| descriptors[n.as_str()].priority);
        let calc_order = normal.into_iter().chain(priority).cloned().collect();

        tracing::trace!(
            target: crate::logging::targets::ATTRIBUTE,
            class,
            attributes = registration.len(),
            "attribute table built"
        );

        Ok(Self {
            class,
            lineage,
            specs: merged,
            descriptors,
            calc_order,
            registration,
        })
    }

    /// The class this table belongs to.
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// Class names from the root class down to this one.
    pub fn lineage(&self) -> &[&'static str] {
        &self.lineage
    }

    /// Whether this class is `class` or derives from it.
    pub fn is_a(&self, class: &str) -> bool {
        self.lineage.iter().any(|c| *c == class)
    }

    /// Descriptor of an attribute.
    pub fn get(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.descriptors.get(name)
    }

    /// Whether the class defines an attribute.
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Attribute names in calculation order: non-priority attributes in
    /// registration order, then priority attributes.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.calc_order.iter().map(String::as_str)
    }

    /// Names of the priority attributes.
    pub fn priority_names(&self) -> impl Iterator<Item = &str> {
        self.names().filter(|n| self.descriptors[*n].priority)
    }

    /// Default value of an attribute for an instance whose exterior values
    /// are `exterior`. `None` when the attribute has no default.
    pub fn default_value(&self, name: &str, exterior: &AttrMap) -> Option<Value> {
        match &self.descriptors.get(name)?.default {
            DefaultValue::Unset => None,
            DefaultValue::Const(v) => Some(v.clone()),
            DefaultValue::Factory(f) => Some(f(exterior, name)),
        }
    }

    /// Calculate an attribute value: coerce, then transform.
    ///
    /// Attributes the class does not define calculate to the value itself.
    pub fn calculate(&self, name: &str, value: &Value, calc: &AttrMap) -> AttributeResult<Calculated> {
        let Some(desc) = self.descriptors.get(name) else {
            return Ok(Calculated::plain(value.clone()));
        };
        let value = match &desc.coerce {
            Some(c) => c.apply(value.clone()),
            None => value.clone(),
        };
        match desc.calculate {
            Transform::Identity => Ok(Calculated::plain(value)),
            Transform::EnumMap(table) => match table.lookup(&value) {
                Some(c) => Ok(Calculated::plain(Value::Number(c as f64))),
                None if value.is_nil() => Ok(Calculated::plain(Value::Nil)),
                None => Err(AttributeError::invalid(name, format!("unknown constant `{value}`"))),
            },
            Transform::Derive(f) => f(calc, &value).map(Calculated::plain),
            Transform::Shorthand(f) => f(name, &value),
        }
    }

    /// The value an attribute reads as: the getter override when the
    /// attribute has one, otherwise the exterior value.
    pub fn read(&self, name: &str, exterior: &AttrMap, calc: &AttrMap) -> Option<Value> {
        match self.descriptors.get(name).and_then(|d| d.get) {
            Some(getter) => Some(getter(exterior, calc, name)),
            None => exterior.get(name).cloned(),
        }
    }
}

fn resolve(
    class: &'static str,
    specs: &HashMap<String, AttributeSpec>,
    name: &str,
) -> AttributeResult<AttributeDescriptor> {
    let d = AttributeDescriptor::default();
    let mut chain = Vec::new();
    Ok(AttributeDescriptor {
        default: resolve_field(class, specs, name, |s| &s.default, &d.default, &mut chain)?,
        coerce: resolve_field(class, specs, name, |s| &s.coerce, &d.coerce, &mut chain)?,
        calculate: resolve_field(class, specs, name, |s| &s.calculate, &d.calculate, &mut chain)?,
        priority: resolve_field(class, specs, name, |s| &s.priority, &d.priority, &mut chain)?,
        reflow: resolve_field(class, specs, name, |s| &s.reflow, &d.reflow, &mut chain)?,
        redraw: resolve_field(class, specs, name, |s| &s.redraw, &d.redraw, &mut chain)?,
        replaces: resolve_field(class, specs, name, |s| &s.replaces, &d.replaces, &mut chain)?,
        animate: resolve_field(class, specs, name, |s| &s.animate, &d.animate, &mut chain)?,
        get: resolve_field(class, specs, name, |s| &s.get, &d.get, &mut chain)?,
        set: resolve_field(class, specs, name, |s| &s.set, &d.set, &mut chain)?,
    })
}

/// Resolve one field of `name`, following field and whole-descriptor
/// references. `chain` holds the names visited so far for cycle detection.
fn resolve_field<T, F>(
    class: &'static str,
    specs: &HashMap<String, AttributeSpec>,
    name: &str,
    field: F,
    fallback: &T,
    chain: &mut Vec<String>,
) -> AttributeResult<T>
where
    T: Clone,
    F: Fn(&AttributeSpec) -> &Field<T> + Copy,
{
    if chain.iter().any(|n| n == name) {
        let mut cycle = chain.clone();
        cycle.push(name.to_string());
        return Err(AttributeError::ReferenceCycle { class, chain: cycle });
    }
    let Some(spec) = specs.get(name) else {
        return Err(AttributeError::UnknownReference {
            class,
            attr: chain.last().cloned().unwrap_or_default(),
            target: name.to_string(),
        });
    };

    chain.push(name.to_string());
    let result = match field(spec) {
        Field::Set(v) => Ok(v.clone()),
        Field::Ref(other) => resolve_field(class, specs, other, field, fallback, chain),
        Field::Unset => match spec.whole {
            Some(other) => resolve_field(class, specs, other, field, fallback, chain),
            None => Ok(fallback.clone()),
        },
    };
    chain.pop();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{EnumTable, FieldKind, Reflow};
    use crate::value::ValueType;

    static ALIGN: EnumTable = EnumTable {
        entries: &[("left", 0), ("center", 1), ("right", 2)],
        nil: Some(0),
    };

    fn base() -> AttributeTable {
        AttributeTable::root(
            "Widget",
            [
                ("w", AttributeSpec::new().coerce(ValueType::Number).reflow(Reflow::Full)),
                ("halign", AttributeSpec::new().enum_map(&ALIGN).default_value("left")),
                ("alpha", AttributeSpec::new().default_value(1.0).reflow(Reflow::None)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_reserved_names_rejected() {
        let err = AttributeTable::root("Widget", [("id", AttributeSpec::new())]).unwrap_err();
        assert!(matches!(err, AttributeError::ReservedName { .. }));
    }

    #[test]
    fn test_overlay_keeps_inherited_fields() {
        let derived =
            AttributeTable::derive(&base(), "Button", [("w", AttributeSpec::new().default_value(40))]).unwrap();
        let w = derived.get("w").unwrap();
        assert_eq!(w.reflow, Reflow::Full);
        assert!(matches!(w.coerce, Some(crate::attribute::Coerce::Type(ValueType::Number))));
        assert_eq!(derived.default_value("w", &AttrMap::new()), Some(Value::Number(40.0)));
        assert!(derived.is_a("Widget"));
        assert!(derived.is_a("Button"));
    }

    #[test]
    fn test_forward_field_reference() {
        let table = AttributeTable::root(
            "Widget",
            [
                ("minw", AttributeSpec::new().field_ref(FieldKind::Reflow, "w")),
                ("w", AttributeSpec::new().reflow(Reflow::Full)),
            ],
        )
        .unwrap();
        assert_eq!(table.get("minw").unwrap().reflow, Reflow::Full);
    }

    #[test]
    fn test_reference_cycle_detected() {
        let err = AttributeTable::root(
            "Widget",
            [
                ("a", AttributeSpec::new().field_ref(FieldKind::Reflow, "b")),
                ("b", AttributeSpec::new().field_ref(FieldKind::Reflow, "a")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, AttributeError::ReferenceCycle { .. }));
    }

    #[test]
    fn test_dangling_reference() {
        let err = AttributeTable::root("Widget", [("a", AttributeSpec::reference("missing"))]).unwrap_err();
        assert!(matches!(err, AttributeError::UnknownReference { ref target, .. } if target == "missing"));
    }

    #[test]
    fn test_enum_map_calculation() {
        let table = base();
        let calc = AttrMap::new();
        let c = |v: Value| table.calculate("halign", &v, &calc);
        assert_eq!(c(Value::from("CENTER")).unwrap().value, Value::Number(1.0));
        assert_eq!(c(Value::Nil).unwrap().value, Value::Number(0.0));
        assert_eq!(c(Value::from(2)).unwrap().value, Value::Number(2.0));
        assert!(c(Value::from("diagonal")).is_err());
    }

    #[test]
    fn test_priority_names_calculated_last() {
        let table = AttributeTable::derive(
            &base(),
            "Entry",
            [("caret", AttributeSpec::new().priority()), ("value", AttributeSpec::new())],
        )
        .unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names.last(), Some(&"caret"));
        assert_eq!(table.priority_names().collect::<Vec<_>>(), vec!["caret"]);
    }

    #[test]
    fn test_unknown_attribute_calculates_verbatim() {
        let table = base();
        let v = Value::from("anything");
        assert_eq!(table.calculate("custom", &v, &AttrMap::new()).unwrap().value, v);
    }
}
