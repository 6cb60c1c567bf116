//! Integration tests for attribute tables as widget classes use them.

use trellis_core::attribute::{
    border_getter, border_shorthand, sides_getter, sides_shorthand, AttributeSpec,
    AttributeTable, FieldKind, Reflow, step_round,
};
use trellis_core::{AttrMap, AttributeError, Color, Value, ValueType};

const SIDES: &[&str] = &["tpadding", "rpadding", "bpadding", "lpadding"];

fn widget_table() -> AttributeTable {
    AttributeTable::root(
        "Widget",
        [
            ("w", AttributeSpec::new().coerce(ValueType::Number).reflow(Reflow::Full)),
            ("minw", AttributeSpec::reference("w")),
            (
                "padding",
                AttributeSpec::new()
                    .default_value(0)
                    .shorthand(sides_shorthand)
                    .getter(sides_getter)
                    .replaces(SIDES)
                    .reflow(Reflow::Full),
            ),
            ("tpadding", AttributeSpec::new().coerce(ValueType::Number).reflow(Reflow::Full)),
            ("rpadding", AttributeSpec::reference("tpadding")),
            ("bpadding", AttributeSpec::reference("tpadding")),
            ("lpadding", AttributeSpec::reference("tpadding")),
            (
                "border",
                AttributeSpec::new()
                    .shorthand(border_shorthand)
                    .getter(border_getter)
                    .reflow(Reflow::Full),
            ),
            ("alpha", AttributeSpec::new().default_value(1.0).reflow(Reflow::None)),
            ("tooltip", AttributeSpec::new().coerce(ValueType::String).no_redraw()),
        ],
    )
    .expect("widget table")
}

fn calculate_all(table: &AttributeTable, exterior: &AttrMap) -> AttrMap {
    let mut calc = AttrMap::new();
    for name in table.names() {
        if let Some(v) = exterior.get(name) {
            let c = table.calculate(name, v, &calc).unwrap();
            calc.insert(name.to_string(), c.value);
            calc.extend(c.fields);
        }
    }
    calc
}

#[test]
fn padding_round_trip() {
    let table = widget_table();
    let mut exterior = AttrMap::new();
    exterior.insert("padding".into(), Value::from([5, 10, 15, 20]));
    let calc = calculate_all(&table, &exterior);

    assert_eq!(calc["tpadding"], Value::Number(5.0));
    assert_eq!(calc["rpadding"], Value::Number(10.0));
    assert_eq!(calc["bpadding"], Value::Number(15.0));
    assert_eq!(calc["lpadding"], Value::Number(20.0));
    assert_eq!(table.read("padding", &exterior, &calc), Some(Value::from([5, 10, 15, 20])));
}

#[test]
fn directional_attributes_share_descriptor() {
    let table = widget_table();
    let l = table.get("lpadding").unwrap();
    assert_eq!(l.reflow, Reflow::Full);
    assert_eq!(table.get("padding").unwrap().replaces, SIDES);
    assert_eq!(table.get("minw").unwrap().reflow, Reflow::Full);
}

#[test]
fn subclass_overlay_and_field_reference() {
    let base = widget_table();
    let entry = AttributeTable::derive(
        &base,
        "Entry",
        [
            ("padding", AttributeSpec::new().default_value([2, 4])),
            ("caret", AttributeSpec::new().field_ref(FieldKind::Reflow, "alpha").animate(step_round)),
        ],
    )
    .unwrap();

    // Only the default was overlaid.
    let padding = entry.get("padding").unwrap();
    assert_eq!(padding.reflow, Reflow::Full);
    assert!(padding.get.is_some());
    assert_eq!(entry.default_value("padding", &AttrMap::new()), Some(Value::from([2, 4])));

    assert_eq!(entry.get("caret").unwrap().reflow, Reflow::None);
    assert!(entry.get("tooltip").map(|d| !d.redraw).unwrap_or(false));
    assert_eq!(entry.lineage(), &["Widget", "Entry"]);
}

#[test]
fn malformed_shorthand_names_attribute() {
    let table = widget_table();
    let err = table
        .calculate("padding", &Value::from([1, 2, 3, 4, 5]), &AttrMap::new())
        .unwrap_err();
    assert_eq!(
        err,
        AttributeError::MalformedShorthand {
            attr: "padding".into(),
            reason: "expected 1 to 4 values, got 5".into(),
        }
    );
}

#[test]
fn border_fans_out_pairs() {
    let table = widget_table();
    let mut exterior = AttrMap::new();
    exterior.insert("border".into(), Value::from("2 #fff"));
    let calc = calculate_all(&table, &exterior);
    let expected = Value::List(vec![Value::Number(2.0), Color::WHITE.to_value()]);
    assert_eq!(calc["lborder"], expected);
    assert_eq!(
        table.read("border", &exterior, &calc),
        Some(Value::List(vec![expected.clone(), expected.clone(), expected.clone(), expected]))
    );
}

#[test]
fn derived_reserved_name_rejected() {
    let err = AttributeTable::derive(&widget_table(), "Bad", [("defaults", AttributeSpec::new())])
        .unwrap_err();
    assert!(matches!(err, AttributeError::ReservedName { class: "Bad", .. }));
}
