//! Attribute tables shared by every widget class.
//!
//! [`WIDGET_ATTRS`] is the root table every widget class derives from. It
//! also hosts the transforms the built-in widget classes reuse.

use std::sync::LazyLock;

use trellis_core::attribute::{
    border_getter, border_shorthand, parse_border, sides_getter, sides_shorthand,
    AttributeSpec, Calculated, EnumTable, Reflow,
};
use trellis_core::{AttributeError, AttributeResult, AttributeTable, Color, Value, ValueType};

/// Horizontal alignment constants.
pub static HALIGN: EnumTable = EnumTable {
    entries: &[("left", 0), ("center", 1), ("right", 2)],
    nil: Some(0),
};

/// Vertical alignment constants.
pub static VALIGN: EnumTable = EnumTable {
    entries: &[("top", 0), ("center", 1), ("bottom", 2)],
    nil: Some(0),
};

/// Build a class table, panicking with the registry error if it is malformed.
pub(crate) fn build_table(
    parent: Option<&AttributeTable>,
    class: &'static str,
    specs: Vec<(&'static str, AttributeSpec)>,
) -> AttributeTable {
    let table = match parent {
        Some(parent) => AttributeTable::derive(parent, class, specs),
        None => AttributeTable::root(class, specs),
    };
    table.unwrap_or_else(|e| panic!("invalid attribute table for {class}: {e}"))
}

pub(crate) fn number() -> AttributeSpec {
    AttributeSpec::new().coerce(ValueType::Number)
}

pub(crate) fn boolean() -> AttributeSpec {
    AttributeSpec::new().coerce(ValueType::Boolean)
}

pub(crate) fn string() -> AttributeSpec {
    AttributeSpec::new().coerce(ValueType::String)
}

/// Color transform: any accepted color form calculates to `[r, g, b, a]`.
pub fn color_transform(name: &str, value: &Value) -> AttributeResult<Calculated> {
    if value.is_nil() {
        return Ok(Calculated::plain(Value::Nil));
    }
    Color::parse(value)
        .map(|c| Calculated::plain(c.to_value()))
        .ok_or_else(|| AttributeError::invalid(name, format!("`{value}` is not a color")))
}

/// Color transform that also calculates `icon_dark`: whether icons drawn
/// over this color should use their dark variant.
pub fn color_with_luma(name: &str, value: &Value) -> AttributeResult<Calculated> {
    let mut calc = color_transform(name, value)?;
    let light = Color::parse(&calc.value).is_some_and(|c| c.is_light());
    calc.fields.push(("icon_dark".to_string(), Value::Bool(light)));
    Ok(calc)
}

fn border_side(name: &str, value: &Value) -> AttributeResult<Calculated> {
    let [side, ..] = parse_border(name, value)?;
    Ok(Calculated::plain(match side {
        Some((w, c)) => Value::List(vec![Value::Number(w), c.to_value()]),
        None => Value::Nil,
    }))
}

fn sides(replaces: &'static [&'static str], reflow: Reflow) -> AttributeSpec {
    AttributeSpec::new()
        .default_value(0)
        .shorthand(sides_shorthand)
        .getter(sides_getter)
        .replaces(replaces)
        .reflow(reflow)
}

/// Attributes every widget has.
pub static WIDGET_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    build_table(
        None,
        "Widget",
        vec![
            ("x", number().default_value(0).reflow(Reflow::Full)),
            ("y", AttributeSpec::reference("x")),
            ("w", number().reflow(Reflow::Full)),
            ("h", AttributeSpec::reference("w")),
            ("minw", AttributeSpec::reference("w")),
            ("maxw", AttributeSpec::reference("w")),
            ("minh", AttributeSpec::reference("w")),
            ("maxh", AttributeSpec::reference("w")),
            ("z", number().default_value(0).reflow(Reflow::Full)),
            ("halign", AttributeSpec::new().enum_map(&HALIGN).reflow(Reflow::Full)),
            ("valign", AttributeSpec::new().enum_map(&VALIGN).reflow(Reflow::Full)),
            (
                "padding",
                sides(&["tpadding", "rpadding", "bpadding", "lpadding"], Reflow::Full),
            ),
            ("tpadding", number().reflow(Reflow::Full)),
            ("rpadding", AttributeSpec::reference("tpadding")),
            ("bpadding", AttributeSpec::reference("tpadding")),
            ("lpadding", AttributeSpec::reference("tpadding")),
            ("margin", sides(&["tmargin", "rmargin", "bmargin", "lmargin"], Reflow::Full)),
            ("tmargin", AttributeSpec::reference("tpadding")),
            ("rmargin", AttributeSpec::reference("tpadding")),
            ("bmargin", AttributeSpec::reference("tpadding")),
            ("lmargin", AttributeSpec::reference("tpadding")),
            (
                "border",
                AttributeSpec::new()
                    .shorthand(border_shorthand)
                    .getter(border_getter)
                    .replaces(&["tborder", "rborder", "bborder", "lborder"])
                    .reflow(Reflow::Full),
            ),
            ("tborder", AttributeSpec::new().shorthand(border_side).reflow(Reflow::Full)),
            ("rborder", AttributeSpec::reference("tborder")),
            ("bborder", AttributeSpec::reference("tborder")),
            ("lborder", AttributeSpec::reference("tborder")),
            (
                "hotzone",
                sides(&["thotzone", "rhotzone", "bhotzone", "lhotzone"], Reflow::None).no_redraw(),
            ),
            ("thotzone", number().reflow(Reflow::None).no_redraw()),
            ("rhotzone", AttributeSpec::reference("thotzone")),
            ("bhotzone", AttributeSpec::reference("thotzone")),
            ("lhotzone", AttributeSpec::reference("thotzone")),
            ("visible", boolean().default_value(true).reflow(Reflow::Full)),
            ("disabled", boolean().default_value(false).reflow(Reflow::None)),
            ("ghost", boolean().default_value(false).reflow(Reflow::None).no_redraw()),
            ("alpha", number().default_value(1.0).reflow(Reflow::None)),
            ("bg", AttributeSpec::new().shorthand(color_transform).reflow(Reflow::None)),
            ("focusable", boolean().default_value(false).reflow(Reflow::None).no_redraw()),
            ("autofocus", boolean().default_value(false).reflow(Reflow::None).no_redraw()),
            ("tooltip", string().reflow(Reflow::None).no_redraw()),
            ("cursor", string().reflow(Reflow::None).no_redraw()),
            ("ref", string().reflow(Reflow::None).no_redraw()),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::AttrMap;

    #[test]
    fn test_widget_table_builds() {
        let table = &*WIDGET_ATTRS;
        assert!(table.contains("padding"));
        assert_eq!(table.get("maxh").unwrap().reflow, Reflow::Full);
        assert_eq!(table.get("lmargin").unwrap().reflow, Reflow::Full);
        assert!(!table.get("tooltip").unwrap().redraw);
        assert_eq!(table.get("margin").unwrap().replaces[0], "tmargin");
    }

    #[test]
    fn test_color_with_luma() {
        let calc = color_with_luma("color", &Value::from("#ffffff")).unwrap();
        assert_eq!(calc.value, Color::WHITE.to_value());
        assert_eq!(calc.fields, vec![("icon_dark".to_string(), Value::Bool(true))]);
        assert!(color_with_luma("color", &Value::from("zzz")).is_err());
    }

    #[test]
    fn test_border_side_calculation() {
        let table = &*WIDGET_ATTRS;
        let calc = table.calculate("lborder", &Value::from("3 red"), &AttrMap::new()).unwrap();
        assert_eq!(
            calc.value,
            Value::List(vec![Value::Number(3.0), Color::rgb(1.0, 0.0, 0.0).to_value()])
        );
    }
}
