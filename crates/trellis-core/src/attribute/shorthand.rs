//! Shorthand attributes that fan out into directional fields.
//!
//! `padding`, `margin` and `hotzone` take CSS-like side lists and calculate
//! into `t<name>`, `r<name>`, `b<name>` and `l<name>`. `border` calculates
//! into the same four directions, each side as a `[width, color]` pair.

use std::ops::Add;

use super::Calculated;
use crate::color::Color;
use crate::error::{AttributeError, AttributeResult};
use crate::value::{parse_number, AttrMap, Value};

const PREFIXES: [&str; 4] = ["t", "r", "b", "l"];

/// Four side lengths in top, right, bottom, left order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    /// Top.
    pub top: f64,
    /// Right.
    pub right: f64,
    /// Bottom.
    pub bottom: f64,
    /// Left.
    pub left: f64,
}

impl Sides {
    /// Sides from explicit values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    /// The same value on all four sides.
    pub const fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    /// Left plus right.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Top plus bottom.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Every side multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Self {
        Self::new(self.top * scale, self.right * scale, self.bottom * scale, self.left * scale)
    }

    /// Calculated list form `[t, r, b, l]`.
    pub fn to_value(&self) -> Value {
        Value::from([self.top, self.right, self.bottom, self.left])
    }

    fn as_array(&self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

impl Add for Sides {
    type Output = Sides;

    fn add(self, rhs: Sides) -> Sides {
        Sides::new(
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
            self.left + rhs.left,
        )
    }
}

/// Expand a one to four element side list the way CSS does.
fn distribute<T: Clone>(attr: &str, items: Vec<T>) -> AttributeResult<[T; 4]> {
    match <[T; 4]>::try_from(items) {
        Ok(all) => Ok(all),
        Err(items) => match items.as_slice() {
            [a] => Ok([a.clone(), a.clone(), a.clone(), a.clone()]),
            [tb, lr] => Ok([tb.clone(), lr.clone(), tb.clone(), lr.clone()]),
            [t, lr, b] => Ok([t.clone(), lr.clone(), b.clone(), lr.clone()]),
            _ => Err(AttributeError::malformed(
                attr,
                format!("expected 1 to 4 values, got {}", items.len()),
            )),
        },
    }
}

fn number(attr: &str, v: &Value) -> AttributeResult<f64> {
    match v {
        Value::Number(n) => Ok(*n),
        Value::Str(s) => parse_number(s)
            .ok_or_else(|| AttributeError::malformed(attr, format!("`{s}` is not a number"))),
        other => Err(AttributeError::malformed(attr, format!("`{other}` is not a number"))),
    }
}

/// Parse a side list.
///
/// Accepts a number, a list of 1 to 4 numbers, or a whitespace separated
/// string of 1 to 4 numbers. `Nil` is all zeros.
pub fn parse_sides(attr: &str, value: &Value) -> AttributeResult<Sides> {
    let nums = match value {
        Value::Nil => return Ok(Sides::default()),
        Value::Number(n) => vec![*n],
        Value::Str(s) => s
            .split_whitespace()
            .map(|part| number(attr, &Value::from(part)))
            .collect::<AttributeResult<Vec<f64>>>()?,
        Value::List(items) => items
            .iter()
            .map(|item| number(attr, item))
            .collect::<AttributeResult<Vec<f64>>>()?,
        Value::Bool(_) => {
            return Err(AttributeError::malformed(attr, "expected a number, list or string"));
        }
    };
    let [t, r, b, l] = distribute(attr, nums)?;
    Ok(Sides::new(t, r, b, l))
}

/// Shorthand transform for side lists.
pub fn sides_shorthand(name: &str, value: &Value) -> AttributeResult<Calculated> {
    let sides = parse_sides(name, value)?;
    let fields = PREFIXES
        .iter()
        .zip(sides.as_array())
        .map(|(p, v)| (format!("{p}{name}"), Value::Number(v)))
        .collect();
    Ok(Calculated {
        value: sides.to_value(),
        fields,
    })
}

/// Getter reconstructing a side list from the calculated directional fields.
pub fn sides_getter(_exterior: &AttrMap, calc: &AttrMap, name: &str) -> Value {
    Value::List(
        PREFIXES
            .iter()
            .map(|p| {
                let v = calc.get(&format!("{p}{name}")).and_then(Value::as_f64).unwrap_or(0.0);
                Value::Number(v)
            })
            .collect(),
    )
}

fn parse_border_side(attr: &str, value: &Value) -> AttributeResult<Option<(f64, Color)>> {
    match value {
        Value::Nil => Ok(None),
        Value::Number(w) => Ok(Some((*w, Color::BLACK))),
        Value::Str(s) => {
            let mut width = None;
            let mut color = None;
            for part in s.split_whitespace() {
                if let Some(n) = parse_number(part) {
                    width = Some(n);
                } else if let Some(c) = Color::parse_str(part) {
                    color = Some(c);
                } else {
                    return Err(AttributeError::malformed(attr, format!("unrecognized `{part}`")));
                }
            }
            if width.is_none() && color.is_none() {
                return Ok(None);
            }
            Ok(Some((width.unwrap_or(1.0), color.unwrap_or(Color::BLACK))))
        }
        Value::List(items) => match items.as_slice() {
            [Value::Number(w), c] => Color::parse(c)
                .map(|c| Some((*w, c)))
                .ok_or_else(|| AttributeError::malformed(attr, format!("`{c}` is not a color"))),
            _ => Err(AttributeError::malformed(attr, "expected a [width, color] pair")),
        },
        Value::Bool(_) => Err(AttributeError::malformed(attr, "expected a border description")),
    }
}

fn is_border_pair(items: &[Value]) -> bool {
    matches!(items, [Value::Number(_), c] if Color::parse(c).is_some())
}

/// Parse a border value into per-side `(width, color)` pairs.
///
/// Accepts `"1px #fff"`, a color, a width, a `[width, color]` pair, or a list
/// of 1 to 4 of those distributed over the sides.
pub fn parse_border(attr: &str, value: &Value) -> AttributeResult<[Option<(f64, Color)>; 4]> {
    match value {
        Value::List(items) if !is_border_pair(items) => {
            let sides = items
                .iter()
                .map(|item| parse_border_side(attr, item))
                .collect::<AttributeResult<Vec<_>>>()?;
            distribute(attr, sides)
        }
        other => {
            let side = parse_border_side(attr, other)?;
            Ok([side; 4])
        }
    }
}

fn border_side_value(side: Option<(f64, Color)>) -> Value {
    match side {
        Some((w, c)) => Value::List(vec![Value::Number(w), c.to_value()]),
        None => Value::Nil,
    }
}

/// Shorthand transform for borders.
pub fn border_shorthand(name: &str, value: &Value) -> AttributeResult<Calculated> {
    let sides = parse_border(name, value)?;
    let fields: Vec<(String, Value)> = PREFIXES
        .iter()
        .zip(sides)
        .map(|(p, side)| (format!("{p}{name}"), border_side_value(side)))
        .collect();
    let value = Value::List(fields.iter().map(|(_, v)| v.clone()).collect());
    Ok(Calculated { value, fields })
}

/// Getter reconstructing a border from the calculated directional fields.
pub fn border_getter(_exterior: &AttrMap, calc: &AttrMap, name: &str) -> Value {
    Value::List(
        PREFIXES
            .iter()
            .map(|p| calc.get(&format!("{p}{name}")).cloned().unwrap_or(Value::Nil))
            .collect(),
    )
}
