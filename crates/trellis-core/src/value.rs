//! Dynamic attribute values.
//!
//! Every widget attribute is stored as a [`Value`]. Two maps of values exist
//! per widget: the *exterior* map holds what the user assigned, the
//! *calculated* map holds the normalized form the layout and paint code reads.
//! An attribute absent from a map is "unset", which is distinct from an
//! explicit [`Value::Nil`].
//!
//! # Example
//!
//! ```
//! use trellis_core::{Value, ValueType};
//!
//! let v = Value::from("42");
//! assert_eq!(v.coerce(ValueType::Number), Value::Number(42.0));
//! assert_eq!(Value::from(0).coerce(ValueType::Boolean), Value::Bool(false));
//! ```

use std::collections::HashMap;
use std::fmt;

/// A dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit null.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Any number.
    Number(f64),
    /// A string.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
}

/// Attribute name to value map.
pub type AttrMap = HashMap<String, Value>;

/// Semantic type tags used when coercing user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Numbers, numeric strings and booleans become numbers.
    Number,
    /// Everything is stringified.
    String,
    /// A small false-synonym set is false, everything else true.
    Boolean,
}

impl Value {
    /// Whether this is the explicit null.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The number held, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean held, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string held, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The list held, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Truthiness: `Nil` and `false` are false.
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Convert to the given semantic type.
    pub fn coerce(self, ty: ValueType) -> Value {
        match ty {
            ValueType::Number => match self {
                Value::Number(_) | Value::Nil => self,
                Value::Bool(b) => Value::Number(if b { 1.0 } else { 0.0 }),
                Value::Str(s) => match parse_number(&s) {
                    Some(n) => Value::Number(n),
                    None => {
                        crate::trellis_debug!(value = %s, "string is not a number");
                        Value::Nil
                    }
                },
                Value::List(_) => Value::Nil,
            },
            ValueType::String => match self {
                Value::Nil | Value::Str(_) => self,
                other => Value::Str(other.to_string()),
            },
            ValueType::Boolean => match self {
                Value::Nil | Value::Bool(_) => self,
                Value::Number(n) => Value::Bool(n != 0.0),
                Value::Str(s) => {
                    let s = s.trim();
                    Value::Bool(!(s == "0" || s.eq_ignore_ascii_case("false")))
                }
                Value::List(_) => Value::Bool(true),
            },
        }
    }

    /// Interpolate between two values at `t` in `[0, 1]`.
    ///
    /// Numbers interpolate linearly and equal-length lists element-wise.
    /// Anything else holds `self` until `t` reaches 1, then snaps to `dst`.
    pub fn lerp(&self, dst: &Value, t: f64) -> Value {
        match (self, dst) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * t),
            (Value::List(a), Value::List(b)) if a.len() == b.len() => {
                Value::List(a.iter().zip(b).map(|(x, y)| x.lerp(y, t)).collect())
            }
            _ if t >= 1.0 => dst.clone(),
            _ => self.clone(),
        }
    }
}

/// Parse a number the way user-facing attributes accept one.
///
/// A trailing `px` or `%` unit is ignored; `"true"`/`"false"` map to 1/0.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if s.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    let s = s.strip_suffix("px").unwrap_or(s);
    s.parse::<f64>().ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(f64, f32, i32, i64, u32, usize);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(items: [f64; N]) -> Self {
        Value::List(items.iter().map(|n| Value::Number(*n)).collect())
    }
}

impl<const N: usize> From<[i32; N]> for Value {
    fn from(items: [i32; N]) -> Self {
        Value::List(items.iter().map(|n| Value::Number(f64::from(*n))).collect())
    }
}

/// What an attribute assignment asks for.
///
/// `Assign::Default` restores the class default (re-running a factory if the
/// attribute has one), which is different from assigning [`Value::Nil`].
#[derive(Debug, Clone, PartialEq)]
pub enum Assign {
    /// Restore the class default.
    Default,
    /// Assign this value.
    Value(Value),
}

impl From<Value> for Assign {
    fn from(v: Value) -> Self {
        Assign::Value(v)
    }
}

macro_rules! impl_assign_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Assign {
                fn from(v: $ty) -> Self {
                    Assign::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_assign_from!(f64, f32, i32, i64, u32, usize, bool, &str, String, Vec<Value>);

impl<const N: usize> From<[f64; N]> for Assign {
    fn from(items: [f64; N]) -> Self {
        Assign::Value(Value::from(items))
    }
}

impl<const N: usize> From<[i32; N]> for Assign {
    fn from(items: [i32; N]) -> Self {
        Assign::Value(Value::from(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(Value::from("12.5").coerce(ValueType::Number), Value::Number(12.5));
        assert_eq!(Value::from("10px").coerce(ValueType::Number), Value::Number(10.0));
        assert_eq!(Value::from("TRUE").coerce(ValueType::Number), Value::Number(1.0));
        assert_eq!(Value::from(false).coerce(ValueType::Number), Value::Number(0.0));
        assert_eq!(Value::from("abc").coerce(ValueType::Number), Value::Nil);
    }

    #[test]
    fn test_coerce_boolean_false_synonyms() {
        for v in [Value::from(false), Value::from(0), Value::from("0"), Value::from("False")] {
            assert_eq!(v.coerce(ValueType::Boolean), Value::Bool(false));
        }
        assert_eq!(Value::from("yes").coerce(ValueType::Boolean), Value::Bool(true));
        assert_eq!(Value::from(2).coerce(ValueType::Boolean), Value::Bool(true));
        assert_eq!(Value::Nil.coerce(ValueType::Boolean), Value::Nil);
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(Value::from(3).coerce(ValueType::String), Value::from("3"));
        assert_eq!(Value::from(0.25).coerce(ValueType::String), Value::from("0.25"));
        assert_eq!(Value::from(true).coerce(ValueType::String), Value::from("true"));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(Value::from(0).lerp(&Value::from(10), 0.5), Value::Number(5.0));
        assert_eq!(
            Value::from([0.0, 1.0]).lerp(&Value::from([1.0, 0.0]), 0.25),
            Value::from([0.25, 0.75])
        );
        let a = Value::from("a");
        let b = Value::from("b");
        assert_eq!(a.lerp(&b, 0.5), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_display_list() {
        assert_eq!(Value::from([5, 10]).to_string(), "[5, 10]");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_assign_conversions() {
        assert_eq!(Assign::from(5), Assign::Value(Value::Number(5.0)));
        assert_eq!(Assign::from(Value::Nil), Assign::Value(Value::Nil));
    }
}
