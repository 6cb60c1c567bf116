//! Color parsing for color-valued attributes.
//!
//! Colors are calculated into a 4-number list `[r, g, b, a]` so the generic
//! list interpolation animates them channel by channel.

use crate::value::Value;

/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque color from channels.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from channels including alpha.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a color from an attribute value.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, a named color, or a list of 3
    /// or 4 numbers. Returns `None` for anything else.
    pub fn parse(value: &Value) -> Option<Color> {
        match value {
            Value::Str(s) => Self::parse_str(s),
            Value::List(items) if items.len() == 3 || items.len() == 4 => {
                let mut ch = [1.0; 4];
                for (slot, item) in ch.iter_mut().zip(items) {
                    *slot = item.as_f64()?;
                }
                Some(Color::rgba(ch[0], ch[1], ch[2], ch[3]))
            }
            _ => None,
        }
    }

    /// Parse a hex or named color string.
    pub fn parse_str(s: &str) -> Option<Color> {
        let s = s.trim();
        let color = match s.strip_prefix('#') {
            Some(hex) => Self::from_hex(hex),
            None => Self::named(s),
        };
        if color.is_none() {
            crate::trellis_trace!(color = s, "unparseable color");
        }
        color
    }

    fn from_hex(hex: &str) -> Option<Color> {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| f64::from(v) / 255.0);
        match hex.len() {
            3 => {
                let mut ch = [0.0; 3];
                for (i, slot) in ch.iter_mut().enumerate() {
                    let d = &hex[i..i + 1];
                    *slot = channel(&format!("{d}{d}"))?;
                }
                Some(Color::rgb(ch[0], ch[1], ch[2]))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 1.0 };
                Some(Color::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    fn named(name: &str) -> Option<Color> {
        let c = match name.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(1.0, 0.0, 0.0),
            "green" => Color::rgb(0.0, 0.5, 0.0),
            "blue" => Color::rgb(0.0, 0.0, 1.0),
            "yellow" => Color::rgb(1.0, 1.0, 0.0),
            "orange" => Color::rgb(1.0, 0.65, 0.0),
            "purple" => Color::rgb(0.5, 0.0, 0.5),
            "gray" | "grey" => Color::rgb(0.5, 0.5, 0.5),
            "transparent" => Color::TRANSPARENT,
            _ => return None,
        };
        Some(c)
    }

    /// Perceived brightness (Rec. 601 weights).
    pub fn luma(&self) -> f64 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// Whether dark foreground content reads better on this color.
    pub fn is_light(&self) -> bool {
        self.luma() > 0.6
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Scale the RGB channels toward white (`amount > 0`) or black (`< 0`).
    pub fn lighten(self, amount: f64) -> Self {
        let f = |c: f64| {
            if amount >= 0.0 {
                c + (1.0 - c) * amount
            } else {
                c * (1.0 + amount)
            }
        };
        Self {
            r: f(self.r).clamp(0.0, 1.0),
            g: f(self.g).clamp(0.0, 1.0),
            b: f(self.b).clamp(0.0, 1.0),
            a: self.a,
        }
    }

    /// The calculated (list) form of the color.
    pub fn to_value(&self) -> Value {
        Value::from([self.r, self.g, self.b, self.a])
    }
}
