//! Widget base implementation.
//!
//! This module provides `WidgetBase`, the state every widget carries
//! regardless of its kind: the exterior and calculated attribute maps, the
//! class attribute table, the realized geometry, interaction flags and the
//! user handler slots. The [`Ui`](super::Ui) arena owns one `WidgetBase` per
//! widget next to the widget's kind object.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::new_key_type;
use trellis_core::attribute::{parse_border, Sides};
use trellis_core::{AttrMap, AttributeTable, Color, Value};

use super::handlers::Handlers;
use super::reflow::Offer;

new_key_type! {
    /// Arena handle of a widget.
    ///
    /// Ids are never reused for a different widget within a `Ui`; a
    /// destroyed widget's id simply stops resolving.
    pub struct WidgetId;
}

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Horizontal or vertical alignment of a widget within its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Left or top.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Right or bottom.
    End,
}

impl Align {
    /// Alignment from a calculated enum constant.
    pub fn from_constant(v: Option<f64>) -> Option<Align> {
        match v? as i64 {
            0 => Some(Align::Start),
            1 => Some(Align::Center),
            2 => Some(Align::End),
            _ => None,
        }
    }
}

/// Calculated geometry, relative to the parent's box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    /// X offset within the parent.
    pub x: f64,
    /// Y offset within the parent.
    pub y: f64,
    /// Width including padding and border.
    pub w: f64,
    /// Height including padding and border.
    pub h: f64,
}

/// State common to all widgets.
pub struct WidgetBase {
    serial: u64,
    table: &'static AttributeTable,
    pub(crate) attrs: AttrMap,
    pub(crate) calc: AttrMap,

    pub(crate) geometry: Geometry,
    pub(crate) client_x: f64,
    pub(crate) client_y: f64,
    pub(crate) last_offer: Option<Offer>,

    pub(crate) realized: bool,
    pub(crate) drawn: bool,
    pub(crate) mouseover: bool,
    pub(crate) hovering: bool,

    pub(crate) parent: Option<super::WidgetId>,
    pub(crate) handlers: Handlers,
}

impl WidgetBase {
    pub(crate) fn new(table: &'static AttributeTable) -> Self {
        Self {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            table,
            attrs: AttrMap::new(),
            calc: AttrMap::new(),
            geometry: Geometry::default(),
            client_x: 0.0,
            client_y: 0.0,
            last_offer: None,
            realized: false,
            drawn: false,
            mouseover: false,
            hovering: false,
            parent: None,
            handlers: Handlers::default(),
        }
    }

    /// Process-wide allocation number; increases with every widget created.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The class attribute table.
    pub fn table(&self) -> &'static AttributeTable {
        self.table
    }

    /// Class name.
    pub fn class_name(&self) -> &'static str {
        self.table.class()
    }

    /// Parent widget, if attached.
    pub fn parent(&self) -> Option<super::WidgetId> {
        self.parent
    }

    // =========================================================================
    // Attribute Access
    // =========================================================================

    /// The value an attribute reads as (getter override or exterior value).
    pub fn get(&self, name: &str) -> Option<Value> {
        self.table.read(name, &self.attrs, &self.calc)
    }

    /// The calculated value of an attribute.
    pub fn calc(&self, name: &str) -> Option<&Value> {
        self.calc.get(name)
    }

    /// Calculated number.
    pub fn calc_f64(&self, name: &str) -> Option<f64> {
        self.calc.get(name).and_then(Value::as_f64)
    }

    /// Calculated truthiness; unset is false.
    pub fn calc_bool(&self, name: &str) -> bool {
        self.calc.get(name).is_some_and(Value::truthy)
    }

    /// Calculated string.
    pub fn calc_str(&self, name: &str) -> Option<&str> {
        self.calc.get(name).and_then(Value::as_str)
    }

    /// Calculated color.
    pub fn calc_color(&self, name: &str) -> Option<Color> {
        self.calc.get(name).and_then(Color::parse)
    }

    /// The exterior attribute map.
    pub fn exterior(&self) -> &AttrMap {
        &self.attrs
    }

    /// The calculated attribute map.
    pub fn calculated(&self) -> &AttrMap {
        &self.calc
    }

    fn sides(&self, name: &str) -> Sides {
        let side = |p: &str| self.calc_f64(&format!("{p}{name}")).unwrap_or(0.0);
        Sides::new(side("t"), side("r"), side("b"), side("l"))
    }

    /// Calculated padding, unscaled.
    pub fn padding(&self) -> Sides {
        self.sides("padding")
    }

    /// Calculated margin, unscaled.
    pub fn margin(&self) -> Sides {
        self.sides("margin")
    }

    /// Calculated hot zone extension, unscaled.
    pub fn hotzone(&self) -> Sides {
        self.sides("hotzone")
    }

    /// Per-side border `(width, color)`, top, right, bottom, left.
    pub fn border(&self) -> [Option<(f64, Color)>; 4] {
        let mut out = [None; 4];
        for (slot, p) in out.iter_mut().zip(["t", "r", "b", "l"]) {
            let name = format!("{p}border");
            if let Some(v) = self.calc.get(&name) {
                *slot = parse_border(&name, v).ok().and_then(|s| s[0]);
            }
        }
        out
    }

    /// Border widths, unscaled.
    pub fn border_widths(&self) -> Sides {
        let [t, r, b, l] = self.border().map(|s| s.map(|(w, _)| w).unwrap_or(0.0));
        Sides::new(t, r, b, l)
    }

    /// Padding plus border, scaled.
    pub fn insets(&self, scale: f64) -> Sides {
        (self.padding() + self.border_widths()).scaled(scale)
    }

    /// Calculated horizontal alignment.
    pub fn halign(&self) -> Option<Align> {
        Align::from_constant(self.calc_f64("halign"))
    }

    /// Calculated vertical alignment.
    pub fn valign(&self) -> Option<Align> {
        Align::from_constant(self.calc_f64("valign"))
    }

    // =========================================================================
    // Geometry and State
    // =========================================================================

    /// Realized geometry relative to the parent.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Realized window-relative position.
    pub fn client_pos(&self) -> (f64, f64) {
        (self.client_x, self.client_y)
    }

    /// The box most recently offered to the widget.
    pub fn last_offer(&self) -> Option<&Offer> {
        self.last_offer.as_ref()
    }

    /// Whether the widget is visible.
    pub fn is_visible(&self) -> bool {
        self.calc.get("visible").is_none_or(Value::truthy)
    }

    /// Whether the widget is disabled.
    pub fn is_disabled(&self) -> bool {
        self.calc_bool("disabled")
    }

    /// Whether the widget has been laid out.
    pub fn is_realized(&self) -> bool {
        self.realized
    }

    /// Whether the widget was painted in the last draw pass.
    pub fn is_drawn(&self) -> bool {
        self.drawn
    }

    /// Whether the pointer is over the widget.
    pub fn is_mouseover(&self) -> bool {
        self.mouseover
    }

    /// Whether the widget accepted the pointer entering it.
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Whether the window-relative point hits the widget, including its hot
    /// zone.
    pub fn contains(&self, x: f64, y: f64, scale: f64) -> bool {
        if !self.realized || self.calc_bool("ghost") {
            return false;
        }
        let hz = self.hotzone().scaled(scale);
        let left = self.client_x - hz.left;
        let top = self.client_y - hz.top;
        let right = self.client_x + self.geometry.w + hz.right;
        let bottom = self.client_y + self.geometry.h + hz.bottom;
        x >= left && x < right && y >= top && y < bottom
    }
}

impl std::fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBase")
            .field("class", &self.table.class())
            .field("serial", &self.serial)
            .field("geometry", &self.geometry)
            .field("realized", &self.realized)
            .finish_non_exhaustive()
    }
}
