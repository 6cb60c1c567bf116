//! Handler and hook context.

use trellis_core::{Color, Value};

use super::base::{Geometry, WidgetBase};
use super::handlers::HandlerKind;
use super::{Ui, WidgetId};

/// What a widget hook or user handler gets to work with: the whole [`Ui`]
/// and the id of the widget being handled.
///
/// While a hook of a widget kind runs, that kind object is checked out of
/// the arena, so `cx.ui` can be used freely, including to change the
/// widget's own attributes.
pub struct WidgetCx<'a> {
    /// The UI session.
    pub ui: &'a mut Ui,
    /// The widget being handled.
    pub id: WidgetId,
}

/// Context passed to user handlers.
pub type HandlerCx<'a> = WidgetCx<'a>;

impl<'a> WidgetCx<'a> {
    /// A context for `id`.
    pub fn new(ui: &'a mut Ui, id: WidgetId) -> Self {
        Self { ui, id }
    }

    /// Shared state of the widget; `None` once destroyed.
    pub fn base(&self) -> Option<&WidgetBase> {
        self.ui.base(self.id)
    }

    /// Calculated number.
    pub fn calc_f64(&self, name: &str) -> Option<f64> {
        self.base().and_then(|b| b.calc_f64(name))
    }

    /// Calculated truthiness.
    pub fn calc_bool(&self, name: &str) -> bool {
        self.base().is_some_and(|b| b.calc_bool(name))
    }

    /// Calculated string, owned.
    pub fn calc_string(&self, name: &str) -> Option<String> {
        self.base().and_then(|b| b.calc_str(name)).map(str::to_string)
    }

    /// Calculated color.
    pub fn calc_color(&self, name: &str) -> Option<Color> {
        self.base().and_then(|b| b.calc_color(name))
    }

    /// Calculated value, cloned.
    pub fn calc(&self, name: &str) -> Option<Value> {
        self.base().and_then(|b| b.calc(name)).cloned()
    }

    /// Realized geometry.
    pub fn geometry(&self) -> Geometry {
        self.base().map(WidgetBase::geometry).unwrap_or_default()
    }

    /// Window-relative position.
    pub fn client_pos(&self) -> (f64, f64) {
        self.base().map(WidgetBase::client_pos).unwrap_or_default()
    }

    /// UI scale.
    pub fn scale(&self) -> f64 {
        self.ui.session.config.scale
    }

    /// Current tick time.
    pub fn now(&self) -> f64 {
        self.ui.session.now
    }

    /// Whether this widget holds keyboard focus.
    pub fn is_focused(&self) -> bool {
        self.ui.session.focused == Some(self.id)
    }

    /// Request a repaint.
    pub fn queue_draw(&mut self) {
        self.ui.session.redraw = true;
    }

    /// Whether the widget wants pointer interaction by default: it is
    /// focusable, has a background, or carries a pointer handler.
    pub fn is_interactive(&self) -> bool {
        let Some(base) = self.base() else {
            return false;
        };
        base.calc_bool("focusable")
            || base.calc("bg").is_some_and(|v| !v.is_nil())
            || [
                HandlerKind::Click,
                HandlerKind::DoubleClick,
                HandlerKind::LongPress,
                HandlerKind::MouseDown,
                HandlerKind::MouseUp,
                HandlerKind::DragStart,
            ]
            .into_iter()
            .any(|k| base.handlers.has(k))
    }
}
