//! Core widget trait definitions.
//!
//! This module defines the [`Widget`] trait implemented by every widget kind,
//! and [`PaintContext`], which is handed to [`Widget::paint`].
//!
//! A widget kind holds only kind-specific state (an entry's undo stack, a
//! slider's active thumb). Attributes, geometry, flags, children and user
//! handlers live in the [`Ui`](super::Ui) arena next to it, and reach hooks
//! through [`WidgetCx`].
//!
//! Input hooks return `true` when the widget handled the event. They run
//! after the user handler of the same slot, and not at all when that handler
//! returned [`HandlerResult::Suppressed`](super::HandlerResult::Suppressed).

use std::any::Any;

use trellis_core::{AttributeTable, Value};

use super::base::WidgetBase;
use super::context::WidgetCx;
use super::events::Event;
use super::handlers::AttrChange;
use super::painting::{draw_frame, Canvas, FontMetrics};
use super::reflow::{reflow_leaf, Offer, Realized};
use super::WidgetId;

/// Context provided during widget painting.
pub struct PaintContext<'a> {
    /// Shared state of the widget being painted.
    pub base: &'a WidgetBase,
    /// The surface to paint on.
    pub canvas: &'a mut dyn Canvas,
    /// Window-relative x of the widget's top-left corner.
    pub x: f64,
    /// Window-relative y of the widget's top-left corner.
    pub y: f64,
    /// UI scale.
    pub scale: f64,
    /// Composed alpha of the widget and its ancestors.
    pub alpha: f64,
    /// Text metrics.
    pub metrics: &'a dyn FontMetrics,
    /// Whether the widget holds keyboard focus.
    pub focused: bool,
}

impl PaintContext<'_> {
    /// Paint the background and border.
    pub fn frame(&mut self) {
        draw_frame(self.base, self.canvas, self.x, self.y, self.scale);
    }

    /// Realized width.
    pub fn width(&self) -> f64 {
        self.base.geometry().w
    }

    /// Realized height.
    pub fn height(&self) -> f64 {
        self.base.geometry().h
    }
}

/// What a widget returns from [`Widget::drag_start`] to become draggable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragStart {
    /// Whether drop targets should be offered the drag.
    pub droppable: bool,
    /// Payload handed to drop targets.
    pub arg: Value,
}

/// The base trait for all widget kinds.
///
/// Every hook has a default, so a kind only overrides what it customizes.
/// The minimal kind names its attribute table:
///
/// ```
/// use trellis::prelude::*;
/// use trellis::widget::attributes::WIDGET_ATTRS;
///
/// struct Marker;
///
/// impl Widget for Marker {
///     fn attributes(&self) -> &'static AttributeTable {
///         &WIDGET_ATTRS
///     }
/// }
///
/// let mut ui = Ui::new(UiConfig::default());
/// let marker = ui.spawn(Marker, attrs! { "w" => 10, "h" => 10 }).unwrap();
/// assert_eq!(ui.base(marker).unwrap().class_name(), "Widget");
/// ```
pub trait Widget: Any {
    /// The class attribute table.
    fn attributes(&self) -> &'static AttributeTable;

    /// Whether the widget can hold children.
    fn is_container(&self) -> bool {
        false
    }

    /// Called once, right after the widget was created with its initial
    /// attributes.
    fn init(&mut self, _cx: &mut WidgetCx<'_>) {}

    // =========================================================================
    // Layout
    // =========================================================================

    /// Content size, excluding padding and border.
    fn intrinsic_size(&self, _base: &WidgetBase, _metrics: &dyn FontMetrics, _scale: f64) -> (f64, f64) {
        (0.0, 0.0)
    }

    /// Lay out the widget within `offer`.
    fn reflow(&mut self, cx: &mut WidgetCx<'_>, offer: &Offer) -> Realized {
        let Some(base) = cx.ui.base(cx.id) else {
            return Realized::default();
        };
        let intrinsic = self.intrinsic_size(base, cx.ui.metrics(), offer.scale);
        reflow_leaf(base, offer, intrinsic)
    }

    /// Compute draw-time state once the final position is known.
    fn realize(&mut self, _cx: &mut WidgetCx<'_>) {}

    /// Paint the widget. Children are painted by the arena afterwards.
    fn paint(&self, ctx: &mut PaintContext<'_>) {
        ctx.frame();
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// An attribute of this widget changed.
    fn attr_changed(&mut self, _cx: &mut WidgetCx<'_>, _change: &AttrChange) {}

    // =========================================================================
    // Pointer and Keyboard
    // =========================================================================

    /// A button went down over the widget.
    fn mouse_down(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        cx.is_interactive()
    }

    /// A button went up over the widget.
    fn mouse_up(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        false
    }

    /// The widget was clicked.
    fn click(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        false
    }

    /// The widget was double clicked.
    fn double_click(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        false
    }

    /// A button was held over the widget past the long press delay.
    fn long_press(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        false
    }

    /// The wheel turned over the widget.
    fn wheel(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        false
    }

    /// A key was pressed while the widget is focused.
    fn key_press(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        false
    }

    /// The pointer entered the widget. Returning `true` makes it hover.
    fn mouse_enter(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        cx.is_interactive()
    }

    /// The pointer left the widget.
    fn mouse_leave(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) {}

    // =========================================================================
    // Focus
    // =========================================================================

    /// The widget is about to gain focus. Returning `false` refuses it.
    fn focus_in(&mut self, _cx: &mut WidgetCx<'_>) -> bool {
        true
    }

    /// The widget lost focus.
    fn focus_out(&mut self, _cx: &mut WidgetCx<'_>) {}

    // =========================================================================
    // Drag and Drop
    // =========================================================================

    /// The pointer moved past the drag threshold with a button held on the
    /// widget. Returning `Some` starts a drag.
    fn drag_start(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> Option<DragStart> {
        None
    }

    /// The pointer moved during a drag started from this widget.
    fn drag_move(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) {}

    /// A drag started from this widget ended.
    fn drag_end(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event, _target: Option<WidgetId>) {}

    /// A droppable drag entered the widget. Returning `true` accepts drops.
    fn drop_enter(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event, _source: WidgetId, _arg: &Value) -> bool {
        false
    }

    /// The pointer moved over the widget while it is the drop target.
    fn drop_move(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event, _source: WidgetId, _arg: &Value) {}

    /// The drag left the widget.
    fn drop_leave(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event, _source: WidgetId, _arg: &Value) {}

    /// The drag was dropped on the widget.
    fn drop_accept(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event, _source: WidgetId, _arg: &Value) -> bool {
        false
    }

    /// Files from the host were dropped on the widget.
    fn file_drop(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        false
    }

    // =========================================================================
    // Modality
    // =========================================================================

    /// The session asks a modal widget to release. Returning `false`
    /// declines.
    fn release_modal(&mut self, _cx: &mut WidgetCx<'_>) -> bool {
        true
    }
}
