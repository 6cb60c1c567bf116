//! Per-widget user handler slots.
//!
//! Every widget instance can carry user callbacks for input, focus,
//! drag-and-drop, attribute changes and reflow. A user handler always runs
//! before the widget kind's own behavior and decides whether that behavior
//! still runs:
//!
//! - [`HandlerResult::Handled`]: the event counts as handled by this widget;
//!   the kind's default behavior still runs.
//! - [`HandlerResult::NotHandled`]: the kind's default decides.
//! - [`HandlerResult::Suppressed`]: the kind's default behavior is skipped.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let button = ui.spawn(Button::new(), attrs! { "label" => "Save" }).unwrap();
//! ui.on(button, HandlerKind::Click, |cx, _event| {
//!     cx.ui.attr(cx.id, "label", "Saved").ok();
//!     HandlerResult::Handled
//! })
//! .unwrap();
//! ```

use std::collections::HashMap;
use std::fmt;

use trellis_core::Value;

use super::context::WidgetCx;
use super::events::Event;

/// Outcome of a user handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerResult {
    /// Handled by this widget; default behavior continues.
    Handled,
    /// Not handled; default behavior decides.
    #[default]
    NotHandled,
    /// Skip the default behavior.
    Suppressed,
}

/// The event-like handler slots a widget exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Button pressed and released over the widget.
    Click,
    /// Second click within the double click delay.
    DoubleClick,
    /// Button held past the long press delay.
    LongPress,
    /// Button pressed over the widget.
    MouseDown,
    /// Button released over the widget.
    MouseUp,
    /// Pointer entered the widget.
    MouseEnter,
    /// Pointer left the widget.
    MouseLeave,
    /// Wheel turned over the widget.
    MouseWheel,
    /// Key pressed while focused.
    KeyPress,
    /// Widget is gaining focus; `Suppressed` refuses it.
    Focus,
    /// Widget lost focus.
    Blur,
    /// Pointer dragged from the widget; `Handled` makes it draggable.
    DragStart,
    /// Pointer moved while this widget is being dragged.
    DragMove,
    /// Drag from this widget ended.
    DragEnd,
    /// A droppable drag entered the widget; `Handled` accepts drops.
    DropFocus,
    /// The drag left the widget.
    DropBlur,
    /// A drag was dropped on the widget.
    Drop,
    /// Files from the host were dropped on the widget.
    DropFile,
}

/// Where an attribute change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOrigin {
    /// Programmatic assignment through `Ui::attr`.
    Attr,
    /// The widget updated its own state (user interaction, host resize).
    Sync,
    /// An animation step.
    Animation,
}

/// Description of an attribute change passed to `on_attr` handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrChange {
    /// Attribute name.
    pub name: String,
    /// New exterior value.
    pub value: Value,
    /// Previous exterior value (`Nil` if unset).
    pub old: Value,
    /// New calculated value.
    pub calculated: Value,
    /// Where the change came from.
    pub origin: AttrOrigin,
}

/// Handler invoked for an event-like slot.
pub type EventHandler = Box<dyn FnMut(&mut WidgetCx<'_>, &Event) -> HandlerResult>;
/// Handler invoked when an attribute changes.
pub type AttrHandler = Box<dyn FnMut(&mut WidgetCx<'_>, &AttrChange) -> HandlerResult>;
/// Handler invoked after the widget is reflowed.
pub type ReflowHandler = Box<dyn FnMut(&mut WidgetCx<'_>)>;

/// The handler slots of one widget.
#[derive(Default)]
pub struct Handlers {
    events: HashMap<HandlerKind, EventHandler>,
    pub(crate) attr: Option<AttrHandler>,
    pub(crate) reflow: Option<ReflowHandler>,
}

impl Handlers {
    /// Whether a slot is occupied.
    pub fn has(&self, kind: HandlerKind) -> bool {
        self.events.contains_key(&kind)
    }

    pub(crate) fn set(&mut self, kind: HandlerKind, handler: EventHandler) {
        self.events.insert(kind, handler);
    }

    pub(crate) fn clear(&mut self, kind: HandlerKind) {
        self.events.remove(&kind);
    }

    pub(crate) fn take(&mut self, kind: HandlerKind) -> Option<EventHandler> {
        self.events.remove(&kind)
    }

    /// Put a handler back after invoking it, unless the handler installed a
    /// replacement while it ran.
    pub(crate) fn restore(&mut self, kind: HandlerKind, handler: EventHandler) {
        self.events.entry(kind).or_insert(handler);
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .field("attr", &self.attr.is_some())
            .field("reflow", &self.reflow.is_some())
            .finish()
    }
}
