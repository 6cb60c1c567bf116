//! Widget system for Trellis.
//!
//! This module provides the retained widget tree and everything that acts on
//! it:
//!
//! - [`Ui`]: the arena owning every widget plus the session state
//! - [`Widget`] trait: the behavior of one widget kind
//! - [`WidgetBase`]: the attribute maps, geometry and flags every widget has
//! - Reflow: parents offer boxes, children realize geometry inside them
//! - Event dispatch: z-ordered hit testing, focus, drag and drop, modals
//! - Animations of calculated attribute values
//!
//! # Overview
//!
//! Widgets are addressed by [`WidgetId`] handles into the arena. A widget's
//! state is split between its [`WidgetBase`], which the framework manages,
//! and its kind object (a [`Button`](widgets::Button), a
//! [`Slider`](widgets::Slider), ...), which implements [`Widget`].
//!
//! Attributes are the public surface of a widget. Each has an *exterior*
//! value, as the program set it, and a *calculated* value the kind uses,
//! derived through the class's attribute table. Setting an attribute runs
//! the user's attribute handler and the kind's
//! [`attr_changed`](Widget::attr_changed) hook, then queues a full or
//! partial reflow and a repaint as the attribute's descriptor asks.
//!
//! # Creating a Widget
//!
//! 1. Declare an attribute table, usually derived from
//!    [`WIDGET_ATTRS`](attributes::WIDGET_ATTRS)
//! 2. Implement [`Widget`], overriding only the hooks the kind needs
//! 3. Spawn it with [`Ui::spawn`] and place it in a container
//!
//! ```
//! use std::sync::LazyLock;
//! use trellis::prelude::*;
//! use trellis::widget::attributes::WIDGET_ATTRS;
//!
//! static SWATCH_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
//!     AttributeTable::derive(&WIDGET_ATTRS, "Swatch", vec![
//!         ("size", AttributeSpec::new().default_value(16).reflow(Reflow::Full)),
//!     ])
//!     .unwrap()
//! });
//!
//! struct Swatch;
//!
//! impl Widget for Swatch {
//!     fn attributes(&self) -> &'static AttributeTable {
//!         &SWATCH_ATTRS
//!     }
//!
//!     fn intrinsic_size(&self, base: &WidgetBase, _: &dyn FontMetrics, scale: f64) -> (f64, f64) {
//!         let size = base.calc_f64("size").unwrap_or(16.0) * scale;
//!         (size, size)
//!     }
//! }
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let swatch = ui.spawn(Swatch, attrs! { "size" => 24 }).unwrap();
//! let realized = ui.reflow(swatch, Some(Offer::new(100.0, 100.0))).unwrap();
//! assert_eq!((realized.w, realized.h), (24.0, 24.0));
//! ```
//!
//! # Coordinate Systems
//!
//! - **Geometry** (`x`, `y`, `w`, `h` of [`Geometry`]): relative to the
//!   parent's client area, in device pixels
//! - **Client position**: window coordinates of the widget's top-left
//!   corner, computed when geometry is realized
//! - **Attribute units**: unscaled pixels, or fractions of the offered box
//!   for sizes in `(0, 1]`, or offsets from its far edge when negative

pub mod animation;
pub mod attributes;
pub mod base;
pub mod context;
pub mod events;
pub mod handlers;
pub mod painting;
pub mod reflow;
pub mod session;
pub mod traits;
pub mod widgets;

mod debug;
mod dispatcher;
mod focus;
mod layout;
mod modal;
mod ui;

#[cfg(test)]
mod tests;

pub use animation::{AnimationFuture, AnimationSpec, AnimationState, Easing};
pub use base::{Align, Geometry, WidgetBase, WidgetId};
pub use context::{HandlerCx, WidgetCx};
pub use debug::{TreeDisplay, TreeFormatOptions, TreeStyle};
pub use events::{Event, EventSynth, EventType, InputState, Key, Modifiers, MouseButtons};
pub use handlers::{AttrChange, AttrOrigin, HandlerKind, HandlerResult};
pub use painting::{Canvas, DrawOp, FontMetrics, MonospaceMetrics, RecordingCanvas};
pub use reflow::{Offer, Realized};
pub use session::{DragState, HostUpdate, PressState, Session};
pub use traits::{DragStart, PaintContext, Widget};
pub use ui::{AttrOptions, Ui};
