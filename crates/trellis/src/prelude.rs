//! Prelude module for Trellis.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - The widget tree (`Ui`, `UiConfig`, `WidgetId`) and the `attrs!` macro
//! - Widget foundation (`Widget`, `WidgetBase`, `WidgetCx`, `PaintContext`)
//! - Standard widgets (`Button`, `Entry`, `Slider`, `Spacer`)
//! - Containers and layout (`Container`, `HBox`, `VBox`, `Cell`, `Offer`)
//! - Events and handlers (`Event`, `Key`, `HandlerKind`, `HandlerResult`)
//! - Values and attribute tables (`Value`, `AttributeTable`, `AttributeSpec`)
//! - The window driver (`Window`, `InputState`, `RecordingCanvas`)

// ============================================================================
// Widget Tree
// ============================================================================

pub use crate::attrs;
pub use crate::config::UiConfig;
pub use crate::error::{TreeError, TreeResult};
pub use crate::widget::{AttrOptions, Ui, WidgetId};

// ============================================================================
// Widget Foundation
// ============================================================================

pub use crate::widget::{
    Align, DragStart, Geometry, HandlerCx, PaintContext, Realized, Widget, WidgetBase, WidgetCx,
};

// ============================================================================
// Widgets and Layout
// ============================================================================

pub use crate::widget::widgets::{Axis, Button, Cell, Container, Entry, HBox, Slider, Spacer, VBox};
pub use crate::widget::Offer;

// ============================================================================
// Events and Handlers
// ============================================================================

pub use crate::widget::{
    AttrChange, AttrOrigin, Event, EventType, HandlerKind, HandlerResult, InputState, Key, Modifiers,
    MouseButtons,
};

// ============================================================================
// Animation
// ============================================================================

pub use crate::widget::{AnimationFuture, AnimationSpec, Easing};

// ============================================================================
// Painting
// ============================================================================

pub use crate::widget::{Canvas, FontMetrics, RecordingCanvas};

// ============================================================================
// Values and Attributes
// ============================================================================

pub use trellis_core::{AttrMap, AttributeSpec, AttributeTable, Color, Reflow, Sides, Value};

// ============================================================================
// Window
// ============================================================================

pub use crate::window::{TickReport, Window};
