//! UI session state.
//!
//! Everything that is global to one UI lives in a [`Session`] owned by the
//! [`Ui`](super::Ui): keyboard focus, the drag in progress, press tracking
//! for clicks and long presses, modal widgets, running animations, deferred
//! callbacks and pending layout work. A fresh `Ui` starts with a fresh
//! session, so independent UIs (and tests) never share state.

use std::fmt;

use trellis_core::Value;

use super::animation::Animations;
use super::events::MouseButtons;
use super::{Ui, WidgetId};
use crate::config::UiConfig;

/// A callback scheduled to run on a later tick.
pub type DeferredFn = Box<dyn FnOnce(&mut Ui)>;

pub(crate) struct Deferred {
    pub(crate) due: Option<f64>,
    pub(crate) delay: f64,
    pub(crate) f: DeferredFn,
}

/// Drag-and-drop state.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    /// Widget a button went down on; it may start a drag.
    pub armed: Option<WidgetId>,
    /// Pointer position where the button went down.
    pub origin: (f64, f64),
    /// Widget being dragged.
    pub dragging: Option<WidgetId>,
    /// Whether the drag is offered to drop targets.
    pub droppable: bool,
    /// Current drop target.
    pub dropping: Option<WidgetId>,
    /// Payload of the drag.
    pub arg: Value,
}

impl DragState {
    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }
}

/// The button press currently held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressState {
    /// Widget that handled the press.
    pub widget: WidgetId,
    /// Tick time of the press.
    pub time: f64,
    /// Button pressed.
    pub button: MouseButtons,
    /// A long press already fired for this press.
    pub long_pressed: bool,
    /// The press turned into a drag.
    pub dragged: bool,
}

/// Layout work requested since the last reflow.
#[derive(Debug, Clone, Default)]
pub struct ReflowQueue {
    /// The whole window must be laid out again.
    pub full: bool,
    partial: Vec<WidgetId>,
}

impl ReflowQueue {
    /// Queue a partial reflow of one widget.
    pub fn push(&mut self, id: WidgetId) {
        if !self.partial.contains(&id) {
            self.partial.push(id);
        }
    }

    /// Widgets queued for partial reflow.
    pub fn partial(&self) -> &[WidgetId] {
        &self.partial
    }

    /// Whether any layout work is pending.
    pub fn is_pending(&self) -> bool {
        self.full || !self.partial.is_empty()
    }

    /// Take the queued partial reflows.
    pub(crate) fn take_partial(&mut self) -> Vec<WidgetId> {
        std::mem::take(&mut self.partial)
    }

    pub(crate) fn clear(&mut self) {
        self.full = false;
        self.partial.clear();
    }
}

/// A programmatic window change the host should apply.
#[derive(Debug, Clone, PartialEq)]
pub struct HostUpdate {
    /// Window attribute (`x`, `y`, `w`, `h` or `title`).
    pub attr: String,
    /// New value.
    pub value: Value,
}

/// State of one UI session.
pub struct Session {
    /// Session configuration.
    pub config: UiConfig,
    pub(crate) now: f64,
    pub(crate) focused: Option<WidgetId>,
    pub(crate) focus_claimed: bool,
    pub(crate) drag: DragState,
    pub(crate) drop_claimed: bool,
    pub(crate) press: Option<PressState>,
    pub(crate) last_click: Option<(WidgetId, f64)>,
    pub(crate) modal: Vec<WidgetId>,
    pub(crate) animations: Animations,
    pub(crate) deferred: Vec<Deferred>,
    pub(crate) reflow: ReflowQueue,
    pub(crate) redraw: bool,
    pub(crate) host_updates: Vec<HostUpdate>,
}

impl Session {
    /// A fresh session.
    pub fn new(config: UiConfig) -> Self {
        Self {
            config,
            now: 0.0,
            focused: None,
            focus_claimed: false,
            drag: DragState::default(),
            drop_claimed: false,
            press: None,
            last_click: None,
            modal: Vec::new(),
            animations: Animations::default(),
            deferred: Vec::new(),
            reflow: ReflowQueue::default(),
            redraw: true,
            host_updates: Vec::new(),
        }
    }

    /// Current tick time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Focused widget.
    pub fn focused(&self) -> Option<WidgetId> {
        self.focused
    }

    /// Drag-and-drop state.
    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// The held press, if any.
    pub fn press(&self) -> Option<&PressState> {
        self.press.as_ref()
    }

    /// Modal widgets.
    pub fn modal(&self) -> &[WidgetId] {
        &self.modal
    }

    /// Running animations.
    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    /// Pending layout work.
    pub fn reflow_queue(&self) -> &ReflowQueue {
        &self.reflow
    }

    /// Whether a repaint is pending.
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// Number of callbacks waiting to run.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Forget every reference to a destroyed widget.
    pub(crate) fn forget(&mut self, id: WidgetId) {
        if self.focused == Some(id) {
            self.focused = None;
        }
        if self.drag.armed == Some(id) {
            self.drag.armed = None;
        }
        if self.drag.dragging == Some(id) {
            self.drag = DragState::default();
        }
        if self.drag.dropping == Some(id) {
            self.drag.dropping = None;
        }
        if self.press.is_some_and(|p| p.widget == id) {
            self.press = None;
        }
        if self.last_click.is_some_and(|(w, _)| w == id) {
            self.last_click = None;
        }
        self.modal.retain(|m| *m != id);
        self.reflow.partial.retain(|w| *w != id);
        for animation in self.animations.remove_widget(id) {
            animation.future.cancel();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("now", &self.now)
            .field("focused", &self.focused)
            .field("drag", &self.drag)
            .field("press", &self.press)
            .field("modal", &self.modal)
            .field("animations", &self.animations.len())
            .field("deferred", &self.deferred.len())
            .field("reflow", &self.reflow)
            .field("redraw", &self.redraw)
            .finish()
    }
}

impl Ui {
    /// Run `f` on the next tick.
    pub fn defer(&mut self, f: impl FnOnce(&mut Ui) + 'static) {
        self.call_after(0.0, f);
    }

    /// Run `f` on the first tick at least `delay` seconds after the tick
    /// that first sees it.
    pub fn call_after(&mut self, delay: f64, f: impl FnOnce(&mut Ui) + 'static) {
        self.session.deferred.push(Deferred {
            due: None,
            delay,
            f: Box::new(f),
        });
    }

    /// Run the deferred callbacks that are due at `now`.
    ///
    /// Callbacks scheduled while running wait for the next call.
    pub fn run_deferred(&mut self, now: f64) -> usize {
        let pending = std::mem::take(&mut self.session.deferred);
        let mut due = Vec::new();
        for mut d in pending {
            let at = *d.due.get_or_insert(now + d.delay);
            if at <= now {
                due.push(d.f);
            } else {
                self.session.deferred.push(d);
            }
        }
        let count = due.len();
        for f in due {
            f(self);
        }
        count
    }
}
