//! Keyboard focus.
//!
//! At most one widget holds focus per session. Only visible, enabled
//! widgets with `focusable` set can take it, and the widget itself (through
//! its `Focus` handler or [`Widget::focus_in`](super::Widget::focus_in)) may
//! still refuse.

use trellis_core::logging::targets;

use super::events::{Event, EventType};
use super::handlers::HandlerKind;
use super::{Ui, WidgetId};

impl Ui {
    /// Give keyboard focus to a widget. Returns whether it holds focus
    /// afterwards. The previously focused widget is blurred once the new
    /// one accepted.
    pub fn focus(&mut self, id: WidgetId) -> bool {
        if self.session.focused == Some(id) {
            return true;
        }
        let Some(base) = self.base(id) else {
            return false;
        };
        if !base.calc_bool("focusable") || !base.is_visible() || base.is_disabled() {
            return false;
        }

        let event = self.focus_event();
        let accepted = self.fire(id, HandlerKind::Focus, &event, |w, cx, _| w.focus_in(cx));
        if !accepted || !self.contains(id) {
            tracing::trace!(target: targets::EVENT, ?id, "focus refused");
            return false;
        }
        let previous = self.session.focused.replace(id);
        if let Some(previous) = previous {
            self.blur_widget(previous, &event);
        }
        self.session.redraw = true;
        tracing::trace!(target: targets::EVENT, ?id, ?previous, "focus changed");
        true
    }

    /// Take focus away from a widget. Returns whether it had focus.
    pub fn blur(&mut self, id: WidgetId) -> bool {
        if self.session.focused != Some(id) {
            return false;
        }
        self.session.focused = None;
        let event = self.focus_event();
        self.blur_widget(id, &event);
        self.session.redraw = true;
        true
    }

    /// The focused widget.
    pub fn focused(&self) -> Option<WidgetId> {
        self.session.focused
    }

    /// Move focus to the next focusable widget under `root`, in tree order,
    /// wrapping around.
    pub fn focus_next(&mut self, root: WidgetId) -> Option<WidgetId> {
        self.cycle_focus(root, false)
    }

    /// Move focus to the previous focusable widget under `root`.
    pub fn focus_previous(&mut self, root: WidgetId) -> Option<WidgetId> {
        self.cycle_focus(root, true)
    }

    fn cycle_focus(&mut self, root: WidgetId, backwards: bool) -> Option<WidgetId> {
        let mut order = self.focus_chain(root);
        if backwards {
            order.reverse();
        }
        let start = self
            .session
            .focused
            .and_then(|f| order.iter().position(|w| *w == f))
            .map(|i| i + 1)
            .unwrap_or(0);
        let len = order.len();
        (0..len)
            .map(|i| order[(start + i) % len])
            .find(|w| self.focus(*w))
    }

    /// Focusable widgets under `root`, in preorder.
    fn focus_chain(&self, root: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(base) = self.base(id) else {
                continue;
            };
            if !base.is_visible() {
                continue;
            }
            if base.calc_bool("focusable") && !base.is_disabled() {
                out.push(id);
            }
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    fn blur_widget(&mut self, id: WidgetId, event: &Event) {
        self.fire(id, HandlerKind::Blur, event, |w, cx, _| {
            w.focus_out(cx);
            true
        });
    }

    fn focus_event(&self) -> Event {
        let mut event = Event::new(EventType::KeyPress);
        event.time = self.session.now;
        event.simulated = true;
        event
    }
}
