//! Event dispatch through the widget tree.
//!
//! [`Ui::handle_event`] delivers one synthesized event:
//!
//! - Key presses go to the focused widget; an unhandled Tab moves focus.
//! - Pointer events walk the tree from `root`. Children are visited before
//!   their container, highest z first and in reverse insertion order within
//!   a z level. Every child sees the event even when a sibling already
//!   handled it; what it may do with it depends on [`Event::is_handled`].
//! - Around the walk, the drag-and-drop lifecycle, blur-on-click-away and
//!   the modal release are handled.

use trellis_core::logging::{span_names, targets};
use trellis_core::{PerfSpan, Value};

use super::events::{Event, EventType, Key};
use super::handlers::{HandlerKind, HandlerResult};
use super::session::{DragState, PressState};
use super::traits::DragStart;
use super::{Ui, WidgetId};

impl Ui {
    /// Deliver one event to the tree under `root`. Returns whether the
    /// pointer is over any widget of the tree (always `false` for key
    /// presses).
    pub fn handle_event(&mut self, root: WidgetId, event: &mut Event) -> bool {
        let _span = PerfSpan::new(span_names::DISPATCH);
        tracing::trace!(target: targets::EVENT, kind = ?event.kind, x = event.x, y = event.y, "dispatch");
        if event.kind == EventType::KeyPress {
            self.deliver_key(root, event);
            return false;
        }

        self.session.drop_claimed = false;
        self.session.focus_claimed = false;
        if event.kind == EventType::MouseMove {
            self.drag_motion(event);
        }

        let mouseover = self.dispatch(root, event, false);

        match event.kind {
            EventType::MouseDown => {
                if !self.session.focus_claimed
                    && let Some(focused) = self.session.focused
                {
                    self.blur(focused);
                }
                let inside_modal = self
                    .session
                    .modal
                    .iter()
                    .any(|m| self.base(*m).is_some_and(|b| b.is_mouseover()));
                if !self.session.modal.is_empty() && !inside_modal {
                    self.reset_modal();
                }
            }
            EventType::MouseUp => {
                self.finish_drag(event);
                self.session.press = None;
                self.session.drag.armed = None;
            }
            _ => {}
        }
        mouseover
    }

    /// Fire a long press for the held press once the delay elapsed.
    pub fn check_long_press(&mut self, now: f64) {
        let delay = self.session.config.long_press_delay;
        let Some(press) = self.session.press else {
            return;
        };
        if press.long_pressed || press.dragged || now - press.time < delay {
            return;
        }
        if let Some(p) = self.session.press.as_mut() {
            p.long_pressed = true;
        }
        let mut event = Event::new(EventType::MouseDown);
        event.button = press.button;
        event.time = now;
        event.simulated = true;
        tracing::trace!(target: targets::EVENT, widget = ?press.widget, "long press");
        self.fire(press.widget, HandlerKind::LongPress, &event, |w, cx, e| w.long_press(cx, e));
    }

    fn deliver_key(&mut self, root: WidgetId, event: &mut Event) {
        if let Some(focused) = self.session.focused
            && self.fire(focused, HandlerKind::KeyPress, event, |w, cx, e| w.key_press(cx, e))
        {
            event.set_handled(Some(focused));
        }
        if !event.is_handled() && event.key == Some(Key::Tab) {
            if event.modifiers.shift {
                self.focus_previous(root);
            } else {
                self.focus_next(root);
            }
            event.set_handled(None);
        }
    }

    /// Per-widget pass. Returns whether the pointer is over the widget or
    /// any of its descendants.
    fn dispatch(&mut self, id: WidgetId, event: &mut Event, listen: bool) -> bool {
        let Some(base) = self.base(id) else {
            return false;
        };
        if !base.is_visible() || !base.is_realized() {
            return false;
        }
        let listen = listen || self.session.modal.contains(&id);

        let mut over_child = false;
        for child in self.paint_order(id).into_iter().rev() {
            over_child |= self.dispatch(child, event, listen);
        }
        let over_self = self.handle_self(id, event, listen);
        let over = over_self || over_child;
        if let Some(node) = self.nodes.get_mut(id) {
            node.base.mouseover = over;
        }
        over
    }

    fn handle_self(&mut self, id: WidgetId, event: &mut Event, listen: bool) -> bool {
        let scale = self.session.config.scale;
        let blocked = !self.session.modal.is_empty() && !listen;
        let Some(base) = self.base(id) else {
            return false;
        };
        let over = !blocked && base.contains(event.x, event.y, scale);
        let disabled = base.is_disabled();
        let hovering = base.is_hovering();

        if !over {
            self.pointer_left(id, event);
            return false;
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.base.mouseover = true;
        }

        if event.kind == EventType::MouseMove {
            if event.is_handled() {
                if hovering {
                    self.leave(id, event);
                }
            } else {
                let hover = hovering
                    || self.fire(id, HandlerKind::MouseEnter, event, |w, cx, e| w.mouse_enter(cx, e));
                if let Some(node) = self.nodes.get_mut(id) {
                    node.base.hovering = hover;
                }
                if hover {
                    event.set_handled(Some(id));
                    if !hovering {
                        self.session.redraw = true;
                    }
                }
            }
            self.track_drop_target(id, event, true);
            return true;
        }

        if event.is_handled() || disabled {
            return true;
        }
        let handled = match event.kind {
            EventType::MouseDown => self.press(id, event),
            EventType::MouseUp => self.release(id, event),
            EventType::MouseWheel => self.fire(id, HandlerKind::MouseWheel, event, |w, cx, e| w.wheel(cx, e)),
            EventType::DropFile => self.fire(id, HandlerKind::DropFile, event, |w, cx, e| w.file_drop(cx, e)),
            EventType::MouseMove | EventType::KeyPress => false,
        };
        if handled {
            event.set_handled(Some(id));
        }
        true
    }

    fn press(&mut self, id: WidgetId, event: &Event) -> bool {
        let handled = self.fire(id, HandlerKind::MouseDown, event, |w, cx, e| w.mouse_down(cx, e));
        if self.base(id).is_some_and(|b| b.calc_bool("focusable")) {
            self.session.focus_claimed = true;
            self.focus(id);
        }
        if handled {
            self.session.press = Some(PressState {
                widget: id,
                time: event.time,
                button: event.button,
                long_pressed: false,
                dragged: false,
            });
            self.session.drag.armed = Some(id);
            self.session.drag.origin = (event.x, event.y);
        }
        handled
    }

    fn release(&mut self, id: WidgetId, event: &Event) -> bool {
        let mut handled = self.fire(id, HandlerKind::MouseUp, event, |w, cx, e| w.mouse_up(cx, e));
        let clicked = self
            .session
            .press
            .is_some_and(|p| p.widget == id && !p.long_pressed && !p.dragged);
        if !clicked {
            return handled;
        }
        handled |= self.fire(id, HandlerKind::Click, event, |w, cx, e| w.click(cx, e));

        let delay = self.session.config.double_click_delay;
        match self.session.last_click {
            Some((w, t)) if w == id && event.time - t <= delay => {
                self.session.last_click = None;
                handled |= self.fire(id, HandlerKind::DoubleClick, event, |w, cx, e| w.double_click(cx, e));
            }
            _ => self.session.last_click = Some((id, event.time)),
        }
        handled
    }

    fn pointer_left(&mut self, id: WidgetId, event: &Event) {
        let Some(base) = self.base(id) else {
            return;
        };
        let (was_over, was_hovering) = (base.is_mouseover(), base.is_hovering());
        if was_hovering {
            self.leave(id, event);
        }
        if was_over && let Some(node) = self.nodes.get_mut(id) {
            node.base.mouseover = false;
        }
        self.track_drop_target(id, event, false);
    }

    fn leave(&mut self, id: WidgetId, event: &Event) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.base.hovering = false;
        }
        self.session.redraw = true;
        self.fire(id, HandlerKind::MouseLeave, event, |w, cx, e| {
            w.mouse_leave(cx, e);
            true
        });
    }

    // =========================================================================
    // Drag and Drop
    // =========================================================================

    fn track_drop_target(&mut self, id: WidgetId, event: &Event, over: bool) {
        let drag = &self.session.drag;
        let Some(source) = drag.dragging else {
            return;
        };
        if !drag.droppable || source == id {
            return;
        }
        let arg = drag.arg.clone();
        let is_target = drag.dropping == Some(id);

        if !over || self.session.drop_claimed {
            if is_target {
                self.drop_leave(id, source, event, &arg);
            }
            return;
        }
        if is_target {
            self.session.drop_claimed = true;
            self.with_widget(id, |w, cx| w.drop_move(cx, event, source, &arg));
            return;
        }
        let accepted = self.fire(id, HandlerKind::DropFocus, event, |w, cx, e| w.drop_enter(cx, e, source, &arg));
        if accepted {
            self.session.drop_claimed = true;
            if let Some(previous) = self.session.drag.dropping.replace(id) {
                self.drop_leave(previous, source, event, &arg);
            }
            tracing::trace!(target: targets::EVENT, ?source, target = ?id, "drop target entered");
        }
    }

    fn drop_leave(&mut self, id: WidgetId, source: WidgetId, event: &Event, arg: &Value) {
        if self.session.drag.dropping == Some(id) {
            self.session.drag.dropping = None;
        }
        self.fire(id, HandlerKind::DropBlur, event, |w, cx, e| {
            w.drop_leave(cx, e, source, arg);
            true
        });
    }

    /// Start or continue a drag as the pointer moves with a button held.
    fn drag_motion(&mut self, event: &Event) {
        if let Some(source) = self.session.drag.dragging {
            self.fire(source, HandlerKind::DragMove, event, |w, cx, e| {
                w.drag_move(cx, e);
                true
            });
            return;
        }
        let Some(armed) = self.session.drag.armed else {
            return;
        };
        if event.buttons.is_empty() {
            return;
        }
        let (ox, oy) = self.session.drag.origin;
        let threshold = self.session.config.drag_threshold * self.session.config.scale;
        if (event.x - ox).hypot(event.y - oy) < threshold {
            return;
        }

        let start = match self.call_handler(armed, HandlerKind::DragStart, event) {
            HandlerResult::Suppressed => None,
            result => self
                .with_widget(armed, |w, cx| w.drag_start(cx, event))
                .flatten()
                .or_else(|| (result == HandlerResult::Handled).then(DragStart::default)),
        };
        // Only one drag attempt per press.
        self.session.drag.armed = None;
        let Some(start) = start else {
            return;
        };
        tracing::debug!(target: targets::EVENT, source = ?armed, droppable = start.droppable, "drag started");
        self.session.drag = DragState {
            armed: None,
            origin: self.session.drag.origin,
            dragging: Some(armed),
            droppable: start.droppable,
            dropping: None,
            arg: start.arg,
        };
        if let Some(press) = self.session.press.as_mut() {
            press.dragged = true;
        }
    }

    fn finish_drag(&mut self, event: &Event) {
        let drag = std::mem::take(&mut self.session.drag);
        let Some(source) = drag.dragging else {
            return;
        };
        let mut target = None;
        if let Some(dropping) = drag.dropping
            && self.fire(dropping, HandlerKind::Drop, event, |w, cx, e| {
                w.drop_accept(cx, e, source, &drag.arg)
            })
        {
            target = Some(dropping);
        }
        tracing::debug!(target: targets::EVENT, ?source, ?target, "drag ended");
        self.fire(source, HandlerKind::DragEnd, event, |w, cx, e| {
            w.drag_end(cx, e, target);
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::UiConfig;
    use crate::widget::events::MouseButtons;
    use crate::widget::reflow::Offer;
    use crate::widget::widgets::{Button, Cell, Container, Spacer};
    use trellis_core::AttrMap;

    fn spacer(ui: &mut Ui, x: f64, w: f64) -> WidgetId {
        let mut attrs = AttrMap::new();
        attrs.insert("x".into(), Value::from(x));
        attrs.insert("w".into(), Value::from(w));
        attrs.insert("h".into(), Value::from(20));
        ui.spawn(Spacer, attrs).unwrap()
    }

    fn layout(ui: &mut Ui, root: WidgetId) {
        ui.reflow(root, Some(Offer::new(200.0, 200.0))).unwrap();
        ui.realize_geometry(root);
    }

    fn event(kind: EventType, x: f64, y: f64, time: f64) -> Event {
        let mut e = Event::new(kind);
        e.x = x;
        e.y = y;
        e.time = time;
        if matches!(kind, EventType::MouseDown | EventType::MouseUp) {
            e.button = MouseButtons::LEFT;
        }
        if kind == EventType::MouseDown {
            e.buttons = MouseButtons::LEFT;
        }
        e
    }

    fn click(ui: &mut Ui, root: WidgetId, x: f64, y: f64, time: f64) {
        ui.handle_event(root, &mut event(EventType::MouseDown, x, y, time));
        ui.handle_event(root, &mut event(EventType::MouseUp, x, y, time));
    }

    fn counter(ui: &mut Ui, id: WidgetId, kind: HandlerKind) -> Rc<RefCell<u32>> {
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        ui.on(id, kind, move |_, _| {
            *h.borrow_mut() += 1;
            HandlerResult::Handled
        })
        .unwrap();
        hits
    }

    #[test]
    fn test_topmost_child_handles_first() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let below = spacer(&mut ui, 0.0, 50.0);
        let above = spacer(&mut ui, 0.0, 50.0);
        ui.add(root, below, Cell::new()).unwrap();
        ui.add(root, above, Cell::new()).unwrap();
        layout(&mut ui, root);
        let below_hits = counter(&mut ui, below, HandlerKind::Click);
        let above_hits = counter(&mut ui, above, HandlerKind::Click);

        click(&mut ui, root, 10.0, 10.0, 0.0);
        assert_eq!((*below_hits.borrow(), *above_hits.borrow()), (0, 1));

        ui.attr(below, "z", 1).unwrap();
        click(&mut ui, root, 10.0, 10.0, 5.0);
        assert_eq!((*below_hits.borrow(), *above_hits.borrow()), (1, 1));
    }

    #[test]
    fn test_suppressed_mousedown_skips_default() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let button = ui.spawn(Button::new(), AttrMap::new()).unwrap();
        ui.add(root, button, Cell::new()).unwrap();
        layout(&mut ui, root);
        ui.on(button, HandlerKind::MouseDown, |_, _| HandlerResult::Suppressed).unwrap();
        let clicks = counter(&mut ui, button, HandlerKind::Click);

        click(&mut ui, root, 2.0, 2.0, 0.0);
        assert_eq!(*clicks.borrow(), 0);
        assert!(ui.session().press().is_none());
    }

    #[test]
    fn test_double_click_within_delay() {
        let mut ui = Ui::new(UiConfig::default().with_double_click_delay(0.4));
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let s = spacer(&mut ui, 0.0, 50.0);
        ui.add(root, s, Cell::new()).unwrap();
        layout(&mut ui, root);
        let clicks = counter(&mut ui, s, HandlerKind::Click);
        let doubles = counter(&mut ui, s, HandlerKind::DoubleClick);

        click(&mut ui, root, 5.0, 5.0, 0.0);
        click(&mut ui, root, 5.0, 5.0, 0.3);
        click(&mut ui, root, 5.0, 5.0, 1.0);
        assert_eq!(*clicks.borrow(), 3);
        assert_eq!(*doubles.borrow(), 1);
    }

    #[test]
    fn test_long_press_suppresses_click() {
        let mut ui = Ui::new(UiConfig::default().with_long_press_delay(0.5));
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let s = spacer(&mut ui, 0.0, 50.0);
        ui.add(root, s, Cell::new()).unwrap();
        layout(&mut ui, root);
        let clicks = counter(&mut ui, s, HandlerKind::Click);
        let long = counter(&mut ui, s, HandlerKind::LongPress);

        ui.handle_event(root, &mut event(EventType::MouseDown, 5.0, 5.0, 0.0));
        ui.check_long_press(0.2);
        assert_eq!(*long.borrow(), 0);
        ui.check_long_press(0.6);
        ui.check_long_press(0.9);
        assert_eq!(*long.borrow(), 1);
        ui.handle_event(root, &mut event(EventType::MouseUp, 5.0, 5.0, 1.0));
        assert_eq!(*clicks.borrow(), 0);
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let button = ui.spawn(Button::new(), AttrMap::new()).unwrap();
        ui.add(root, button, Cell::new()).unwrap();
        layout(&mut ui, root);
        let leaves = counter(&mut ui, button, HandlerKind::MouseLeave);

        assert!(ui.handle_event(root, &mut event(EventType::MouseMove, 2.0, 2.0, 0.0)));
        assert!(ui.base(button).unwrap().is_hovering());
        assert!(!ui.handle_event(root, &mut event(EventType::MouseMove, 500.0, 500.0, 0.1)));
        assert!(!ui.base(button).unwrap().is_hovering());
        assert!(!ui.base(button).unwrap().is_mouseover());
        assert_eq!(*leaves.borrow(), 1);
    }

    #[test]
    fn test_modal_blocks_other_widgets() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let outside = spacer(&mut ui, 0.0, 50.0);
        let dialog = spacer(&mut ui, 100.0, 50.0);
        ui.add(root, outside, Cell::new()).unwrap();
        ui.add(root, dialog, Cell::new()).unwrap();
        layout(&mut ui, root);
        let outside_hits = counter(&mut ui, outside, HandlerKind::Click);
        let dialog_hits = counter(&mut ui, dialog, HandlerKind::Click);
        ui.set_modal(&[dialog]);

        click(&mut ui, root, 110.0, 5.0, 0.0);
        assert_eq!(*dialog_hits.borrow(), 1);
        assert!(ui.is_modal(dialog));

        click(&mut ui, root, 5.0, 5.0, 2.0);
        assert_eq!(*outside_hits.borrow(), 0);
        assert!(!ui.is_modal(dialog));

        click(&mut ui, root, 5.0, 5.0, 4.0);
        assert_eq!(*outside_hits.borrow(), 1);
    }

    #[test]
    fn test_click_on_overflowing_child_keeps_modal() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let mut attrs = AttrMap::new();
        attrs.insert("w".into(), Value::from(50));
        attrs.insert("h".into(), Value::from(20));
        let dialog = ui.spawn(Container, attrs).unwrap();
        let wide = spacer(&mut ui, 0.0, 100.0);
        ui.add(dialog, wide, Cell::new()).unwrap();
        ui.add(root, dialog, Cell::new()).unwrap();
        layout(&mut ui, root);
        assert_eq!(ui.base(wide).unwrap().geometry().w, 100.0);
        ui.set_modal(&[dialog]);

        ui.handle_event(root, &mut event(EventType::MouseDown, 80.0, 5.0, 0.0));
        assert!(ui.base(dialog).unwrap().is_mouseover());
        assert!(ui.is_modal(dialog));

        ui.handle_event(root, &mut event(EventType::MouseDown, 150.0, 5.0, 1.0));
        assert!(!ui.base(dialog).unwrap().is_mouseover());
        assert!(!ui.is_modal(dialog));
    }

    #[test]
    fn test_click_away_blurs() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let button = ui.spawn(Button::new(), AttrMap::new()).unwrap();
        ui.add(root, button, Cell::new()).unwrap();
        layout(&mut ui, root);

        click(&mut ui, root, 2.0, 2.0, 0.0);
        assert_eq!(ui.focused(), Some(button));
        click(&mut ui, root, 190.0, 190.0, 1.0);
        assert_eq!(ui.focused(), None);
    }

    #[test]
    fn test_drag_and_drop() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let source = spacer(&mut ui, 0.0, 50.0);
        let target = spacer(&mut ui, 100.0, 50.0);
        ui.add(root, source, Cell::new()).unwrap();
        ui.add(root, target, Cell::new()).unwrap();
        layout(&mut ui, root);

        ui.on(source, HandlerKind::MouseDown, |_, _| HandlerResult::Handled).unwrap();
        ui.on(source, HandlerKind::DragStart, |_, _| HandlerResult::Handled).unwrap();
        let ends = counter(&mut ui, source, HandlerKind::DragEnd);
        let drops = counter(&mut ui, target, HandlerKind::Drop);
        ui.on(target, HandlerKind::DropFocus, |_, _| HandlerResult::Handled).unwrap();
        let clicks = counter(&mut ui, source, HandlerKind::Click);

        ui.handle_event(root, &mut event(EventType::MouseDown, 5.0, 5.0, 0.0));
        let mut mv = event(EventType::MouseMove, 6.0, 5.0, 0.1);
        mv.buttons = MouseButtons::LEFT;
        ui.handle_event(root, &mut mv);
        assert!(!ui.session().drag().is_dragging());

        // Droppability comes from the kind; a bare handler makes a plain drag.
        let mut mv = event(EventType::MouseMove, 110.0, 5.0, 0.2);
        mv.buttons = MouseButtons::LEFT;
        ui.handle_event(root, &mut mv);
        assert_eq!(ui.session().drag().dragging, Some(source));
        assert_eq!(ui.session().drag().dropping, None);

        ui.handle_event(root, &mut event(EventType::MouseUp, 110.0, 5.0, 0.3));
        assert_eq!(*ends.borrow(), 1);
        assert_eq!(*drops.borrow(), 0);
        assert_eq!(*clicks.borrow(), 0);
        assert!(!ui.session().drag().is_dragging());
    }

    #[test]
    fn test_tab_moves_focus() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let a = ui.spawn(Button::new(), AttrMap::new()).unwrap();
        let b = ui.spawn(Button::new(), AttrMap::new()).unwrap();
        ui.add(root, a, Cell::new()).unwrap();
        ui.add(root, b, Cell::new()).unwrap();
        ui.focus(a);
        let mut tab = Event::new(EventType::KeyPress);
        tab.key = Some(Key::Tab);
        ui.handle_event(root, &mut tab);
        assert_eq!(ui.focused(), Some(b));
    }
}
