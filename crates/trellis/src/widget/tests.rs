//! Cross-module tests for the widget system.
//!
//! These drive whole trees (most of them through a [`Window`] tick) and
//! check properties that span attributes, layout, dispatch and painting.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use trellis_core::{Assign, AttrMap, AttributeSpec, AttributeTable, Value};

use crate::config::UiConfig;
use crate::widget::animation::AnimationSpec;
use crate::widget::attributes::WIDGET_ATTRS;
use crate::widget::base::Align;
use crate::widget::events::{InputState, Key, Modifiers, MouseButtons};
use crate::widget::handlers::{HandlerKind, HandlerResult};
use crate::widget::painting::{DrawOp, RecordingCanvas};
use crate::widget::traits::Widget;
use crate::widget::reflow::Offer;
use crate::widget::widgets::{Button, Cell, Container, Entry, Slider, Spacer};
use crate::widget::{AttrOptions, Ui, WidgetId};
use crate::window::Window;

fn attrs(pairs: &[(&str, Value)]) -> AttrMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn window(w: f64, h: f64) -> Window {
    crate::test_logging::init();
    Window::with_attrs(
        UiConfig::default(),
        attrs(&[("w", Value::from(w)), ("h", Value::from(h))]),
    )
    .unwrap()
}

/// Record, in order, which widgets saw a mouse down without claiming it.
fn record_presses(ui: &mut Ui, ids: &[WidgetId]) -> Rc<RefCell<Vec<WidgetId>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for id in ids {
        let seen = seen.clone();
        ui.on(*id, HandlerKind::MouseDown, move |cx, _| {
            seen.borrow_mut().push(cx.id);
            HandlerResult::Suppressed
        })
        .unwrap();
    }
    seen
}

#[test]
fn test_reflow_sizes_stay_within_limits() {
    let mut ui = Ui::new(UiConfig::default());
    let cases: &[(f64, Option<f64>, Option<f64>)] = &[
        (50.0, Some(60.0), None),
        (500.0, None, Some(100.0)),
        (-500.0, None, None),
        (150.0, None, Some(0.25)),
        (30.0, Some(40.0), Some(80.0)),
        (0.5, Some(0.1), Some(0.2)),
    ];
    for &(w, minw, maxw) in cases {
        let mut map = attrs(&[("w", Value::from(w)), ("h", Value::from(w))]);
        if let Some(min) = minw {
            map.insert("minw".into(), Value::from(min));
            map.insert("minh".into(), Value::from(min));
        }
        if let Some(max) = maxw {
            map.insert("maxw".into(), Value::from(max));
            map.insert("maxh".into(), Value::from(max));
        }
        let id = ui.spawn(Spacer, map).unwrap();
        let offer = Offer::new(200.0, 200.0).clamp(true, true);
        let r = ui.reflow(id, Some(offer)).unwrap();

        let resolve = |v: f64| if v > 0.0 && v <= 1.0 { v * 200.0 } else { v };
        for size in [r.w, r.h] {
            assert!(size >= 0.0, "negative size for w={w}");
            if let Some(min) = minw {
                assert!(size >= resolve(min), "w={w}: {size} below min");
            }
            if let Some(max) = maxw {
                assert!(size <= resolve(max), "w={w}: {size} above max");
            }
            assert!(minw.is_some() || size <= 200.0);
        }
    }
}

#[test]
fn test_assigning_current_value_is_a_no_op() {
    let mut ui = Ui::new(UiConfig::default());
    let id = ui.spawn(Spacer, attrs(&[("w", Value::from(40))])).unwrap();
    let changes = Rc::new(RefCell::new(0));
    let counted = changes.clone();
    ui.on_attr(id, move |_, _| {
        *counted.borrow_mut() += 1;
        HandlerResult::NotHandled
    })
    .unwrap();
    ui.session.reflow.clear();

    ui.attr(id, "w", 40).unwrap();
    assert_eq!(ui.calc(id, "w"), Some(Value::Number(40.0)));
    assert_eq!(*changes.borrow(), 0);
    assert!(!ui.session().reflow_queue().is_pending());

    ui.attr_with(id, "w", 40, AttrOptions::trigger()).unwrap();
    assert_eq!(*changes.borrow(), 1);
    assert!(ui.session().reflow_queue().is_pending());
}

#[test]
fn test_padding_round_trip() {
    let mut ui = Ui::new(UiConfig::default());
    let id = ui.spawn(Spacer, AttrMap::new()).unwrap();
    ui.attr(id, "padding", [5, 10, 15, 20]).unwrap();
    for (side, expected) in [("tpadding", 5.0), ("rpadding", 10.0), ("bpadding", 15.0), ("lpadding", 20.0)] {
        assert_eq!(ui.calc(id, side), Some(Value::Number(expected)));
    }
    assert_eq!(ui.get(id, "padding"), Some(Value::from([5, 10, 15, 20])));

    ui.attr(id, "lpadding", 1).unwrap();
    assert_eq!(ui.get(id, "padding"), Some(Value::from([5, 10, 15, 1])));
}

#[test]
fn test_default_restores_padding_and_sides() {
    let mut ui = Ui::new(UiConfig::default());
    let id = ui.spawn(Spacer, AttrMap::new()).unwrap();
    ui.attr(id, "padding", [5, 10, 15, 20]).unwrap();
    ui.session.reflow.clear();

    ui.attr(id, "padding", Assign::Default).unwrap();
    assert_eq!(ui.get(id, "padding"), Some(Value::from([0, 0, 0, 0])));
    for side in ["tpadding", "rpadding", "bpadding", "lpadding"] {
        assert_eq!(ui.calc(id, side), Some(Value::Number(0.0)));
    }
    assert!(ui.session().reflow_queue().is_pending());
}

/// A label defaulting to the widget's width, e.g. `"40px"`.
fn width_label(exterior: &AttrMap, _name: &str) -> Value {
    let w = exterior.get("w").and_then(Value::as_f64).unwrap_or(0.0);
    Value::from(format!("{w}px"))
}

static BADGE_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    AttributeTable::derive(&WIDGET_ATTRS, "Badge", vec![("label", AttributeSpec::new().factory(width_label))]).unwrap()
});

struct Badge;

impl Widget for Badge {
    fn attributes(&self) -> &'static AttributeTable {
        &BADGE_ATTRS
    }
}

#[test]
fn test_default_reruns_factory() {
    let mut ui = Ui::new(UiConfig::default());
    let id = ui.spawn(Badge, attrs(&[("w", Value::from(40))])).unwrap();
    assert_eq!(ui.get(id, "label"), Some(Value::from("40px")));

    ui.attr(id, "label", "custom").unwrap();
    ui.attr(id, "w", 60).unwrap();
    assert_eq!(ui.get(id, "label"), Some(Value::from("custom")));

    ui.attr(id, "label", Assign::Default).unwrap();
    assert_eq!(ui.get(id, "label"), Some(Value::from("60px")));
    assert_eq!(ui.calc(id, "label"), Some(Value::from("60px")));
}

#[test]
fn test_equal_z_siblings_draw_and_dispatch_in_opposite_orders() {
    let mut window = window(200.0, 200.0);
    let ui = window.ui_mut();
    let size = [("w", Value::from(50)), ("h", Value::from(50))];
    let a = ui.spawn(Spacer, attrs(&size)).unwrap();
    let b = ui.spawn(Spacer, attrs(&size)).unwrap();
    let seen = record_presses(ui, &[a, b]);
    window.add(a, Cell::new()).unwrap();
    window.add(b, Cell::new()).unwrap();

    let mut canvas = RecordingCanvas::new();
    let at = InputState::at(10.0, 10.0);
    window.update(0.0, &at, &mut canvas);
    let painted = canvas.widget_order();
    window.update(0.1, &at.clone().with_buttons(MouseButtons::LEFT), &mut canvas);

    assert_eq!(painted, vec![window.root(), a, b]);
    assert_eq!(*seen.borrow(), vec![b, a]);
}

#[test]
fn test_raised_sibling_is_on_top_for_both() {
    let mut window = window(200.0, 200.0);
    let ui = window.ui_mut();
    let size = [("w", Value::from(50)), ("h", Value::from(50))];
    let a = ui.spawn(Spacer, attrs(&size)).unwrap();
    let b = ui.spawn(Spacer, attrs(&size)).unwrap();
    let seen = record_presses(ui, &[a, b]);
    window.add(a, Cell::new()).unwrap();
    window.add(b, Cell::new()).unwrap();
    window.ui_mut().attr(a, "z", 1).unwrap();

    let mut canvas = RecordingCanvas::new();
    let at = InputState::at(10.0, 10.0);
    window.update(0.0, &at, &mut canvas);
    let painted = canvas.widget_order();
    window.update(0.1, &at.clone().with_buttons(MouseButtons::LEFT), &mut canvas);

    assert_eq!(painted, vec![window.root(), b, a]);
    assert_eq!(*seen.borrow(), vec![a, b]);
}

#[test]
fn test_repeated_animation_returns_original_future() {
    let mut ui = Ui::new(UiConfig::default());
    let id = ui.spawn(Spacer, AttrMap::new()).unwrap();
    let first = ui.animate(id, AnimationSpec::new("alpha", 0.5)).unwrap();
    ui.advance_animations(0.0);
    ui.advance_animations(0.05);
    let second = ui.animate(id, AnimationSpec::new("alpha", 0.5)).unwrap();
    assert!(first.same_as(&second));
    assert_eq!(ui.session().animations().len(), 1);
    assert!(!first.is_cancelled());
}

#[test]
fn test_centering_follows_insertion_order() {
    fn layout(spacer_first: bool) -> (f64, f64) {
        let mut ui = Ui::new(UiConfig::default());
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        let spacer = ui
            .spawn(Spacer, attrs(&[("w", Value::from(0.5)), ("h", Value::from(0.5))]))
            .unwrap();
        let button = ui.spawn(Button::new(), attrs(&[("label", Value::from("OK"))])).unwrap();
        let centered = Cell::new().halign(Align::Center).valign(Align::Center);
        if spacer_first {
            ui.add(c, spacer, Cell::new()).unwrap();
            ui.add(c, button, centered).unwrap();
        } else {
            ui.add(c, button, centered).unwrap();
            ui.add(c, spacer, Cell::new()).unwrap();
        }
        ui.reflow(c, Some(Offer::new(400.0, 300.0))).unwrap();
        let g = ui.base(button).unwrap().geometry();
        (g.x, g.y)
    }

    // The button is 34x24; the spacer establishes 200x150 when added first.
    assert_eq!(layout(true), ((200.0 - 34.0) / 2.0, (150.0 - 24.0) / 2.0));
    assert_eq!(layout(false), (0.0, 0.0));
}

#[test]
fn test_entry_editing_through_window() {
    let mut window = window(300.0, 100.0);
    let ui = window.ui_mut();
    let entry = ui
        .spawn(Entry::new(), attrs(&[("value", Value::from("hello")), ("caret", Value::from(3))]))
        .unwrap();
    assert!(ui.focus(entry));
    window.add(entry, Cell::new()).unwrap();

    let mut canvas = RecordingCanvas::new();
    window.update(0.0, &InputState::default(), &mut canvas);
    window.update(0.1, &InputState::default().with_key(Key::Backspace, Modifiers::NONE), &mut canvas);
    assert_eq!(window.ui().calc(entry, "value"), Some(Value::from("hllo")));
    assert_eq!(window.ui().calc(entry, "caret"), Some(Value::Number(2.0)));

    let ui = window.ui_mut();
    ui.attr(entry, "value", "hello world").unwrap();
    ui.attr(entry, "caret", Value::Nil).unwrap();
    window.update(0.2, &InputState::default().with_key(Key::Backspace, Modifiers::CTRL), &mut canvas);
    assert_eq!(window.ui().calc(entry, "value"), Some(Value::from("hello ")));
    assert_eq!(window.ui().calc(entry, "caret"), Some(Value::Number(7.0)));

    window.update(0.3, &InputState::default(), &mut canvas);
    assert!(canvas.texts().contains(&"hello "));
}

#[test]
fn test_slider_drag_past_neighbor_hands_over_thumb() {
    let mut window = window(300.0, 100.0);
    let ui = window.ui_mut();
    let slider = ui
        .spawn(
            Slider::new(),
            attrs(&[
                ("value", Value::from([25, 75])),
                ("step", Value::from(1)),
                ("w", Value::from(220)),
                ("thumbsize", Value::from(20)),
            ]),
        )
        .unwrap();
    window.add(slider, Cell::new()).unwrap();

    // Thumb centers run from x=10 to x=210: 2px per unit.
    let mut canvas = RecordingCanvas::new();
    let held = MouseButtons::LEFT;
    window.update(0.0, &InputState::at(60.0, 10.0), &mut canvas);
    window.update(0.1, &InputState::at(60.0, 10.0).with_buttons(held), &mut canvas);
    assert_eq!(window.ui().widget::<Slider>(slider).unwrap().active(), 0);

    window.update(0.2, &InputState::at(190.0, 10.0).with_buttons(held), &mut canvas);
    window.update(0.3, &InputState::at(190.0, 11.0).with_buttons(held), &mut canvas);
    assert_eq!(window.ui().calc(slider, "value"), Some(Value::from([75, 90])));
    assert_eq!(window.ui().widget::<Slider>(slider).unwrap().active(), 1);

    window.update(0.4, &InputState::at(190.0, 11.0), &mut canvas);
    assert_eq!(window.ui().get(slider, "value"), Some(Value::from([75, 90])));
    assert!(!window.ui().session().drag().is_dragging());

    let thumbs = canvas
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Circle(..)))
        .count();
    assert!(thumbs >= 2);
}
