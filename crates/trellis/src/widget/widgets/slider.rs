//! Slider widget implementation.
//!
//! [`Slider`] picks one or more values from `[min, max]` by dragging thumbs
//! along a horizontal track.
//!
//! The `value` attribute is a number for a single thumb or a list for
//! several. Its calculated form is always a sorted list, snapped to `step`
//! and clamped to the range; reading it back yields a plain number while
//! there is only one thumb.
//!
//! Thumbs never pass each other: when the active thumb is pushed beyond a
//! neighbor, the two values swap and the neighbor becomes the active thumb.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let range = ui.spawn(Slider::new(), attrs! { "value" => [80, 20], "step" => 5 }).unwrap();
//! assert_eq!(ui.calc(range, "value"), Some(Value::from([20, 80])));
//!
//! let volume = ui.spawn(Slider::new(), attrs! { "value" => 42 }).unwrap();
//! assert_eq!(ui.get(volume, "value"), Some(Value::Number(42.0)));
//! ```

use std::sync::LazyLock;

use trellis_core::attribute::Reflow;
use trellis_core::logging::targets;
use trellis_core::{
    AttrMap, AttributeError, AttributeResult, AttributeSpec, AttributeTable, Color, Value, ValueType,
};

use crate::widget::animation::AnimationSpec;
use crate::widget::attributes::{boolean, build_table, color_transform, number, WIDGET_ATTRS};
use crate::widget::base::WidgetBase;
use crate::widget::context::WidgetCx;
use crate::widget::events::{Event, Key};
use crate::widget::handlers::{AttrChange, AttrOrigin};
use crate::widget::painting::FontMetrics;
use crate::widget::traits::{DragStart, PaintContext, Widget};

/// Seconds the hover effect takes.
const HOVER_DURATION: f64 = 0.15;
/// Thumb growth while hovered.
const HOVER_GROWTH: f64 = 1.5;
/// Most tick marks drawn; finer steps are drawn only up to this count.
const MAX_TICKS: usize = 200;

fn finite(calc: &AttrMap, name: &str) -> Option<f64> {
    calc.get(name).and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// `(min, max)`, ordered.
fn bounds(calc: &AttrMap) -> (f64, f64) {
    let min = finite(calc, "min").unwrap_or(0.0);
    let max = finite(calc, "max").unwrap_or(100.0);
    if max < min { (max, min) } else { (min, max) }
}

fn snap(v: f64, (min, max): (f64, f64), step: Option<f64>) -> f64 {
    let v = match step {
        Some(step) if step > 0.0 => {
            let snapped = min + ((v - min) / step).round() * step;
            if snapped > max { snapped - step } else { snapped }
        }
        _ => v,
    };
    v.clamp(min, max)
}

fn normalize_values(calc: &AttrMap, value: &Value) -> AttributeResult<Value> {
    let range = bounds(calc);
    let step = finite(calc, "step");
    let number = |v: &Value| {
        v.clone()
            .coerce(ValueType::Number)
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| AttributeError::invalid("value", format!("`{v}` is not a number")))
    };
    let mut values = match value {
        Value::Nil => vec![range.0],
        Value::List(items) if !items.is_empty() => items.iter().map(number).collect::<AttributeResult<Vec<_>>>()?,
        Value::List(_) => vec![range.0],
        other => vec![number(other)?],
    };
    for v in &mut values {
        *v = snap(*v, range, step);
    }
    values.sort_by(f64::total_cmp);
    Ok(Value::List(values.into_iter().map(Value::Number).collect()))
}

/// Read `value` as a number while there is a single thumb.
fn value_getter(exterior: &AttrMap, calc: &AttrMap, name: &str) -> Value {
    match calc.get(name).and_then(Value::as_list) {
        Some([single]) => single.clone(),
        Some(values) => Value::List(values.to_vec()),
        None => exterior.get(name).cloned().unwrap_or_default(),
    }
}

/// Attributes of sliders.
pub static SLIDER_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    build_table(
        Some(&WIDGET_ATTRS),
        "Slider",
        vec![
            (
                "value",
                AttributeSpec::new()
                    .default_value(Value::Nil)
                    .derive(normalize_values)
                    .priority()
                    .getter(value_getter)
                    .reflow(Reflow::None),
            ),
            ("min", number().default_value(0).reflow(Reflow::None)),
            ("max", number().default_value(100).reflow(Reflow::None)),
            ("step", number().reflow(Reflow::None)),
            ("ticks", boolean().default_value(false).reflow(Reflow::None)),
            (
                "color",
                AttributeSpec::new().default_value("#3a7bd5").shorthand(color_transform).reflow(Reflow::None),
            ),
            (
                "trackcolor",
                AttributeSpec::new().default_value("#cccccc").shorthand(color_transform).reflow(Reflow::None),
            ),
            ("thumbsize", number().default_value(14).reflow(Reflow::Full)),
            ("thumbradius", number().reflow(Reflow::None)),
            ("tickalpha", number().default_value(0).reflow(Reflow::None)),
            ("focusable", AttributeSpec::new().default_value(true)),
        ],
    )
});

/// A slider with one or more thumbs.
#[derive(Debug, Clone, Default)]
pub struct Slider {
    active: usize,
}

impl Slider {
    /// A slider whose first thumb is active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the thumb that keyboard, wheel and drag input moves.
    pub fn active(&self) -> usize {
        self.active
    }

    fn values(cx: &WidgetCx<'_>) -> Vec<f64> {
        cx.calc("value")
            .and_then(|v| v.as_list().map(|l| l.iter().filter_map(Value::as_f64).collect()))
            .unwrap_or_default()
    }

    /// Track extent in window coordinates: first and last thumb centers.
    fn track(base: &WidgetBase, scale: f64) -> (f64, f64) {
        let (x, _) = base.client_pos();
        let insets = base.insets(scale);
        let half = base.calc_f64("thumbsize").unwrap_or(14.0) * scale / 2.0;
        let x0 = x + insets.left + half;
        let x1 = (x + base.geometry().w - insets.right - half).max(x0);
        (x0, x1)
    }

    fn value_at(cx: &WidgetCx<'_>, x: f64) -> f64 {
        let Some(base) = cx.base() else {
            return 0.0;
        };
        let (min, max) = bounds(base.calculated());
        let (x0, x1) = Self::track(base, cx.scale());
        if x1 <= x0 {
            return min;
        }
        min + ((x - x0) / (x1 - x0)).clamp(0.0, 1.0) * (max - min)
    }

    /// Keyboard and wheel increment: `step`, or 1% of the range.
    fn increment(cx: &WidgetCx<'_>) -> f64 {
        let Some(base) = cx.base() else {
            return 1.0;
        };
        match finite(base.calculated(), "step") {
            Some(step) if step > 0.0 => step,
            _ => {
                let (min, max) = bounds(base.calculated());
                (max - min) / 100.0
            }
        }
    }

    /// Move the active thumb to `v`, handing the active index over when it
    /// crosses a neighbor.
    fn set_active_value(&mut self, cx: &mut WidgetCx<'_>, v: f64) {
        let Some(base) = cx.base() else {
            return;
        };
        let range = bounds(base.calculated());
        let v = snap(v, range, finite(base.calculated(), "step"));
        let mut values = Self::values(cx);
        if values.is_empty() {
            return;
        }
        let mut i = self.active.min(values.len() - 1);
        values[i] = v;
        while i > 0 && values[i] < values[i - 1] {
            values.swap(i, i - 1);
            i -= 1;
        }
        while i + 1 < values.len() && values[i] > values[i + 1] {
            values.swap(i, i + 1);
            i += 1;
        }
        if i != self.active {
            tracing::trace!(target: targets::EVENT, id = ?cx.id, from = self.active, to = i, "slider thumbs crossed");
        }
        self.active = i;

        let value = match values.as_slice() {
            [single] => Value::Number(*single),
            _ => Value::List(values.into_iter().map(Value::Number).collect()),
        };
        if let Err(err) = cx.ui.sync(cx.id, "value", value, None) {
            tracing::warn!(target: targets::ATTRIBUTE, id = ?cx.id, %err, "slider update rejected");
        }
        cx.queue_draw();
    }

    fn nudge(&mut self, cx: &mut WidgetCx<'_>, delta: f64) {
        let values = Self::values(cx);
        if let Some(current) = values.get(self.active.min(values.len().saturating_sub(1))) {
            self.set_active_value(cx, current + delta);
        }
    }

    fn hover_effect(cx: &mut WidgetCx<'_>, on: bool) {
        let size = cx.calc_f64("thumbsize").unwrap_or(14.0);
        let radius = if on { size / 2.0 * HOVER_GROWTH } else { size / 2.0 };
        let mut specs = vec![AnimationSpec::new("thumbradius", radius).duration(HOVER_DURATION)];
        if cx.calc_bool("ticks") {
            specs.push(AnimationSpec::new("tickalpha", if on { 1.0 } else { 0.0 }).duration(HOVER_DURATION));
        }
        for spec in specs {
            if let Err(err) = cx.ui.animate(cx.id, spec) {
                tracing::warn!(target: targets::ANIMATION, id = ?cx.id, %err, "hover animation failed");
            }
        }
    }

    fn reset_thumb_radius(cx: &mut WidgetCx<'_>) {
        let size = cx.calc_f64("thumbsize").unwrap_or(14.0);
        if let Err(err) = cx.ui.sync(cx.id, "thumbradius", size / 2.0, None) {
            tracing::warn!(target: targets::ATTRIBUTE, id = ?cx.id, %err, "thumb radius update rejected");
        }
    }
}

impl Widget for Slider {
    fn attributes(&self) -> &'static AttributeTable {
        &SLIDER_ATTRS
    }

    fn init(&mut self, cx: &mut WidgetCx<'_>) {
        Self::reset_thumb_radius(cx);
    }

    fn intrinsic_size(&self, base: &WidgetBase, _metrics: &dyn FontMetrics, scale: f64) -> (f64, f64) {
        let size = base.calc_f64("thumbsize").unwrap_or(14.0) * scale;
        (size * 10.0, size * HOVER_GROWTH)
    }

    fn attr_changed(&mut self, cx: &mut WidgetCx<'_>, change: &AttrChange) {
        if change.name == "thumbsize" && change.origin != AttrOrigin::Animation {
            Self::reset_thumb_radius(cx);
        }
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) {
        ctx.frame();
        let base = ctx.base;
        let s = ctx.scale;
        let calc = base.calculated();
        let (min, max) = bounds(calc);
        let (x0, x1) = Self::track(base, s);
        let (x0, x1) = (x0 - base.client_pos().0 + ctx.x, x1 - base.client_pos().0 + ctx.x);
        let insets = base.insets(s);
        let cy = ctx.y + insets.top + (ctx.height() - insets.vertical()) / 2.0;
        let to_x = |v: f64| if max > min { x0 + (v - min) / (max - min) * (x1 - x0) } else { x0 };
        let values: Vec<f64> = calc
            .get("value")
            .and_then(Value::as_list)
            .map(|l| l.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default();
        let color = base.calc_color("color").unwrap_or(Color::BLACK);
        let thickness = 4.0 * s;

        if let Some(track) = base.calc_color("trackcolor") {
            ctx.canvas.set_color(track);
            ctx.canvas.fill_rect(x0, cy - thickness / 2.0, x1 - x0, thickness);
        }
        let filled = match values.as_slice() {
            [single] => Some((x0, to_x(*single))),
            [first, .., last] => Some((to_x(*first), to_x(*last))),
            [] => None,
        };
        if let Some((a, b)) = filled {
            ctx.canvas.set_color(color);
            ctx.canvas.fill_rect(a, cy - thickness / 2.0, b - a, thickness);
        }

        let tick_alpha = base.calc_f64("tickalpha").unwrap_or(0.0);
        if base.calc_bool("ticks")
            && tick_alpha > 0.0
            && let Some(step) = finite(calc, "step").filter(|s| *s > 0.0)
        {
            ctx.canvas.set_color(color.with_alpha(color.a * tick_alpha));
            let steps = (((max - min) / step + 1e-9).floor() as usize).min(MAX_TICKS);
            for i in 0..=steps {
                let tx = to_x(min + i as f64 * step);
                ctx.canvas.line(tx, cy + thickness, tx, cy + thickness * 2.0);
            }
        }

        let radius = base.calc_f64("thumbradius").unwrap_or(7.0) * s;
        for (i, v) in values.iter().enumerate() {
            ctx.canvas.set_color(color);
            ctx.canvas.fill_circle(to_x(*v), cy, radius);
            if ctx.focused && i == self.active {
                ctx.canvas.set_color(color.with_alpha(0.3));
                ctx.canvas.fill_circle(to_x(*v), cy, radius * 1.4);
            }
        }
    }

    fn mouse_down(&mut self, cx: &mut WidgetCx<'_>, event: &Event) -> bool {
        let v = Self::value_at(cx, event.x);
        let values = Self::values(cx);
        self.active = values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - v).abs().total_cmp(&(*b - v).abs()))
            .map_or(0, |(i, _)| i);
        self.set_active_value(cx, v);
        true
    }

    fn drag_start(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> Option<DragStart> {
        Some(DragStart::default())
    }

    fn drag_move(&mut self, cx: &mut WidgetCx<'_>, event: &Event) {
        let v = Self::value_at(cx, event.x);
        self.set_active_value(cx, v);
    }

    fn wheel(&mut self, cx: &mut WidgetCx<'_>, event: &Event) -> bool {
        if event.wheel == 0.0 {
            return false;
        }
        let delta = Self::increment(cx) * event.wheel.signum();
        self.nudge(cx, delta);
        true
    }

    fn key_press(&mut self, cx: &mut WidgetCx<'_>, event: &Event) -> bool {
        let step = Self::increment(cx);
        let (min, max) = cx.base().map_or((0.0, 100.0), |b| bounds(b.calculated()));
        match event.key {
            Some(Key::Left | Key::Down) => self.nudge(cx, -step),
            Some(Key::Right | Key::Up) => self.nudge(cx, step),
            Some(Key::PageDown) => self.nudge(cx, -step * 10.0),
            Some(Key::PageUp) => self.nudge(cx, step * 10.0),
            Some(Key::Home) => self.set_active_value(cx, min),
            Some(Key::End) => self.set_active_value(cx, max),
            _ => return false,
        }
        true
    }

    fn mouse_enter(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        Self::hover_effect(cx, true);
        true
    }

    fn mouse_leave(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) {
        Self::hover_effect(cx, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::widget::events::{EventType, Modifiers, MouseButtons};
    use crate::widget::reflow::Offer;
    use crate::widget::{Ui, WidgetId};

    fn slider(ui: &mut Ui, value: Value) -> WidgetId {
        let mut attrs = AttrMap::new();
        attrs.insert("value".into(), value);
        ui.spawn(Slider::new(), attrs).unwrap()
    }

    fn press(ui: &mut Ui, id: WidgetId, key: Key) {
        let mut e = Event::new(EventType::KeyPress);
        e.key = Some(key);
        e.modifiers = Modifiers::NONE;
        ui.handle_event(id, &mut e);
    }

    fn pointer(ui: &mut Ui, id: WidgetId, kind: EventType, x: f64, time: f64) {
        let mut e = Event::new(kind);
        e.x = x;
        e.y = 10.0;
        e.time = time;
        if kind != EventType::MouseUp {
            e.button = MouseButtons::LEFT;
            e.buttons = MouseButtons::LEFT;
        } else {
            e.button = MouseButtons::LEFT;
        }
        ui.handle_event(id, &mut e);
    }

    #[test]
    fn test_value_normalized() {
        let mut ui = Ui::new(UiConfig::default());
        let s = slider(&mut ui, Value::from(150));
        assert_eq!(ui.calc(s, "value"), Some(Value::from([100])));
        assert_eq!(ui.get(s, "value"), Some(Value::Number(100.0)));

        ui.attr(s, "step", 10).unwrap();
        ui.attr(s, "value", 43).unwrap();
        assert_eq!(ui.get(s, "value"), Some(Value::Number(40.0)));

        ui.attr(s, "value", Value::Nil).unwrap();
        assert_eq!(ui.get(s, "value"), Some(Value::Number(0.0)));
        assert!(ui.attr(s, "value", "loud").is_err());
    }

    #[test]
    fn test_range_change_reclamps() {
        let mut ui = Ui::new(UiConfig::default());
        let s = slider(&mut ui, Value::from([10, 90]));
        ui.attr(s, "max", 50).unwrap();
        assert_eq!(ui.calc(s, "value"), Some(Value::from([10, 50])));
    }

    #[test]
    fn test_keyboard_crossover_hands_over_active_thumb() {
        let mut ui = Ui::new(UiConfig::default());
        let s = slider(&mut ui, Value::from([20, 30]));
        ui.attr(s, "step", 10).unwrap();
        assert!(ui.focus(s));

        press(&mut ui, s, Key::Right);
        assert_eq!(ui.calc(s, "value"), Some(Value::from([30, 30])));
        assert_eq!(ui.widget::<Slider>(s).unwrap().active(), 0);

        press(&mut ui, s, Key::Right);
        assert_eq!(ui.calc(s, "value"), Some(Value::from([30, 40])));
        assert_eq!(ui.widget::<Slider>(s).unwrap().active(), 1);

        press(&mut ui, s, Key::End);
        assert_eq!(ui.calc(s, "value"), Some(Value::from([30, 100])));
    }

    #[test]
    fn test_drag_crossover() {
        let mut ui = Ui::new(UiConfig::default());
        let s = slider(&mut ui, Value::from([20, 60]));
        ui.attr(s, "thumbsize", 20).unwrap();
        ui.attr(s, "w", 220).unwrap();
        ui.reflow(s, Some(Offer::new(400.0, 100.0))).unwrap();
        ui.realize_geometry(s);

        // Track runs from x=10 to x=210: 2px per unit.
        pointer(&mut ui, s, EventType::MouseDown, 60.0, 0.0);
        assert_eq!(ui.calc(s, "value"), Some(Value::from([25, 60])));
        pointer(&mut ui, s, EventType::MouseMove, 170.0, 0.1);
        pointer(&mut ui, s, EventType::MouseMove, 170.0, 0.2);
        assert_eq!(ui.calc(s, "value"), Some(Value::from([60, 80])));
        assert_eq!(ui.widget::<Slider>(s).unwrap().active(), 1);
        pointer(&mut ui, s, EventType::MouseUp, 170.0, 0.3);
        assert!(!ui.session().drag().is_dragging());
    }

    #[test]
    fn test_hover_grows_thumb() {
        let mut ui = Ui::new(UiConfig::default());
        let s = slider(&mut ui, Value::from(50));
        assert_eq!(ui.calc(s, "thumbradius"), Some(Value::Number(7.0)));
        ui.reflow(s, Some(Offer::new(400.0, 100.0))).unwrap();
        ui.realize_geometry(s);

        pointer(&mut ui, s, EventType::MouseMove, 20.0, 0.0);
        ui.advance_animations(0.0);
        ui.advance_animations(1.0);
        assert_eq!(ui.calc(s, "thumbradius"), Some(Value::Number(10.5)));

        pointer(&mut ui, s, EventType::MouseMove, 500.0, 1.0);
        ui.advance_animations(1.0);
        ui.advance_animations(2.0);
        assert_eq!(ui.calc(s, "thumbradius"), Some(Value::Number(7.0)));
    }

    #[test]
    fn test_tick_count_is_capped() {
        use crate::widget::painting::{DrawOp, RecordingCanvas};

        let lines = |step: f64| {
            let mut ui = Ui::new(UiConfig::default());
            let s = slider(&mut ui, Value::from(50));
            ui.attr(s, "step", step).unwrap();
            ui.attr(s, "ticks", true).unwrap();
            ui.attr(s, "tickalpha", 1).unwrap();
            ui.reflow(s, Some(Offer::new(400.0, 100.0))).unwrap();
            ui.realize_geometry(s);
            let mut canvas = RecordingCanvas::new();
            ui.draw(s, &mut canvas);
            canvas.ops.iter().filter(|op| matches!(op, DrawOp::Line(..))).count()
        };
        assert_eq!(lines(10.0), 11);
        assert_eq!(lines(0.0001), MAX_TICKS + 1);
    }

    #[test]
    fn test_wheel_nudges_by_percent() {
        let mut ui = Ui::new(UiConfig::default());
        let s = slider(&mut ui, Value::from(50));
        ui.reflow(s, Some(Offer::new(400.0, 100.0))).unwrap();
        ui.realize_geometry(s);
        let mut e = Event::new(EventType::MouseWheel);
        e.x = 20.0;
        e.y = 10.0;
        e.wheel = 1.0;
        ui.handle_event(s, &mut e);
        assert_eq!(ui.get(s, "value"), Some(Value::Number(51.0)));
    }
}
