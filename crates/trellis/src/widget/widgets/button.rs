//! Button widget implementation.
//!
//! [`Button`] shows a label and an optional icon over a colored face. It
//! takes focus, and a focused button clicks on Space or Enter.
//!
//! # Visual States
//!
//! - **Normal**: the `color` face, or nothing when `flat`
//! - **Hovered**: a lighter face (a faint one when `flat`)
//! - **Pressed**: a darker face while the button is held
//! - **Disabled**: drawn at reduced alpha
//!
//! The calculated `icon_dark` field tells the painter whether icons over the
//! face should use their dark variant.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let ok = ui.spawn(Button::new(), attrs! { "label" => "OK", "color" => "#eeeeee" }).unwrap();
//! assert_eq!(ui.calc(ok, "icon_dark"), Some(Value::Bool(true)));
//! ```

use std::sync::LazyLock;

use trellis_core::attribute::Reflow;
use trellis_core::{AttributeSpec, AttributeTable, Color, Value};

use crate::widget::attributes::{boolean, build_table, color_with_luma, string, WIDGET_ATTRS};
use crate::widget::base::WidgetBase;
use crate::widget::context::WidgetCx;
use crate::widget::events::{Event, Key};
use crate::widget::handlers::HandlerKind;
use crate::widget::painting::FontMetrics;
use crate::widget::traits::{PaintContext, Widget};

/// Attributes of buttons.
pub static BUTTON_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    build_table(
        Some(&WIDGET_ATTRS),
        "Button",
        vec![
            ("label", string().reflow(Reflow::Full)),
            ("icon", string().reflow(Reflow::Full)),
            (
                "color",
                AttributeSpec::new()
                    .default_value("#3a7bd5")
                    .shorthand(color_with_luma)
                    .reflow(Reflow::None),
            ),
            ("flat", boolean().default_value(false).reflow(Reflow::None)),
            ("focusable", AttributeSpec::new().default_value(true)),
            ("padding", AttributeSpec::new().default_value(Value::from([4, 10]))),
        ],
    )
});

const ICON_GAP: f64 = 4.0;

/// A clickable button.
#[derive(Debug, Clone, Default)]
pub struct Button {
    pressed: bool,
    hovered: bool,
}

impl Button {
    /// A button in its resting state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the button is held down.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn face(&self, base: &WidgetBase) -> Option<Color> {
        let color = base.calc_color("color")?;
        let flat = base.calc_bool("flat");
        match (self.pressed, self.hovered, flat) {
            (true, _, _) => Some(color.lighten(-0.2)),
            (false, true, true) => Some(color.with_alpha(color.a * 0.15)),
            (false, true, false) => Some(color.lighten(0.15)),
            (false, false, true) => None,
            (false, false, false) => Some(color),
        }
    }
}

impl Widget for Button {
    fn attributes(&self) -> &'static AttributeTable {
        &BUTTON_ATTRS
    }

    fn intrinsic_size(&self, base: &WidgetBase, metrics: &dyn FontMetrics, scale: f64) -> (f64, f64) {
        let (mut w, h) = metrics.text_size(base.calc_str("label").unwrap_or(""), scale);
        if base.calc_str("icon").is_some() {
            w += h;
            if w > h {
                w += ICON_GAP * scale;
            }
        }
        (w, h)
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) {
        let base = ctx.base;
        if base.is_disabled() {
            ctx.canvas.set_alpha(ctx.alpha * 0.5);
        }
        if let Some(face) = self.face(base) {
            ctx.canvas.set_color(face);
            ctx.canvas.fill_rect(ctx.x, ctx.y, ctx.width(), ctx.height());
        }
        ctx.frame();

        let insets = base.insets(ctx.scale);
        let line = ctx.metrics.line_height(ctx.scale);
        let mut x = ctx.x + insets.left;
        let y = ctx.y + insets.top;
        if let Some(icon) = base.calc_str("icon") {
            let name = if base.calc_bool("icon_dark") {
                format!("{icon}-dark")
            } else {
                icon.to_string()
            };
            ctx.canvas.image(&name, x, y, line, line);
            x += line + ICON_GAP * ctx.scale;
        }
        if let Some(label) = base.calc_str("label") {
            let dark = base.calc_bool("icon_dark") && !base.calc_bool("flat");
            ctx.canvas.set_color(if dark { Color::BLACK } else { Color::WHITE });
            ctx.canvas.text(x, y, label);
        }
        if ctx.focused {
            ctx.canvas.set_color(Color::BLACK.with_alpha(0.4));
            ctx.canvas.stroke_rect(ctx.x, ctx.y, ctx.width(), ctx.height());
        }
    }

    fn mouse_down(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        self.pressed = true;
        cx.queue_draw();
        true
    }

    fn mouse_up(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        if self.pressed {
            self.pressed = false;
            cx.queue_draw();
        }
        false
    }

    fn mouse_enter(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        self.hovered = true;
        cx.queue_draw();
        true
    }

    fn mouse_leave(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) {
        self.hovered = false;
        self.pressed = false;
        cx.queue_draw();
    }

    fn key_press(&mut self, cx: &mut WidgetCx<'_>, event: &Event) -> bool {
        match event.key {
            Some(Key::Enter | Key::Char(' ')) => {
                cx.ui.emit(cx.id, HandlerKind::Click, event);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::widget::events::EventType;
    use crate::widget::handlers::HandlerResult;
    use crate::widget::reflow::Offer;
    use crate::widget::Ui;
    use std::cell::Cell;
    use std::rc::Rc;
    use trellis_core::AttrMap;

    #[test]
    fn test_intrinsic_size_from_label_and_padding() {
        let mut ui = Ui::new(UiConfig::default());
        let mut attrs = AttrMap::new();
        attrs.insert("label".into(), Value::from("Save"));
        let b = ui.spawn(Button::new(), attrs).unwrap();
        let r = ui.reflow(b, Some(Offer::new(500.0, 500.0))).unwrap();
        assert_eq!((r.w, r.h), (4.0 * 7.0 + 20.0, 16.0 + 8.0));

        ui.attr(b, "icon", "disk").unwrap();
        let r = ui.reflow(b, Some(Offer::new(500.0, 500.0))).unwrap();
        assert_eq!(r.w, 28.0 + 16.0 + ICON_GAP + 20.0);
    }

    #[test]
    fn test_icon_dark_follows_color() {
        let mut ui = Ui::new(UiConfig::default());
        let b = ui.spawn(Button::new(), AttrMap::new()).unwrap();
        assert_eq!(ui.calc(b, "icon_dark"), Some(Value::Bool(false)));
        ui.attr(b, "color", "white").unwrap();
        assert_eq!(ui.calc(b, "icon_dark"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_enter_and_space_click() {
        let mut ui = Ui::new(UiConfig::default());
        let b = ui.spawn(Button::new(), AttrMap::new()).unwrap();
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        ui.on(b, HandlerKind::Click, move |_, _| {
            c.set(c.get() + 1);
            HandlerResult::Handled
        })
        .unwrap();
        ui.focus(b);
        for key in [Key::Enter, Key::Char(' '), Key::Char('x')] {
            let mut e = Event::new(EventType::KeyPress);
            e.key = Some(key);
            ui.handle_event(b, &mut e);
        }
        assert_eq!(clicks.get(), 2);
    }
}
