//! Single-line text input widget.
//!
//! [`Entry`] edits its `value` attribute in place. All positions are caret
//! positions counted in grapheme clusters, 1-based: caret 1 sits before the
//! first character, caret `len + 1` after the last one.
//!
//! - `caret` is calculated after `value` and clamped to `[1, len + 1]`;
//!   nil means the end of the text
//! - `selection` is `[start, end]` in caret positions, or nil; it is stored
//!   sorted, and an empty range calculates to nil
//! - `textwidth` sizes the entry in average characters
//! - `icon_dark` follows the luma of `bg`
//!
//! Every user edit pushes a snapshot of value, caret and selection onto the
//! undo stack first, and drops the redo stack.
//!
//! # Keyboard
//!
//! | Key | Action |
//! |-----|--------|
//! | printable | insert, replacing the selection |
//! | Backspace / Delete | delete the selection or one character |
//! | Ctrl+Backspace / Ctrl+Delete | delete to the previous / next word boundary |
//! | Left / Right | move; Ctrl by word, Shift extends the selection |
//! | Home / End | move to start / end |
//! | Ctrl+A | select all |
//! | Ctrl+Z | undo |
//! | Ctrl+Y, Ctrl+Shift+Z | redo |
//! | Enter | handled, no edit |
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let entry = ui.spawn(Entry::new(), attrs! { "value" => "hello" }).unwrap();
//! assert_eq!(ui.calc(entry, "caret"), Some(Value::Number(6.0)));
//!
//! ui.attr(entry, "caret", 99).unwrap();
//! assert_eq!(ui.calc(entry, "caret"), Some(Value::Number(6.0)));
//! ```

use std::sync::LazyLock;

use unicode_segmentation::UnicodeSegmentation;

use trellis_core::attribute::Reflow;
use trellis_core::logging::targets;
use trellis_core::{AttrMap, AttributeError, AttributeResult, AttributeSpec, AttributeTable, Color, Value, ValueType};

use crate::error::TreeResult;
use crate::widget::attributes::{boolean, build_table, color_with_luma, number, string, WIDGET_ATTRS};
use crate::widget::base::WidgetBase;
use crate::widget::context::WidgetCx;
use crate::widget::events::{Event, Key};
use crate::widget::painting::FontMetrics;
use crate::widget::traits::{DragStart, PaintContext, Widget};
use crate::widget::WidgetId;

const ICON_GAP: f64 = 4.0;

fn grapheme_len(calc: &AttrMap) -> usize {
    calc.get("value")
        .and_then(Value::as_str)
        .map_or(0, |s| s.graphemes(true).count())
}

fn clamp_caret(calc: &AttrMap, value: &Value) -> AttributeResult<Value> {
    let end = grapheme_len(calc) as f64 + 1.0;
    let pos = match value {
        Value::Nil => end,
        other => other
            .clone()
            .coerce(ValueType::Number)
            .as_f64()
            .ok_or_else(|| AttributeError::invalid("caret", format!("`{other}` is not a position")))?
            .round(),
    };
    Ok(Value::Number(pos.clamp(1.0, end)))
}

fn normalize_selection(calc: &AttrMap, value: &Value) -> AttributeResult<Value> {
    if value.is_nil() {
        return Ok(Value::Nil);
    }
    let invalid = || AttributeError::invalid("selection", format!("`{value}` is not a [start, end] range"));
    let Some([a, b]) = value.as_list() else {
        return Err(invalid());
    };
    let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) else {
        return Err(invalid());
    };
    let end = grapheme_len(calc) as f64 + 1.0;
    let (a, b) = (a.round().clamp(1.0, end), b.round().clamp(1.0, end));
    if a == b {
        return Ok(Value::Nil);
    }
    Ok(Value::from([a.min(b), a.max(b)]))
}

/// Attributes of entries.
pub static ENTRY_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    build_table(
        Some(&WIDGET_ATTRS),
        "Entry",
        vec![
            ("value", string().default_value("").reflow(Reflow::None)),
            (
                "caret",
                AttributeSpec::new()
                    .default_value(Value::Nil)
                    .derive(clamp_caret)
                    .priority()
                    .reflow(Reflow::None),
            ),
            (
                "selection",
                AttributeSpec::new()
                    .default_value(Value::Nil)
                    .derive(normalize_selection)
                    .priority()
                    .reflow(Reflow::None),
            ),
            ("placeholder", string().reflow(Reflow::None)),
            ("textwidth", number().default_value(20).reflow(Reflow::Full)),
            (
                "bg",
                AttributeSpec::new().default_value("white").shorthand(color_with_luma),
            ),
            ("icon", string().reflow(Reflow::Full)),
            ("editable", boolean().default_value(true).reflow(Reflow::None)),
            ("focusable", AttributeSpec::new().default_value(true)),
            ("padding", AttributeSpec::new().default_value(Value::from([2, 4]))),
            ("border", AttributeSpec::new().default_value("1 #888888")),
        ],
    )
});

/// Value, caret and selection at one point of the edit history.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    value: String,
    caret: usize,
    selection: Option<(usize, usize)>,
}

fn selection_pair(value: &Value) -> Option<(usize, usize)> {
    match value.as_list()? {
        [a, b] => Some((a.as_f64()? as usize, b.as_f64()? as usize)),
        _ => None,
    }
}

impl Snapshot {
    fn read(cx: &WidgetCx<'_>) -> Self {
        let value = cx.calc_string("value").unwrap_or_default();
        let end = value.graphemes(true).count() + 1;
        let caret = cx.calc_f64("caret").map_or(end, |c| c as usize).clamp(1, end);
        let selection = cx.calc("selection").as_ref().and_then(selection_pair);
        Self {
            value,
            caret,
            selection,
        }
    }

    /// Selection as 0-based grapheme indices.
    fn range(&self) -> Option<(usize, usize)> {
        self.selection.map(|(a, b)| (a - 1, b - 1))
    }
}

/// Store value, caret and selection through `sync`. Value goes first so the
/// caret is clamped against the new text.
fn store(cx: &mut WidgetCx<'_>, state: &Snapshot) -> TreeResult<()> {
    let id = cx.id;
    let selection = match state.selection {
        Some((a, b)) => Value::from([a as f64, b as f64]),
        None => Value::Nil,
    };
    cx.ui.sync(id, "value", state.value.as_str(), None)?;
    cx.ui.sync(id, "caret", state.caret as f64, None)?;
    cx.ui.sync(id, "selection", selection, None)
}

fn is_word(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(char::is_alphanumeric)
}

/// Start of the word before `pos`, skipping separators first.
fn word_start(g: &[&str], pos: usize) -> usize {
    let mut i = pos.min(g.len());
    while i > 0 && !is_word(g[i - 1]) {
        i -= 1;
    }
    while i > 0 && is_word(g[i - 1]) {
        i -= 1;
    }
    i
}

/// End of the word at `pos`, including the separators after it.
fn word_end(g: &[&str], pos: usize) -> usize {
    let mut i = pos.min(g.len());
    while i < g.len() && is_word(g[i]) {
        i += 1;
    }
    while i < g.len() && !is_word(g[i]) {
        i += 1;
    }
    i
}

fn icon_width(base: &WidgetBase, metrics: &dyn FontMetrics, scale: f64) -> f64 {
    match base.calc_str("icon") {
        Some(_) => metrics.line_height(scale) + ICON_GAP * scale,
        None => 0.0,
    }
}

/// A single-line text input.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    /// Fixed end of a keyboard or pointer selection, 0-based.
    anchor: Option<usize>,
    /// First visible grapheme.
    scroll: usize,
    dragging: bool,
}

impl Entry {
    /// An entry with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of undoable edits.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redoable edits.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    fn write(&mut self, cx: &mut WidgetCx<'_>, state: &Snapshot) {
        if let Err(err) = store(cx, state) {
            tracing::warn!(target: targets::ATTRIBUTE, id = ?cx.id, %err, "entry update rejected");
        }
        self.ensure_visible(cx);
        cx.queue_draw();
    }

    /// Replace graphemes `start..end` with `text`, recording history.
    fn replace_range(&mut self, cx: &mut WidgetCx<'_>, state: &Snapshot, start: usize, end: usize, text: &str) {
        let g: Vec<&str> = state.value.graphemes(true).collect();
        let (start, end) = (start.min(g.len()), end.min(g.len()));
        let mut value = g[..start].concat();
        value.push_str(text);
        value.push_str(&g[end..].concat());
        let next = Snapshot {
            value,
            caret: start + text.graphemes(true).count() + 1,
            selection: None,
        };
        if next == *state {
            return;
        }
        self.undo.push(state.clone());
        self.redo.clear();
        self.anchor = None;
        tracing::trace!(target: targets::ATTRIBUTE, id = ?cx.id, start, end, "entry edited");
        self.write(cx, &next);
    }

    /// Move the caret to `to` (0-based), extending the selection from the
    /// anchor when `extend` is set.
    fn move_caret(&mut self, cx: &mut WidgetCx<'_>, state: &Snapshot, to: usize, extend: bool) {
        let selection = if extend {
            let anchor = *self.anchor.get_or_insert(state.caret - 1);
            (anchor != to).then(|| (anchor.min(to) + 1, anchor.max(to) + 1))
        } else {
            self.anchor = None;
            None
        };
        let next = Snapshot {
            value: state.value.clone(),
            caret: to + 1,
            selection,
        };
        self.write(cx, &next);
    }

    fn select_all(&mut self, cx: &mut WidgetCx<'_>, state: &Snapshot) {
        let end = state.value.graphemes(true).count();
        self.anchor = Some(0);
        let next = Snapshot {
            value: state.value.clone(),
            caret: end + 1,
            selection: (end > 0).then_some((1, end + 1)),
        };
        self.write(cx, &next);
    }

    fn undo(&mut self, cx: &mut WidgetCx<'_>, state: Snapshot) {
        if let Some(previous) = self.undo.pop() {
            self.redo.push(state);
            self.anchor = None;
            self.write(cx, &previous);
        }
    }

    fn redo(&mut self, cx: &mut WidgetCx<'_>, state: Snapshot) {
        if let Some(next) = self.redo.pop() {
            self.undo.push(state);
            self.anchor = None;
            self.write(cx, &next);
        }
    }

    /// Scroll so the caret is inside the text area.
    fn ensure_visible(&mut self, cx: &WidgetCx<'_>) {
        let Some(base) = cx.base() else {
            return;
        };
        let scale = cx.scale();
        let metrics = cx.ui.metrics();
        let value = base.calc_str("value").unwrap_or("");
        let g: Vec<&str> = value.graphemes(true).collect();
        let caret = base.calc_f64("caret").map_or(g.len(), |c| (c as usize).saturating_sub(1)).min(g.len());
        let room = base.geometry().w - base.insets(scale).horizontal() - icon_width(base, metrics, scale);

        self.scroll = self.scroll.min(caret);
        while self.scroll < caret && metrics.text_size(&g[self.scroll..caret].concat(), scale).0 > room {
            self.scroll += 1;
        }
    }

    /// Caret index (0-based) closest to window x coordinate `x`.
    fn position_at(&self, cx: &WidgetCx<'_>, x: f64) -> usize {
        let Some(base) = cx.base() else {
            return 0;
        };
        let scale = cx.scale();
        let metrics = cx.ui.metrics();
        let value = base.calc_str("value").unwrap_or("");
        let (left, _) = base.client_pos();
        let rel = x - left - base.insets(scale).left - icon_width(base, metrics, scale);

        let mut acc = 0.0;
        let mut index = self.scroll;
        for grapheme in value.graphemes(true).skip(self.scroll) {
            let w = metrics.text_size(grapheme, scale).0;
            if rel < acc + w / 2.0 {
                return index;
            }
            acc += w;
            index += 1;
        }
        index
    }

    fn handle_shortcut(&mut self, cx: &mut WidgetCx<'_>, state: Snapshot, c: char, shift: bool, editable: bool) -> bool {
        match c.to_ascii_lowercase() {
            'a' => self.select_all(cx, &state),
            'z' if editable && shift => self.redo(cx, state),
            'z' if editable => self.undo(cx, state),
            'y' if editable => self.redo(cx, state),
            _ => return false,
        }
        true
    }
}

impl Widget for Entry {
    fn attributes(&self) -> &'static AttributeTable {
        &ENTRY_ATTRS
    }

    fn intrinsic_size(&self, base: &WidgetBase, metrics: &dyn FontMetrics, scale: f64) -> (f64, f64) {
        let chars = base.calc_f64("textwidth").unwrap_or(20.0).max(0.0);
        let w = chars * metrics.char_width(scale) + icon_width(base, metrics, scale);
        (w, metrics.line_height(scale))
    }

    fn realize(&mut self, cx: &mut WidgetCx<'_>) {
        self.ensure_visible(cx);
    }

    fn paint(&self, ctx: &mut PaintContext<'_>) {
        ctx.frame();
        let base = ctx.base;
        let (scale, metrics) = (ctx.scale, ctx.metrics);
        let insets = base.insets(scale);
        let line = metrics.line_height(scale);
        let mut x = ctx.x + insets.left;
        let y = ctx.y + insets.top;

        if let Some(icon) = base.calc_str("icon") {
            let name = if base.calc_bool("icon_dark") {
                format!("{icon}-dark")
            } else {
                icon.to_string()
            };
            ctx.canvas.image(&name, x, y, line, line);
            x += line + ICON_GAP * scale;
        }

        let text_color = if base.calc_bool("icon_dark") { Color::BLACK } else { Color::WHITE };
        let value = base.calc_str("value").unwrap_or("");
        let g: Vec<&str> = value.graphemes(true).collect();
        let scroll = self.scroll.min(g.len());
        let offset = |i: usize| metrics.text_size(&g[scroll..i.clamp(scroll, g.len())].concat(), scale).0;

        if g.is_empty() {
            if let Some(placeholder) = base.calc_str("placeholder") {
                ctx.canvas.set_color(text_color.with_alpha(0.5));
                ctx.canvas.text(x, y, placeholder);
            }
        } else {
            if let Some((a, b)) = base.calc("selection").and_then(selection_pair) {
                let (start, end) = (offset(a - 1), offset(b - 1));
                if end > start {
                    ctx.canvas.set_color(Color::rgba(0.2, 0.45, 0.9, 0.4));
                    ctx.canvas.fill_rect(x + start, y, end - start, line);
                }
            }
            ctx.canvas.set_color(text_color);
            ctx.canvas.text(x, y, &g[scroll..].concat());
        }

        if ctx.focused && !self.dragging {
            let caret = base.calc_f64("caret").map_or(g.len(), |c| (c as usize).saturating_sub(1));
            let cx = x + offset(caret);
            ctx.canvas.set_color(text_color);
            ctx.canvas.line(cx, y, cx, y + line);
        }
    }

    fn key_press(&mut self, cx: &mut WidgetCx<'_>, event: &Event) -> bool {
        let Some(key) = event.key else {
            return false;
        };
        let shift = event.modifiers.shift;
        let ctrl = event.modifiers.ctrl || event.modifiers.meta;
        let editable = cx.calc_bool("editable");
        let state = Snapshot::read(cx);
        let g: Vec<&str> = state.value.graphemes(true).collect();
        let n = g.len();
        let pos = state.caret - 1;
        let range = state.range();

        match key {
            Key::Char(c) if ctrl => return self.handle_shortcut(cx, state.clone(), c, shift, editable),
            Key::Char(_) if event.modifiers.alt => return false,
            Key::Char(c) => {
                if !editable {
                    return false;
                }
                let (start, end) = range.unwrap_or((pos, pos));
                let mut buf = [0u8; 4];
                self.replace_range(cx, &state, start, end, c.encode_utf8(&mut buf));
            }
            Key::Backspace | Key::Delete if !editable => return false,
            Key::Backspace => match range {
                Some((start, end)) => self.replace_range(cx, &state, start, end, ""),
                None if pos > 0 => {
                    let start = if ctrl { word_start(&g, pos) } else { pos - 1 };
                    self.replace_range(cx, &state, start, pos, "");
                }
                None => {}
            },
            Key::Delete => match range {
                Some((start, end)) => self.replace_range(cx, &state, start, end, ""),
                None if pos < n => {
                    let end = if ctrl { word_end(&g, pos) } else { pos + 1 };
                    self.replace_range(cx, &state, pos, end, "");
                }
                None => {}
            },
            Key::Left => {
                let to = match range {
                    Some((start, _)) if !shift => start,
                    _ if ctrl => word_start(&g, pos),
                    _ => pos.saturating_sub(1),
                };
                self.move_caret(cx, &state, to, shift);
            }
            Key::Right => {
                let to = match range {
                    Some((_, end)) if !shift => end,
                    _ if ctrl => word_end(&g, pos),
                    _ => (pos + 1).min(n),
                };
                self.move_caret(cx, &state, to, shift);
            }
            Key::Home | Key::Up | Key::PageUp => self.move_caret(cx, &state, 0, shift),
            Key::End | Key::Down | Key::PageDown => self.move_caret(cx, &state, n, shift),
            Key::Enter => {}
            _ => return false,
        }
        true
    }

    fn mouse_down(&mut self, cx: &mut WidgetCx<'_>, event: &Event) -> bool {
        let state = Snapshot::read(cx);
        let to = self.position_at(cx, event.x);
        // Without shift this drops the anchor; a drag re-anchors at the caret.
        self.move_caret(cx, &state, to, event.modifiers.shift);
        true
    }

    fn double_click(&mut self, cx: &mut WidgetCx<'_>, _event: &Event) -> bool {
        let state = Snapshot::read(cx);
        let g: Vec<&str> = state.value.graphemes(true).collect();
        let pos = state.caret - 1;
        let start = if pos < g.len() && is_word(g[pos]) {
            word_start(&g, pos + 1)
        } else {
            word_start(&g, pos)
        };
        let mut end = start;
        while end < g.len() && is_word(g[end]) {
            end += 1;
        }
        self.anchor = Some(start);
        let next = Snapshot {
            value: state.value.clone(),
            caret: end + 1,
            selection: (end > start).then_some((start + 1, end + 1)),
        };
        self.write(cx, &next);
        true
    }

    fn drag_start(&mut self, _cx: &mut WidgetCx<'_>, _event: &Event) -> Option<DragStart> {
        self.dragging = true;
        Some(DragStart {
            droppable: false,
            arg: Value::Nil,
        })
    }

    fn drag_move(&mut self, cx: &mut WidgetCx<'_>, event: &Event) {
        let state = Snapshot::read(cx);
        let to = self.position_at(cx, event.x);
        self.move_caret(cx, &state, to, true);
    }

    fn drag_end(&mut self, cx: &mut WidgetCx<'_>, _event: &Event, _target: Option<WidgetId>) {
        self.dragging = false;
        cx.queue_draw();
    }
}
