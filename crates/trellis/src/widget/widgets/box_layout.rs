//! Flow containers: [`HBox`] and [`VBox`].
//!
//! A box lays its children out one after another along its main axis,
//! `spacing` pixels apart. On the cross axis each child is aligned by its
//! cell (or the box's own `halign`/`valign`) against the box's final cross
//! size, and the cell's fill flag stretches it across.
//!
//! When the main axis size is fixed (an explicit `w`/`h`, or a greedy fill
//! offer), leftover main axis space is shared among the children by their
//! cell's `expand` weight. A cell that fills along the main axis without a
//! weight counts as weight 1.
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let row = ui.spawn(HBox, attrs! { "w" => 100, "spacing" => 4 }).unwrap();
//! let name = ui.spawn(Spacer, attrs! { "h" => 20 }).unwrap();
//! let ok = ui.spawn(Spacer, attrs! { "w" => 30, "h" => 20 }).unwrap();
//! ui.add(row, name, Cell::new().expand(1.0)).unwrap();
//! ui.add(row, ok, Cell::new()).unwrap();
//!
//! ui.reflow(row, Some(Offer::new(400.0, 300.0))).unwrap();
//! assert_eq!(ui.base(name).unwrap().geometry().w, 66.0);
//! assert_eq!(ui.base(ok).unwrap().geometry().x, 70.0);
//! ```

use std::sync::LazyLock;

use trellis_core::attribute::{Reflow, Sides};
use trellis_core::logging::targets;
use trellis_core::AttributeTable;

use crate::widget::attributes::{build_table, number};
use crate::widget::base::{Align, Geometry};
use crate::widget::context::WidgetCx;
use crate::widget::reflow::{axis_size, box_position, limits, resolve_dimension, Limits, Offer, Realized};
use crate::widget::traits::Widget;
use crate::widget::{Ui, WidgetId};

use super::container::{Cell, ChildEntry, CONTAINER_ATTRS};

/// Layout direction of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Children flow left to right.
    Horizontal,
    /// Children flow top to bottom.
    Vertical,
}

impl Axis {
    /// Turn a `(horizontal, vertical)` pair into `(main, cross)`, or back.
    fn orient<T>(self, a: T, b: T) -> (T, T) {
        match self {
            Axis::Horizontal => (a, b),
            Axis::Vertical => (b, a),
        }
    }

    /// `(start, end)` of the main axis and of the cross axis.
    fn sides(self, s: Sides) -> ((f64, f64), (f64, f64)) {
        self.orient((s.left, s.right), (s.top, s.bottom))
    }
}

/// One visible child during box layout. Sizes are `(main, cross)`.
struct Slot {
    id: WidgetId,
    cell: Cell,
    pad: Sides,
    offset: (f64, f64),
    size: (f64, f64),
    full: (bool, bool),
    weight: f64,
}

/// Offer for one child, `main` by `cross` pixels. `stretch` makes the child
/// take the whole main axis box.
fn child_offer(axis: Axis, offer: &Offer, cell: &Cell, main: f64, cross: f64, stretch: bool) -> Offer {
    let (w, h) = axis.orient(main, cross);
    let (_, fill_cross) = axis.orient(cell.fill_w, cell.fill_h);
    let (_, greedy_cross) = axis.orient(offer.greedy_w, offer.greedy_h);
    let (fill_w, fill_h) = axis.orient(stretch, fill_cross);
    let (greedy_w, greedy_h) = axis.orient(stretch, greedy_cross);
    Offer {
        x: 0.0,
        y: 0.0,
        w,
        h,
        fill_w,
        fill_h,
        greedy_w,
        greedy_h,
        ..*offer
    }
}

/// Reflow one child and apply its cell limits. Returns `(main, cross)`
/// sizes and whether it used its full box on each axis.
fn measure(ui: &mut Ui, axis: Axis, slot: &Slot, offer: Offer, inner: (f64, f64)) -> Option<((f64, f64), (bool, bool))> {
    let s = offer.scale;
    let r = ui.reflow(slot.id, Some(offer))?;
    let (inner_w, inner_h) = axis.orient(inner.0, inner.1);
    let cell_w = Limits {
        min: resolve_dimension(slot.cell.minw, inner_w, s),
        max: resolve_dimension(slot.cell.maxw, inner_w, s),
    };
    let cell_h = Limits {
        min: resolve_dimension(slot.cell.minh, inner_h, s),
        max: resolve_dimension(slot.cell.maxh, inner_h, s),
    };
    Some((
        axis.orient(cell_w.apply(r.w), cell_h.apply(r.h)),
        axis.orient(r.used_full_w, r.used_full_h),
    ))
}

/// Lay out a flow container along `axis`.
pub fn reflow_box(cx: &mut WidgetCx<'_>, offer: &Offer, axis: Axis) -> Realized {
    let ui = &mut *cx.ui;
    let id = cx.id;
    let Some(base) = ui.base(id) else {
        return Realized::default();
    };
    let s = offer.scale;
    let (x, y) = box_position(base, offer);
    let insets = base.insets(s);
    let spacing = base.calc_f64("spacing").unwrap_or(0.0).max(0.0) * s;
    let explicit_w = resolve_dimension(base.calc_f64("w"), offer.w, s);
    let explicit_h = resolve_dimension(base.calc_f64("h"), offer.h, s);
    let limits_w = limits(base, "minw", "maxw", offer.w, s);
    let limits_h = limits(base, "minh", "maxh", offer.h, s);
    let default_align = match axis {
        Axis::Horizontal => base.valign(),
        Axis::Vertical => base.halign(),
    }
    .unwrap_or_default();

    let inner_w = (limits_w.apply(explicit_w.unwrap_or(offer.w)) - insets.horizontal()).max(0.0);
    let inner_h = (limits_h.apply(explicit_h.unwrap_or(offer.h)) - insets.vertical()).max(0.0);
    let inner = axis.orient(inner_w, inner_h);
    let (explicit_main, explicit_cross) = axis.orient(explicit_w, explicit_h);
    let (fill_main, fill_cross) = axis.orient(offer.fill_w, offer.fill_h);
    let (greedy_main, greedy_cross) = axis.orient(offer.greedy_w, offer.greedy_h);
    let main_fixed = explicit_main.is_some() || (fill_main && greedy_main);
    let cross_fixed = explicit_cross.is_some() || (fill_cross && greedy_cross);
    let ((inset_main, _), (inset_cross, _)) = axis.sides(insets);

    let entries: Vec<ChildEntry> = ui
        .node(id)
        .ok()
        .and_then(|n| n.children.as_ref())
        .map(|c| c.entries.clone())
        .unwrap_or_default();

    // Natural sizes, each child offered what the previous ones left over.
    let mut slots = Vec::with_capacity(entries.len());
    let mut used_main = 0.0;
    for entry in entries {
        let Some(child) = ui.base(entry.id) else {
            continue;
        };
        if !child.is_visible() {
            ui.unrealize(entry.id);
            continue;
        }
        let pad = (child.margin() + entry.cell.padding).scaled(s);
        let offset = axis.orient(
            child.calc_f64("x").unwrap_or(0.0) * s,
            child.calc_f64("y").unwrap_or(0.0) * s,
        );
        let (pad_main, pad_cross) = axis.orient(pad.horizontal(), pad.vertical());
        let (fill_main_cell, _) = axis.orient(entry.cell.fill_w, entry.cell.fill_h);
        let weight = match entry.cell.expand {
            w if w > 0.0 => w,
            _ if fill_main_cell => 1.0,
            _ => 0.0,
        };
        let avail_main = (inner.0 - used_main - pad_main - offset.0).max(0.0);
        let avail_cross = (inner.1 - pad_cross - offset.1).max(0.0);
        let mut slot = Slot {
            id: entry.id,
            cell: entry.cell,
            pad,
            offset,
            size: (0.0, 0.0),
            full: (false, false),
            weight,
        };
        let child_box = child_offer(axis, offer, &slot.cell, avail_main, avail_cross, false);
        let Some((size, full)) = measure(ui, axis, &slot, child_box, inner) else {
            continue;
        };
        slot.size = size;
        slot.full = full;
        used_main += pad_main + offset.0 + size.0 + spacing;
        slots.push(slot);
    }
    let natural_main = if slots.is_empty() { 0.0 } else { used_main - spacing };

    // Share what is left by expand weight.
    let weights: f64 = slots.iter().map(|slot| slot.weight).sum();
    let leftover = inner.0 - natural_main;
    if main_fixed && weights > 0.0 && leftover > 0.0 {
        for slot in slots.iter_mut().filter(|slot| slot.weight > 0.0) {
            let target = slot.size.0 + leftover * slot.weight / weights;
            let (_, pad_cross) = axis.orient(slot.pad.horizontal(), slot.pad.vertical());
            let avail_cross = (inner.1 - pad_cross - slot.offset.1).max(0.0);
            let child_box = child_offer(axis, offer, &slot.cell, target, avail_cross, true);
            if let Some((size, full)) = measure(ui, axis, slot, child_box, inner) {
                slot.size = size;
                slot.full = (true, full.1);
            }
        }
    }

    let content_cross = if cross_fixed {
        inner.1
    } else {
        slots
            .iter()
            .map(|slot| {
                let (_, pad_cross) = axis.orient(slot.pad.horizontal(), slot.pad.vertical());
                slot.offset.1 + pad_cross + slot.size.1
            })
            .fold(0.0, f64::max)
    };

    let mut cursor = 0.0;
    let mut used_full = (false, false);
    for slot in &slots {
        let ((pad_ms, pad_me), (pad_cs, pad_ce)) = axis.sides(slot.pad);
        let main_pos = inset_main + cursor + pad_ms + slot.offset.0;
        let (_, cross_align) = axis.orient(slot.cell.halign, slot.cell.valign);
        let cross_pos = match cross_align.unwrap_or(default_align) {
            Align::Start => inset_cross + slot.offset.1 + pad_cs,
            Align::Center => {
                inset_cross + slot.offset.1 + pad_cs + ((content_cross - slot.size.1 - pad_cs - pad_ce) / 2.0).max(0.0)
            }
            Align::End => inset_cross + slot.offset.1 + (content_cross - slot.size.1 - pad_ce).max(0.0),
        };
        let (wx, wy) = axis.orient(main_pos, cross_pos);
        let (ww, wh) = axis.orient(slot.size.0, slot.size.1);
        if let Some(node) = ui.nodes.get_mut(slot.id) {
            node.base.geometry = Geometry { x: wx, y: wy, w: ww, h: wh };
        }
        cursor += pad_ms + slot.offset.0 + slot.size.0 + pad_me + spacing;
        used_full.0 |= slot.full.0;
        used_full.1 |= slot.full.1;
    }
    ui.restack(id);

    let (content_w, content_h) = axis.orient(natural_main.max(cursor - spacing).max(0.0), content_cross);
    let (w, full_w) = axis_size(
        explicit_w,
        content_w,
        insets.horizontal(),
        offer.w,
        offer.fill_w,
        offer.greedy_w,
        offer.clamp_w,
        limits_w,
    );
    let (h, full_h) = axis_size(
        explicit_h,
        content_h,
        insets.vertical(),
        offer.h,
        offer.fill_h,
        offer.greedy_h,
        offer.clamp_h,
        limits_h,
    );
    let (children_full_w, children_full_h) = axis.orient(used_full.0, used_full.1);
    tracing::trace!(target: targets::REFLOW, ?id, ?axis, w, h, children = slots.len(), "box reflowed");
    Realized {
        x,
        y,
        w,
        h,
        used_full_w: full_w || children_full_w,
        used_full_h: full_h || children_full_h,
    }
}

/// Attributes of horizontal boxes.
pub static HBOX_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    build_table(
        Some(&CONTAINER_ATTRS),
        "HBox",
        vec![("spacing", number().default_value(0).reflow(Reflow::Full))],
    )
});

/// Attributes of vertical boxes.
pub static VBOX_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    build_table(
        Some(&CONTAINER_ATTRS),
        "VBox",
        vec![("spacing", number().default_value(0).reflow(Reflow::Full))],
    )
});

/// Lays its children out left to right.
#[derive(Debug, Clone, Copy, Default)]
pub struct HBox;

impl Widget for HBox {
    fn attributes(&self) -> &'static AttributeTable {
        &HBOX_ATTRS
    }

    fn is_container(&self) -> bool {
        true
    }

    fn reflow(&mut self, cx: &mut WidgetCx<'_>, offer: &Offer) -> Realized {
        reflow_box(cx, offer, Axis::Horizontal)
    }
}

/// Lays its children out top to bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct VBox;

impl Widget for VBox {
    fn attributes(&self) -> &'static AttributeTable {
        &VBOX_ATTRS
    }

    fn is_container(&self) -> bool {
        true
    }

    fn reflow(&mut self, cx: &mut WidgetCx<'_>, offer: &Offer) -> Realized {
        reflow_box(cx, offer, Axis::Vertical)
    }
}
