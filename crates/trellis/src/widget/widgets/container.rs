//! Containers: widgets that hold an ordered list of children.
//!
//! Each child occupies a [`Cell`] carrying its own alignment, padding, fill
//! flags and size limits, separate from the child's attributes. Insertion
//! order matters: it is the layout order, the paint order within a z level,
//! and (reversed) the hit-test order within a z level.
//!
//! # Layout
//!
//! A [`Container`] stacks its children at their natural positions. Each
//! visible child is offered the inner box (reduced by the cell padding, the
//! child's margin and the child's own `x`/`y`), then aligned against the
//! container's *running* inner size: the size as known after the children
//! laid out before it. Adding the same widgets in a different order can
//! therefore align them differently.
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let c = ui.spawn(Container, attrs! {}).unwrap();
//! let spacer = ui.spawn(Spacer, attrs! { "w" => 0.5, "h" => 0.5 }).unwrap();
//! let dot = ui.spawn(Spacer, attrs! { "w" => 10, "h" => 10 }).unwrap();
//! ui.add(c, spacer, Cell::new()).unwrap();
//! ui.add(c, dot, Cell::new().halign(Align::Center).valign(Align::Center)).unwrap();
//!
//! ui.reflow(c, Some(Offer::new(400.0, 300.0))).unwrap();
//! // Centered within the 200x150 the spacer established.
//! assert_eq!(ui.base(dot).unwrap().geometry().x, 95.0);
//! assert_eq!(ui.base(dot).unwrap().geometry().y, 70.0);
//! ```

use std::cell::OnceCell;
use std::collections::HashMap;
use std::sync::LazyLock;

use trellis_core::attribute::{parse_sides, Sides};
use trellis_core::logging::targets;
use trellis_core::{AttrMap, AttributeResult, AttributeTable, Value};

use crate::error::{TreeError, TreeResult};
use crate::widget::attributes::{build_table, HALIGN, VALIGN, WIDGET_ATTRS};
use crate::widget::base::{Align, Geometry};
use crate::widget::context::WidgetCx;
use crate::widget::reflow::{axis_size, box_position, limits, resolve_dimension, Limits, Offer, Realized};
use crate::widget::traits::Widget;
use crate::widget::{Ui, WidgetId};

// =============================================================================
// Cells
// =============================================================================

/// Per-child layout attributes within a container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    /// Horizontal alignment; inherits the container's `halign` when unset.
    pub halign: Option<Align>,
    /// Vertical alignment; inherits the container's `valign` when unset.
    pub valign: Option<Align>,
    /// Padding around the child, unscaled.
    pub padding: Sides,
    /// Offer the child the full width of the cell.
    pub fill_w: bool,
    /// Offer the child the full height of the cell.
    pub fill_h: bool,
    /// Minimum width (pixels, or a fraction of the inner box).
    pub minw: Option<f64>,
    /// Maximum width.
    pub maxw: Option<f64>,
    /// Minimum height.
    pub minh: Option<f64>,
    /// Maximum height.
    pub maxh: Option<f64>,
    /// Share of leftover main-axis space in box containers.
    pub expand: f64,
}

impl Cell {
    /// An empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal alignment.
    pub fn halign(mut self, align: Align) -> Self {
        self.halign = Some(align);
        self
    }

    /// Set the vertical alignment.
    pub fn valign(mut self, align: Align) -> Self {
        self.valign = Some(align);
        self
    }

    /// Set the padding.
    pub fn padding(mut self, padding: Sides) -> Self {
        self.padding = padding;
        self
    }

    /// Set the fill flags.
    pub fn fill(mut self, w: bool, h: bool) -> Self {
        self.fill_w = w;
        self.fill_h = h;
        self
    }

    /// Set the width limits.
    pub fn width_limits(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.minw = min;
        self.maxw = max;
        self
    }

    /// Set the height limits.
    pub fn height_limits(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.minh = min;
        self.maxh = max;
        self
    }

    /// Set the expand weight.
    pub fn expand(mut self, weight: f64) -> Self {
        self.expand = weight;
        self
    }

    /// Build a cell from attribute form: `halign`, `valign`, `padding`
    /// (any sides shorthand) and `tpadding`..`lpadding`, `fillw`, `fillh`,
    /// `minw`, `maxw`, `minh`, `maxh`, `expand`.
    ///
    /// ```
    /// use trellis::prelude::*;
    ///
    /// let cell = Cell::from_attrs(&attrs! { "halign" => "center", "padding" => [2, 4] }).unwrap();
    /// assert_eq!(cell.halign, Some(Align::Center));
    /// assert_eq!(cell.padding.left, 4.0);
    /// ```
    pub fn from_attrs(attrs: &AttrMap) -> AttributeResult<Cell> {
        let number = |name: &str| attrs.get(name).and_then(Value::as_f64);
        let flag = |name: &str| attrs.get(name).is_some_and(Value::truthy);
        let align = |name: &str, table: &trellis_core::EnumTable| -> AttributeResult<Option<Align>> {
            match attrs.get(name) {
                None => Ok(None),
                Some(v) => table
                    .lookup(v)
                    .map(|c| Align::from_constant(Some(c as f64)))
                    .ok_or_else(|| trellis_core::AttributeError::invalid(name, format!("unknown constant `{v}`"))),
            }
        };

        let mut padding = match attrs.get("padding") {
            Some(v) => parse_sides("padding", v)?,
            None => Sides::default(),
        };
        for (side, slot) in [
            ("tpadding", &mut padding.top),
            ("rpadding", &mut padding.right),
            ("bpadding", &mut padding.bottom),
            ("lpadding", &mut padding.left),
        ] {
            if let Some(v) = number(side) {
                *slot = v;
            }
        }

        Ok(Cell {
            halign: align("halign", &HALIGN)?,
            valign: align("valign", &VALIGN)?,
            padding,
            fill_w: flag("fillw"),
            fill_h: flag("fillh"),
            minw: number("minw"),
            maxw: number("maxw"),
            minh: number("minh"),
            maxh: number("maxh"),
            expand: number("expand").unwrap_or(0.0),
        })
    }
}

// =============================================================================
// Child List
// =============================================================================

#[derive(Debug, Clone)]
pub(crate) struct ChildEntry {
    pub(crate) id: WidgetId,
    pub(crate) cell: Cell,
}

/// The ordered children of a container.
#[derive(Debug, Default)]
pub struct Children {
    pub(crate) entries: Vec<ChildEntry>,
    /// Indices into `entries` in paint order: by z, insertion order within
    /// a z level.
    pub(crate) zorder: Vec<usize>,
    index: OnceCell<HashMap<WidgetId, usize>>,
}

impl Children {
    /// Child ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of a child, from a lazily built lookup table.
    pub fn index_of(&self, id: WidgetId) -> Option<usize> {
        self.index
            .get_or_init(|| self.entries.iter().enumerate().map(|(i, e)| (e.id, i)).collect())
            .get(&id)
            .copied()
    }

    fn invalidate(&mut self) {
        self.index = OnceCell::new();
    }
}

// =============================================================================
// Container Operations
// =============================================================================

impl Ui {
    fn children_ref(&self, parent: WidgetId) -> TreeResult<&Children> {
        let node = self.node(parent)?;
        node.children.as_ref().ok_or(TreeError::NotAContainer {
            class: node.base.class_name(),
        })
    }

    fn children_mut(&mut self, parent: WidgetId) -> TreeResult<&mut Children> {
        let node = self.node_mut(parent)?;
        let class = node.base.class_name();
        node.children.as_mut().ok_or(TreeError::NotAContainer { class })
    }

    /// Append a child.
    pub fn add(&mut self, parent: WidgetId, child: WidgetId, cell: Cell) -> TreeResult<()> {
        let len = self.children_ref(parent)?.len();
        self.insert(parent, len, child, cell)
    }

    /// Insert a child at `index`. A child that already has a parent is
    /// detached from it first.
    pub fn insert(&mut self, parent: WidgetId, index: usize, child: WidgetId, cell: Cell) -> TreeResult<()> {
        self.children_ref(parent)?;
        self.node(child)?;
        if self.is_ancestor(child, parent) {
            return Err(TreeError::CircularParentage);
        }
        self.detach(child);
        let children = self.children_mut(parent)?;
        if index > children.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: children.len(),
            });
        }
        children.entries.insert(index, ChildEntry { id: child, cell });
        self.node_mut(child)?.base.parent = Some(parent);
        self.children_changed(parent);
        Ok(())
    }

    /// Replace the child at `index`, returning the detached previous child.
    pub fn replace(&mut self, parent: WidgetId, index: usize, child: WidgetId, cell: Cell) -> TreeResult<WidgetId> {
        let old = self.get_child(parent, index).ok_or(TreeError::IndexOutOfRange {
            index,
            len: self.children_ref(parent)?.len(),
        })?;
        if old == child {
            self.children_mut(parent)?.entries[index].cell = cell;
            self.children_changed(parent);
            return Ok(old);
        }
        self.remove_index(parent, index)?;
        self.insert(parent, index.min(self.children_ref(parent)?.len()), child, cell)?;
        Ok(old)
    }

    /// Remove a child.
    pub fn remove(&mut self, parent: WidgetId, child: WidgetId) -> TreeResult<()> {
        let index = self.child_index(parent, child).ok_or(TreeError::NotAChild)?;
        self.remove_index(parent, index).map(|_| ())
    }

    /// Remove the child at `index`, returning it. The child stays alive,
    /// detached and unrealized.
    pub fn remove_index(&mut self, parent: WidgetId, index: usize) -> TreeResult<WidgetId> {
        let children = self.children_mut(parent)?;
        if index >= children.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: children.len(),
            });
        }
        let entry = children.entries.remove(index);
        if let Some(node) = self.nodes.get_mut(entry.id) {
            node.base.parent = None;
        }
        self.unrealize(entry.id);
        self.children_changed(parent);
        Ok(entry.id)
    }

    /// Remove every child.
    pub fn clear(&mut self, parent: WidgetId) -> TreeResult<()> {
        let removed: Vec<WidgetId> = self.children_ref(parent)?.ids().collect();
        self.children_mut(parent)?.entries.clear();
        for id in removed {
            if let Some(node) = self.nodes.get_mut(id) {
                node.base.parent = None;
            }
            self.unrealize(id);
        }
        self.children_changed(parent);
        Ok(())
    }

    /// Move a child to `index`.
    pub fn reorder(&mut self, parent: WidgetId, child: WidgetId, index: usize) -> TreeResult<()> {
        let from = self.child_index(parent, child).ok_or(TreeError::NotAChild)?;
        let children = self.children_mut(parent)?;
        if index >= children.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: children.len(),
            });
        }
        let entry = children.entries.remove(from);
        children.entries.insert(index, entry);
        self.children_changed(parent);
        Ok(())
    }

    /// Move a child just before `target`.
    pub fn reorder_before(&mut self, parent: WidgetId, child: WidgetId, target: WidgetId) -> TreeResult<()> {
        let from = self.child_index(parent, child).ok_or(TreeError::NotAChild)?;
        let to = self.child_index(parent, target).ok_or(TreeError::NotAChild)?;
        self.reorder(parent, child, if from < to { to - 1 } else { to })
    }

    /// Move a child just after `target`.
    pub fn reorder_after(&mut self, parent: WidgetId, child: WidgetId, target: WidgetId) -> TreeResult<()> {
        let from = self.child_index(parent, child).ok_or(TreeError::NotAChild)?;
        let to = self.child_index(parent, target).ok_or(TreeError::NotAChild)?;
        self.reorder(parent, child, if from < to { to } else { to + 1 })
    }

    /// The child at `index`.
    pub fn get_child(&self, parent: WidgetId, index: usize) -> Option<WidgetId> {
        self.children_ref(parent).ok()?.entries.get(index).map(|e| e.id)
    }

    /// Index of a child within its container.
    pub fn child_index(&self, parent: WidgetId, child: WidgetId) -> Option<usize> {
        self.children_ref(parent).ok()?.index_of(child)
    }

    /// Children in insertion order. Empty for non-containers.
    pub fn children(&self, parent: WidgetId) -> Vec<WidgetId> {
        self.children_ref(parent).map(|c| c.ids().collect()).unwrap_or_default()
    }

    /// The cell of a child.
    pub fn cell(&self, parent: WidgetId, child: WidgetId) -> Option<&Cell> {
        let children = self.children_ref(parent).ok()?;
        children.entries.get(children.index_of(child)?).map(|e| &e.cell)
    }

    /// Replace the cell of a child.
    pub fn set_cell(&mut self, parent: WidgetId, child: WidgetId, cell: Cell) -> TreeResult<()> {
        let index = self.child_index(parent, child).ok_or(TreeError::NotAChild)?;
        self.children_mut(parent)?.entries[index].cell = cell;
        self.session.reflow.full = true;
        self.session.redraw = true;
        Ok(())
    }

    /// Children in paint order: lowest z first, insertion order within a z
    /// level. Event dispatch visits the reverse.
    pub fn paint_order(&self, parent: WidgetId) -> Vec<WidgetId> {
        self.children_ref(parent)
            .map(|c| c.zorder.iter().map(|i| c.entries[*i].id).collect())
            .unwrap_or_default()
    }

    /// Detach a widget from its parent, if it has one.
    pub(crate) fn detach(&mut self, child: WidgetId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(index) = self.child_index(parent, child)
            && let Ok(children) = self.children_mut(parent)
        {
            children.entries.remove(index);
            self.children_changed(parent);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.base.parent = None;
        }
    }

    fn children_changed(&mut self, parent: WidgetId) {
        if let Ok(children) = self.children_mut(parent) {
            children.invalidate();
        }
        self.restack(parent);
        self.session.reflow.full = true;
        self.session.redraw = true;
    }

    /// Rebuild the z-order index of a container.
    pub(crate) fn restack(&mut self, parent: WidgetId) {
        let Ok(children) = self.children_ref(parent) else {
            return;
        };
        let mut order: Vec<(i64, usize)> = children
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let z = self.base(e.id).and_then(|b| b.calc_f64("z")).unwrap_or(0.0);
                (z as i64, i)
            })
            .collect();
        order.sort_by_key(|(z, _)| *z);
        if let Ok(children) = self.children_mut(parent) {
            children.zorder = order.into_iter().map(|(_, i)| i).collect();
        }
    }

    /// Mark a widget and its descendants as not laid out.
    pub(crate) fn unrealize(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(w) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(w) {
                node.base.realized = false;
                node.base.drawn = false;
                node.base.mouseover = false;
                node.base.hovering = false;
                if let Some(children) = &node.children {
                    stack.extend(children.ids());
                }
            }
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Lay out a stacking container: each child at its natural position,
/// aligned against the running inner size.
pub fn reflow_container(cx: &mut WidgetCx<'_>, offer: &Offer) -> Realized {
    let ui = &mut *cx.ui;
    let id = cx.id;
    let Some(base) = ui.base(id) else {
        return Realized::default();
    };
    let s = offer.scale;
    let (x, y) = box_position(base, offer);
    let insets = base.insets(s);
    let explicit_w = resolve_dimension(base.calc_f64("w"), offer.w, s);
    let explicit_h = resolve_dimension(base.calc_f64("h"), offer.h, s);
    let limits_w = limits(base, "minw", "maxw", offer.w, s);
    let limits_h = limits(base, "minh", "maxh", offer.h, s);
    let default_halign = base.halign().unwrap_or_default();
    let default_valign = base.valign().unwrap_or_default();

    let outer_w = limits_w.apply(explicit_w.unwrap_or(offer.w));
    let outer_h = limits_h.apply(explicit_h.unwrap_or(offer.h));
    let inner_max_w = (outer_w - insets.horizontal()).max(0.0);
    let inner_max_h = (outer_h - insets.vertical()).max(0.0);

    // The running size starts at the inner size when it is already known.
    let fixed_w = explicit_w.is_some() || (offer.fill_w && offer.greedy_w);
    let fixed_h = explicit_h.is_some() || (offer.fill_h && offer.greedy_h);
    let mut inner_w: f64 = if fixed_w { inner_max_w } else { 0.0 };
    let mut inner_h: f64 = if fixed_h { inner_max_h } else { 0.0 };

    let entries: Vec<ChildEntry> = ui
        .node(id)
        .ok()
        .and_then(|n| n.children.as_ref())
        .map(|c| c.entries.clone())
        .unwrap_or_default();

    let mut used_full_w = false;
    let mut used_full_h = false;
    for entry in &entries {
        let Some(child) = ui.base(entry.id) else {
            continue;
        };
        if !child.is_visible() {
            ui.unrealize(entry.id);
            continue;
        }
        let cp = (child.margin() + entry.cell.padding).scaled(s);
        let x0 = child.calc_f64("x").unwrap_or(0.0) * s;
        let y0 = child.calc_f64("y").unwrap_or(0.0) * s;
        let cell_w = Limits {
            min: resolve_dimension(entry.cell.minw, inner_max_w, s),
            max: resolve_dimension(entry.cell.maxw, inner_max_w, s),
        };
        let cell_h = Limits {
            min: resolve_dimension(entry.cell.minh, inner_max_h, s),
            max: resolve_dimension(entry.cell.maxh, inner_max_h, s),
        };

        let child_offer = Offer {
            x: insets.left + cp.left,
            y: insets.top + cp.top,
            w: (inner_max_w - cp.horizontal() - x0).max(0.0),
            h: (inner_max_h - cp.vertical() - y0).max(0.0),
            fill_w: entry.cell.fill_w,
            fill_h: entry.cell.fill_h,
            window: offer.window,
            viewport: offer.viewport,
            ..*offer
        };
        let Some(r) = ui.reflow(entry.id, Some(child_offer)) else {
            continue;
        };
        let ww = cell_w.apply(r.w);
        let wh = cell_h.apply(r.h);
        used_full_w |= r.used_full_w;
        used_full_h |= r.used_full_h;

        let wx = match entry.cell.halign.unwrap_or(default_halign) {
            Align::Start => r.x,
            Align::Center => insets.left + x0 + cp.left + ((inner_w - ww - cp.horizontal()) / 2.0).max(0.0),
            Align::End => insets.left + x0 + (inner_w - ww - cp.right).max(0.0),
        };
        let wy = match entry.cell.valign.unwrap_or(default_valign) {
            Align::Start => r.y,
            Align::Center => insets.top + y0 + cp.top + ((inner_h - wh - cp.vertical()) / 2.0).max(0.0),
            Align::End => insets.top + y0 + (inner_h - wh - cp.bottom).max(0.0),
        };
        if let Some(node) = ui.nodes.get_mut(entry.id) {
            node.base.geometry = Geometry { x: wx, y: wy, w: ww, h: wh };
        }
        inner_w = inner_w.max(wx - insets.left + ww + cp.right);
        inner_h = inner_h.max(wy - insets.top + wh + cp.bottom);
    }
    ui.restack(id);

    let (w, full_w) = axis_size(
        explicit_w,
        inner_w,
        insets.horizontal(),
        offer.w,
        offer.fill_w,
        offer.greedy_w,
        offer.clamp_w,
        limits_w,
    );
    let (h, full_h) = axis_size(
        explicit_h,
        inner_h,
        insets.vertical(),
        offer.h,
        offer.fill_h,
        offer.greedy_h,
        offer.clamp_h,
        limits_h,
    );
    tracing::trace!(target: targets::REFLOW, ?id, w, h, children = entries.len(), "container reflowed");
    Realized {
        x,
        y,
        w,
        h,
        used_full_w: full_w || used_full_w,
        used_full_h: full_h || used_full_h,
    }
}

// =============================================================================
// Container Widget
// =============================================================================

/// Attributes of stacking containers.
pub static CONTAINER_ATTRS: LazyLock<AttributeTable> =
    LazyLock::new(|| build_table(Some(&WIDGET_ATTRS), "Container", vec![]));

/// A container that stacks its children at their natural positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Container;

impl Widget for Container {
    fn attributes(&self) -> &'static AttributeTable {
        &CONTAINER_ATTRS
    }

    fn is_container(&self) -> bool {
        true
    }

    fn reflow(&mut self, cx: &mut WidgetCx<'_>, offer: &Offer) -> Realized {
        reflow_container(cx, offer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::widget::widgets::Spacer;

    fn setup() -> Ui {
        Ui::new(UiConfig::default())
    }

    fn spacer(ui: &mut Ui, w: f64, h: f64) -> WidgetId {
        let mut attrs = AttrMap::new();
        attrs.insert("w".into(), Value::from(w));
        attrs.insert("h".into(), Value::from(h));
        ui.spawn(Spacer, attrs).unwrap()
    }

    #[test]
    fn test_add_detaches_from_previous_parent() {
        let mut ui = setup();
        let a = ui.spawn(Container, AttrMap::new()).unwrap();
        let b = ui.spawn(Container, AttrMap::new()).unwrap();
        let s = spacer(&mut ui, 10.0, 10.0);
        ui.add(a, s, Cell::new()).unwrap();
        ui.add(b, s, Cell::new()).unwrap();
        assert!(ui.children(a).is_empty());
        assert_eq!(ui.children(b), vec![s]);
        assert_eq!(ui.parent(s), Some(b));
    }

    #[test]
    fn test_non_container_parent_rejected() {
        let mut ui = setup();
        let s = spacer(&mut ui, 10.0, 10.0);
        let t = spacer(&mut ui, 10.0, 10.0);
        assert_eq!(ui.add(s, t, Cell::new()), Err(TreeError::NotAContainer { class: "Spacer" }));
    }

    #[test]
    fn test_circular_parentage_rejected() {
        let mut ui = setup();
        let outer = ui.spawn(Container, AttrMap::new()).unwrap();
        let inner = ui.spawn(Container, AttrMap::new()).unwrap();
        ui.add(outer, inner, Cell::new()).unwrap();
        assert_eq!(ui.add(inner, outer, Cell::new()), Err(TreeError::CircularParentage));
        assert_eq!(ui.add(inner, inner, Cell::new()), Err(TreeError::CircularParentage));
    }

    #[test]
    fn test_reorder_and_index_cache() {
        let mut ui = setup();
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        let ids: Vec<_> = (0..4).map(|_| spacer(&mut ui, 1.0, 1.0)).collect();
        for id in &ids {
            ui.add(c, *id, Cell::new()).unwrap();
        }
        assert_eq!(ui.child_index(c, ids[2]), Some(2));
        ui.reorder(c, ids[3], 0).unwrap();
        assert_eq!(ui.children(c), vec![ids[3], ids[0], ids[1], ids[2]]);
        assert_eq!(ui.child_index(c, ids[2]), Some(3));
        ui.reorder_after(c, ids[3], ids[1]).unwrap();
        assert_eq!(ui.children(c), vec![ids[0], ids[1], ids[3], ids[2]]);
        ui.reorder_before(c, ids[2], ids[0]).unwrap();
        assert_eq!(ui.children(c), vec![ids[2], ids[0], ids[1], ids[3]]);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut ui = setup();
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        let a = spacer(&mut ui, 1.0, 1.0);
        let b = spacer(&mut ui, 1.0, 1.0);
        ui.add(c, a, Cell::new()).unwrap();
        assert_eq!(ui.replace(c, 0, b, Cell::new()).unwrap(), a);
        assert_eq!(ui.parent(a), None);
        assert_eq!(ui.children(c), vec![b]);
        assert_eq!(ui.remove(c, a), Err(TreeError::NotAChild));
        ui.remove(c, b).unwrap();
        assert!(ui.children(c).is_empty());
        assert_eq!(
            ui.remove_index(c, 0),
            Err(TreeError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_z_order_stable_within_level() {
        let mut ui = setup();
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        let a = spacer(&mut ui, 1.0, 1.0);
        let b = spacer(&mut ui, 1.0, 1.0);
        let top = spacer(&mut ui, 1.0, 1.0);
        ui.attr(top, "z", 5).unwrap();
        ui.add(c, top, Cell::new()).unwrap();
        ui.add(c, a, Cell::new()).unwrap();
        ui.add(c, b, Cell::new()).unwrap();
        assert_eq!(ui.paint_order(c), vec![a, b, top]);

        ui.attr(top, "z", -1).unwrap();
        assert_eq!(ui.paint_order(c), vec![top, a, b]);
    }

    #[test]
    fn test_right_alignment_ignores_left_cell_padding() {
        let mut ui = setup();
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        ui.attr(c, "w", 100).unwrap();
        let s = spacer(&mut ui, 20.0, 10.0);
        ui.add(c, s, Cell::new().halign(Align::End).padding(Sides::new(0.0, 5.0, 0.0, 30.0)))
            .unwrap();
        ui.reflow(c, Some(Offer::new(300.0, 300.0))).unwrap();
        assert_eq!(ui.base(s).unwrap().geometry().x, 75.0);
    }

    #[test]
    fn test_shrinkwraps_to_children_plus_padding() {
        let mut ui = setup();
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        ui.attr(c, "padding", 4).unwrap();
        let s = spacer(&mut ui, 30.0, 20.0);
        ui.attr(s, "x", 10).unwrap();
        ui.add(c, s, Cell::new()).unwrap();
        let r = ui.reflow(c, Some(Offer::new(500.0, 500.0))).unwrap();
        assert_eq!((r.w, r.h), (48.0, 28.0));
        assert_eq!(ui.base(s).unwrap().geometry().x, 14.0);
    }

    #[test]
    fn test_hidden_children_are_unrealized() {
        let mut ui = setup();
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        let s = spacer(&mut ui, 30.0, 20.0);
        ui.add(c, s, Cell::new()).unwrap();
        ui.reflow(c, Some(Offer::new(100.0, 100.0))).unwrap();
        ui.realize_geometry(c);
        assert!(ui.base(s).unwrap().is_realized());

        ui.attr(s, "visible", false).unwrap();
        let r = ui.reflow(c, Some(Offer::new(100.0, 100.0))).unwrap();
        assert!(!ui.base(s).unwrap().is_realized());
        assert_eq!(r.w, 0.0);
    }

    #[test]
    fn test_cell_from_attrs_rejects_bad_alignment() {
        let mut attrs = AttrMap::new();
        attrs.insert("valign".into(), Value::from("sideways"));
        assert!(Cell::from_attrs(&attrs).is_err());
    }
}
