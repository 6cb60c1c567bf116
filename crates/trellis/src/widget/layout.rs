//! Layout and paint passes over the arena.
//!
//! [`Ui::reflow`] runs a widget's layout hook and stores the result,
//! [`Ui::realize_geometry`] turns parent-relative geometry into window
//! coordinates once the whole subtree is placed, and [`Ui::draw`] paints
//! back to front.

use trellis_core::logging::{span_names, targets};
use trellis_core::PerfSpan;

use super::base::{Geometry, WidgetBase};
use super::context::WidgetCx;
use super::painting::Canvas;
use super::reflow::{Offer, Realized};
use super::traits::PaintContext;
use super::{Ui, WidgetId};

impl Ui {
    /// Lay out a widget.
    ///
    /// With `Some(offer)` the widget is laid out in that box; the parent is
    /// responsible for aligning it and realizing it afterwards. With `None`
    /// the last offered box is replayed (a partial reflow) and the widget is
    /// realized right away, keeping its aligned position. If a replay changes
    /// the widget's size, a full reflow is queued so the parent can adapt.
    ///
    /// Returns `None` if the widget does not exist, or if `None` was passed
    /// and the widget has never been laid out.
    pub fn reflow(&mut self, id: WidgetId, offer: Option<Offer>) -> Option<Realized> {
        let replay = offer.is_none();
        let offer = match offer {
            Some(offer) => offer,
            None => *self.base(id)?.last_offer()?,
        };
        let node = self.nodes.get_mut(id)?;
        let previous = node.base.geometry;
        node.base.last_offer = Some(offer);

        let realized = self.with_widget(id, |w, cx| w.reflow(cx, &offer))?;
        let node = self.nodes.get_mut(id)?;
        if replay {
            node.base.geometry = Geometry {
                x: previous.x,
                y: previous.y,
                w: realized.w,
                h: realized.h,
            };
            if (previous.w, previous.h) != (realized.w, realized.h) {
                tracing::debug!(target: targets::REFLOW, ?id, "partial reflow changed size, escalating");
                self.session.reflow.full = true;
            }
            self.realize_geometry(id);
            self.session.redraw = true;
        } else {
            node.base.geometry = Geometry {
                x: realized.x,
                y: realized.y,
                w: realized.w,
                h: realized.h,
            };
        }

        if let Some(mut handler) = self.nodes.get_mut(id).and_then(|n| n.base.handlers.reflow.take()) {
            handler(&mut WidgetCx::new(self, id));
            if let Some(node) = self.nodes.get_mut(id) {
                node.base.handlers.reflow.get_or_insert(handler);
            }
        }
        Some(realized)
    }

    /// Compute window coordinates for a widget and its descendants from the
    /// parent's client position, and let each kind compute draw state.
    pub fn realize_geometry(&mut self, id: WidgetId) {
        let (px, py) = self
            .parent(id)
            .and_then(|p| self.base(p))
            .map(WidgetBase::client_pos)
            .unwrap_or_default();
        self.realize_at(id, px, py);
    }

    fn realize_at(&mut self, id: WidgetId, px: f64, py: f64) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.base.is_visible() {
            self.unrealize(id);
            return;
        }
        let base = &mut node.base;
        base.client_x = px + base.geometry.x;
        base.client_y = py + base.geometry.y;
        base.realized = true;
        let (cx, cy) = (base.client_x, base.client_y);
        let children: Vec<WidgetId> = node.children.as_ref().map(|c| c.ids().collect()).unwrap_or_default();

        self.with_widget(id, |w, cx| w.realize(cx));
        for child in children {
            self.realize_at(child, cx, cy);
        }
    }

    /// Paint a widget and its descendants.
    ///
    /// Positions are composed from the parent's client position, alpha from
    /// the ancestors' `alpha`. Children paint lowest z first.
    pub fn draw(&mut self, id: WidgetId, canvas: &mut dyn Canvas) {
        let _span = PerfSpan::new(span_names::DRAW);
        let (ox, oy) = self
            .parent(id)
            .and_then(|p| self.base(p))
            .map(WidgetBase::client_pos)
            .unwrap_or_default();
        self.draw_at(id, canvas, ox, oy, 1.0);
        self.session.redraw = false;
    }

    fn draw_at(&mut self, id: WidgetId, canvas: &mut dyn Canvas, offx: f64, offy: f64, alpha: f64) {
        let scale = self.session.config.scale;
        let focused = self.session.focused == Some(id);
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let base = &node.base;
        if !base.is_visible() || !base.realized {
            self.mark_undrawn(id);
            return;
        }
        let g = base.geometry;
        let (x, y) = (offx + g.x, offy + g.y);
        let alpha = alpha * base.calc_f64("alpha").unwrap_or(1.0).clamp(0.0, 1.0);

        canvas.begin_widget(id);
        canvas.set_alpha(alpha);
        if let Some(widget) = node.widget.as_deref() {
            let mut ctx = PaintContext {
                base,
                canvas: &mut *canvas,
                x,
                y,
                scale,
                alpha,
                metrics: self.metrics(),
                focused,
            };
            widget.paint(&mut ctx);
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.base.drawn = true;
        }
        for child in self.paint_order(id) {
            self.draw_at(child, canvas, x, y, alpha);
        }
    }

    fn mark_undrawn(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(w) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(w) {
                node.base.drawn = false;
                if let Some(children) = &node.children {
                    stack.extend(children.ids());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::widget::painting::{DrawOp, RecordingCanvas};
    use crate::widget::widgets::{Cell, Container, Spacer};
    use trellis_core::{AttrMap, Value};

    fn sized(ui: &mut Ui, w: f64, h: f64) -> WidgetId {
        let mut attrs = AttrMap::new();
        attrs.insert("w".into(), Value::from(w));
        attrs.insert("h".into(), Value::from(h));
        ui.spawn(Spacer, attrs).unwrap()
    }

    #[test]
    fn test_replay_requires_previous_offer() {
        let mut ui = Ui::new(UiConfig::default());
        let s = sized(&mut ui, 10.0, 10.0);
        assert!(ui.reflow(s, None).is_none());
        ui.reflow(s, Some(Offer::new(50.0, 50.0))).unwrap();
        assert!(ui.reflow(s, None).is_some());
    }

    #[test]
    fn test_replay_keeps_position_and_escalates_on_resize() {
        let mut ui = Ui::new(UiConfig::default());
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        ui.attr(c, "w", 100).unwrap();
        let s = sized(&mut ui, 10.0, 10.0);
        ui.add(c, s, Cell::new().halign(crate::widget::base::Align::End)).unwrap();
        ui.reflow(c, Some(Offer::new(200.0, 200.0))).unwrap();
        ui.realize_geometry(c);
        ui.session.reflow.clear();

        ui.reflow(s, None).unwrap();
        assert_eq!(ui.base(s).unwrap().geometry().x, 90.0);
        assert!(!ui.session().reflow_queue().full);

        ui.attr(s, "w", 20).unwrap();
        ui.session.reflow.clear();
        ui.reflow(s, None).unwrap();
        assert!(ui.session().reflow_queue().full);
    }

    #[test]
    fn test_client_positions_compose() {
        let mut ui = Ui::new(UiConfig::default());
        let outer = ui.spawn(Container, AttrMap::new()).unwrap();
        let inner = ui.spawn(Container, AttrMap::new()).unwrap();
        ui.attr(inner, "x", 10).unwrap();
        ui.attr(inner, "padding", 5).unwrap();
        let s = sized(&mut ui, 4.0, 4.0);
        ui.add(outer, inner, Cell::new()).unwrap();
        ui.add(inner, s, Cell::new()).unwrap();
        ui.reflow(outer, Some(Offer::new(100.0, 100.0).at(3.0, 0.0))).unwrap();
        ui.realize_geometry(outer);
        assert_eq!(ui.base(s).unwrap().client_pos(), (18.0, 5.0));
    }

    #[test]
    fn test_draw_skips_unrealized_and_composes_alpha() {
        let mut ui = Ui::new(UiConfig::default());
        let c = ui.spawn(Container, AttrMap::new()).unwrap();
        ui.attr(c, "alpha", 0.5).unwrap();
        let a = sized(&mut ui, 4.0, 4.0);
        let b = sized(&mut ui, 4.0, 4.0);
        ui.attr(a, "alpha", 0.5).unwrap();
        ui.add(c, a, Cell::new()).unwrap();
        ui.reflow(c, Some(Offer::new(100.0, 100.0))).unwrap();
        ui.realize_geometry(c);
        ui.add(c, b, Cell::new()).unwrap();

        let mut canvas = RecordingCanvas::new();
        ui.draw(c, &mut canvas);
        assert_eq!(canvas.widget_order(), vec![c, a]);
        assert!(canvas.ops.contains(&DrawOp::Alpha(0.25)));
        assert!(ui.base(a).unwrap().is_drawn());
        assert!(!ui.base(b).unwrap().is_drawn());
        assert!(!ui.session().needs_redraw());
    }
}
