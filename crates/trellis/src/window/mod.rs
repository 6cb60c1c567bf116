//! The window: root of a widget tree and driver of the update tick.
//!
//! A [`Window`] owns a [`Ui`] and a root container. The host calls
//! [`Window::update`] once per frame with the current time, an input
//! snapshot and a canvas; everything else (deferred callbacks, animations,
//! layout, event synthesis and dispatch, painting) happens inside the tick.
//!
//! # Tick order
//!
//! 1. Deferred callbacks that are due run.
//! 2. Animations advance.
//! 3. Pending layout work runs: a full reflow of the root, or a replay of
//!    each widget queued for partial reflow.
//! 4. Input is diffed against the previous snapshot and every resulting
//!    event is dispatched.
//! 5. A held press may turn into a long press.
//! 6. Layout queued by the handlers runs.
//! 7. If anything asked for a repaint, the tree is drawn back to front and
//!    the frame presented.
//!
//! # Window geometry
//!
//! The root's `x`/`y` place the window on screen and `w`/`h` size it. When
//! the program changes them (or `title`) through [`Ui::attr`], the change is
//! queued as a [`HostUpdate`] for the host to apply. Host-originated resizes
//! go through [`Window::resize`] and are not echoed back. A window without
//! `w` or `h` shrinkwraps its content on that axis.
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut window = Window::new(UiConfig::default()).unwrap();
//! let ui = window.ui_mut();
//! let ok = ui.spawn(Button::new(), attrs! { "label" => "OK" }).unwrap();
//! let root = window.root();
//! window.add(ok, Cell::new()).unwrap();
//!
//! let mut canvas = RecordingCanvas::new();
//! let report = window.update(0.0, &InputState::at(-1.0, -1.0), &mut canvas);
//! assert!(report.full_reflow && report.drawn);
//! assert_eq!(canvas.texts(), vec!["OK"]);
//! assert!(window.ui().base(root).unwrap().geometry().w > 0.0);
//! ```

use std::sync::LazyLock;
use std::time::Duration;

use trellis_core::attribute::Reflow;
use trellis_core::logging::{span_names, targets};
use trellis_core::{AttrMap, AttributeTable, PerfSpan, SlowOpWatch, Value};

use crate::config::UiConfig;
use crate::error::TreeResult;
use crate::widget::attributes::{build_table, string};
use crate::widget::context::WidgetCx;
use crate::widget::events::{Event, EventSynth, EventType, InputState};
use crate::widget::handlers::{AttrChange, AttrOrigin};
use crate::widget::painting::Canvas;
use crate::widget::reflow::{Offer, Realized};
use crate::widget::session::HostUpdate;
use crate::widget::traits::Widget;
use crate::widget::widgets::{reflow_container, Cell, CONTAINER_ATTRS};
use crate::widget::{Ui, WidgetId};

/// Root attributes the host is told about.
const HOST_ATTRS: [&str; 5] = ["x", "y", "w", "h", "title"];

/// Attributes of window roots.
pub static WINDOW_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| {
    build_table(
        Some(&CONTAINER_ATTRS),
        "Window",
        vec![("title", string().reflow(Reflow::None).no_redraw())],
    )
});

/// Root container of a window.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowRoot;

impl Widget for WindowRoot {
    fn attributes(&self) -> &'static AttributeTable {
        &WINDOW_ATTRS
    }

    fn is_container(&self) -> bool {
        true
    }

    fn reflow(&mut self, cx: &mut WidgetCx<'_>, offer: &Offer) -> Realized {
        // x/y are the window's screen position, not an offset inside it.
        let mut offer = *offer;
        offer.x -= cx.calc_f64("x").unwrap_or(0.0) * offer.scale;
        offer.y -= cx.calc_f64("y").unwrap_or(0.0) * offer.scale;
        reflow_container(cx, &offer)
    }

    fn attr_changed(&mut self, cx: &mut WidgetCx<'_>, change: &AttrChange) {
        if change.origin == AttrOrigin::Attr && HOST_ATTRS.contains(&change.name.as_str()) {
            tracing::debug!(target: targets::WINDOW, attr = %change.name, value = %change.value, "host update queued");
            cx.ui.session.host_updates.push(HostUpdate {
                attr: change.name.clone(),
                value: change.value.clone(),
            });
        }
    }
}

/// What one [`Window::update`] tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Deferred callbacks run.
    pub deferred: usize,
    /// Animations still running after the step.
    pub animations: usize,
    /// The root was laid out from scratch.
    pub full_reflow: bool,
    /// Widgets replayed by partial reflows.
    pub partial_reflows: usize,
    /// Events dispatched.
    pub events: usize,
    /// The pointer is over some widget.
    pub mouseover: bool,
    /// A frame was drawn and presented.
    pub drawn: bool,
    /// Time the tick took.
    pub elapsed: Duration,
}

/// A window and the UI it hosts.
pub struct Window {
    ui: Ui,
    root: WidgetId,
    synth: EventSynth,
    event: Event,
    size: (f64, f64),
}

impl Window {
    /// A window with no explicit size, shrinkwrapping its content.
    pub fn new(config: UiConfig) -> TreeResult<Self> {
        Self::with_attrs(config, AttrMap::new())
    }

    /// A window whose root starts with `attrs`.
    pub fn with_attrs(config: UiConfig, attrs: AttrMap) -> TreeResult<Self> {
        let mut ui = Ui::new(config);
        let root = ui.spawn(WindowRoot, attrs)?;
        // Initial values are the host's to read, not updates.
        ui.session.host_updates.clear();
        ui.queue_reflow();
        tracing::debug!(target: targets::WINDOW, ?root, "window created");
        Ok(Self {
            ui,
            root,
            synth: EventSynth::new(),
            event: Event::new(EventType::MouseMove),
            size: (0.0, 0.0),
        })
    }

    /// The hosted UI.
    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    /// The hosted UI, mutably.
    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    /// Root container.
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Size of the root after the last full reflow, in device pixels.
    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Add a widget to the root.
    pub fn add(&mut self, child: WidgetId, cell: Cell) -> TreeResult<()> {
        self.ui.add(self.root, child, cell)
    }

    /// Tell the window the host resized it. Sizes are unscaled pixels.
    pub fn resize(&mut self, w: f64, h: f64) -> TreeResult<()> {
        tracing::debug!(target: targets::WINDOW, w, h, "host resize");
        self.ui.sync(self.root, "w", w, None)?;
        self.ui.sync(self.root, "h", h, None)?;
        self.ui.queue_reflow();
        Ok(())
    }

    /// Take the window changes the host should apply.
    pub fn take_host_updates(&mut self) -> Vec<HostUpdate> {
        std::mem::take(&mut self.ui.session.host_updates)
    }

    /// Run one tick.
    pub fn update(&mut self, now: f64, input: &InputState, canvas: &mut dyn Canvas) -> TickReport {
        let _span = PerfSpan::new(span_names::UPDATE);
        let watch = SlowOpWatch::new("update", self.ui.config().update_warn_threshold);
        let mut report = TickReport::default();

        self.ui.session.now = now;
        report.deferred = self.ui.run_deferred(now);
        report.animations = self.ui.advance_animations(now);
        self.run_reflow(&mut report);

        for occurrence in self.synth.diff(input) {
            EventSynth::fill(&mut self.event, &occurrence, input, now);
            let over = self.ui.handle_event(self.root, &mut self.event);
            if self.event.kind != EventType::KeyPress {
                report.mouseover = over;
            }
            report.events += 1;
        }
        self.ui.check_long_press(now);
        self.run_reflow(&mut report);

        if self.ui.session.needs_redraw() {
            self.ui.draw(self.root, canvas);
            canvas.present();
            report.drawn = true;
        }
        report.elapsed = watch.finish();
        report
    }

    fn run_reflow(&mut self, report: &mut TickReport) {
        if !self.ui.session.reflow_queue().is_pending() {
            return;
        }
        let _span = PerfSpan::new(span_names::REFLOW);
        let watch = SlowOpWatch::new("reflow", self.ui.config().reflow_warn_threshold);

        if !self.ui.session.reflow.full {
            for id in self.ui.session.reflow.take_partial() {
                if self.ui.reflow(id, None).is_some() {
                    report.partial_reflows += 1;
                }
            }
        }
        // A replay that changed a widget's size escalates to a full reflow.
        if self.ui.session.reflow.full {
            self.ui.session.reflow.clear();
            self.full_reflow();
            report.full_reflow = true;
        }
        watch.finish();
    }

    fn full_reflow(&mut self) {
        let config = self.ui.config();
        let scale = config.scale;
        let (limit_w, limit_h) = config.shrinkwrap_limit;
        let Some(base) = self.ui.base(self.root) else {
            return;
        };
        let w = base.calc_f64("w");
        let h = base.calc_f64("h");
        let offer = Offer::new(w.unwrap_or(limit_w) * scale, h.unwrap_or(limit_h) * scale)
            .greedy(w.is_some(), h.is_some())
            .fill(true, true)
            .scaled(scale);
        let Some(realized) = self.ui.reflow(self.root, Some(offer)) else {
            return;
        };
        self.ui.realize_geometry(self.root);
        self.ui.queue_draw();

        let size = (realized.w, realized.h);
        if size != self.size {
            tracing::debug!(target: targets::WINDOW, w = size.0, h = size.1, "window laid out");
            // A shrinkwrapped axis tells the host the size it settled on.
            for (attr, explicit, value) in [("w", w, size.0), ("h", h, size.1)] {
                if explicit.is_none() {
                    self.ui.session.host_updates.push(HostUpdate {
                        attr: attr.to_string(),
                        value: Value::Number(value / scale),
                    });
                }
            }
            self.size = size;
        }
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("root", &self.root)
            .field("size", &self.size)
            .field("ui", &self.ui)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::events::MouseButtons;
    use crate::widget::AttrOptions;
    use crate::widget::handlers::{HandlerKind, HandlerResult};
    use crate::widget::painting::RecordingCanvas;
    use crate::widget::widgets::{Button, Spacer};
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    fn sized(w: f64, h: f64) -> Window {
        crate::test_logging::init();
        let mut attrs = AttrMap::new();
        attrs.insert("w".into(), Value::from(w));
        attrs.insert("h".into(), Value::from(h));
        Window::with_attrs(UiConfig::default(), attrs).unwrap()
    }

    fn spacer(window: &mut Window, w: f64, h: f64) -> WidgetId {
        let mut attrs = AttrMap::new();
        attrs.insert("w".into(), Value::from(w));
        attrs.insert("h".into(), Value::from(h));
        let id = window.ui_mut().spawn(Spacer, attrs).unwrap();
        window.add(id, Cell::new()).unwrap();
        id
    }

    #[test]
    fn test_slow_update_is_logged() {
        let config = UiConfig::default().with_warn_thresholds(Duration::ZERO, Duration::ZERO);
        let mut attrs = AttrMap::new();
        attrs.insert("w".into(), Value::from(100.0));
        attrs.insert("h".into(), Value::from(100.0));
        let mut window = Window::with_attrs(config, attrs).unwrap();
        let logs = crate::test_logging::capture("trellis::perf=warn", || {
            window.update(0.0, &InputState::default(), &mut RecordingCanvas::new());
        });
        assert!(logs.contains("slow update"));
        assert!(logs.contains("trellis::perf"));
    }

    #[test]
    fn test_slow_update_quiet_within_budget() {
        let mut window = sized(100.0, 100.0);
        let logs = crate::test_logging::capture("trellis::perf=warn", || {
            window.update(0.0, &InputState::default(), &mut RecordingCanvas::new());
        });
        assert!(!logs.contains("slow update"));
    }

    #[test]
    fn test_shrinkwrap_reports_size() {
        let mut window = Window::new(UiConfig::default()).unwrap();
        spacer(&mut window, 120.0, 80.0);
        let mut canvas = RecordingCanvas::new();
        window.update(0.0, &InputState::default(), &mut canvas);
        assert_eq!(window.size(), (120.0, 80.0));
        let updates = window.take_host_updates();
        assert_eq!(
            updates,
            vec![
                HostUpdate { attr: "w".into(), value: Value::Number(120.0) },
                HostUpdate { attr: "h".into(), value: Value::Number(80.0) },
            ]
        );
    }

    #[test]
    fn test_programmatic_geometry_reaches_host_but_resize_does_not() {
        let mut window = sized(640.0, 480.0);
        let root = window.root();
        assert!(window.take_host_updates().is_empty());

        window.ui_mut().attr(root, "title", "Editor").unwrap();
        window.ui_mut().attr(root, "w", 800).unwrap();
        let updates = window.take_host_updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].attr, "title");
        assert_eq!(updates[1].value, Value::Number(800.0));

        window.resize(1024.0, 768.0).unwrap();
        assert!(window.take_host_updates().is_empty());
        let mut canvas = RecordingCanvas::new();
        window.update(0.0, &InputState::default(), &mut canvas);
        assert_eq!(window.size(), (1024.0, 768.0));
    }

    #[test]
    fn test_redraw_only_when_needed() {
        let mut window = sized(200.0, 200.0);
        spacer(&mut window, 10.0, 10.0);
        let mut canvas = RecordingCanvas::new();
        assert!(window.update(0.0, &InputState::at(500.0, 500.0), &mut canvas).drawn);
        let report = window.update(0.1, &InputState::at(500.0, 500.0), &mut canvas);
        assert!(!report.drawn);
        assert_eq!(report.events, 0);
        assert_eq!(canvas.frames(), 1);
    }

    #[test]
    fn test_partial_reflow_escalates_on_size_change() {
        let mut window = sized(200.0, 200.0);
        let s = spacer(&mut window, 10.0, 10.0);
        let mut canvas = RecordingCanvas::new();
        window.update(0.0, &InputState::default(), &mut canvas);

        let ui = window.ui_mut();
        ui.session.reflow.push(s);
        let report = window.update(0.1, &InputState::default(), &mut canvas);
        assert_eq!(report.partial_reflows, 1);
        assert!(!report.full_reflow);

        let partial = AttrOptions::default().with_reflow(Reflow::Partial);
        window.ui_mut().attr_with(s, "w", 30, partial).unwrap();
        let report = window.update(0.2, &InputState::default(), &mut canvas);
        assert!(report.full_reflow);
        assert_eq!(window.ui().base(s).unwrap().geometry().w, 30.0);
    }

    #[test]
    fn test_click_through_input_snapshots() {
        let mut window = sized(200.0, 100.0);
        let mut attrs = AttrMap::new();
        attrs.insert("label".into(), Value::from("Go"));
        let b = window.ui_mut().spawn(Button::new(), attrs).unwrap();
        window.add(b, Cell::new()).unwrap();
        let clicks = Rc::new(Counter::new(0));
        let c = clicks.clone();
        window
            .ui_mut()
            .on(b, HandlerKind::Click, move |_, _| {
                c.set(c.get() + 1);
                HandlerResult::Handled
            })
            .unwrap();

        let mut canvas = RecordingCanvas::new();
        let at = InputState::at(5.0, 5.0);
        assert!(window.update(0.0, &at, &mut canvas).mouseover);
        window.update(0.1, &at.clone().with_buttons(MouseButtons::LEFT), &mut canvas);
        assert!(window.ui().widget::<Button>(b).unwrap().is_pressed());
        window.update(0.2, &at, &mut canvas);
        assert_eq!(clicks.get(), 1);
        assert_eq!(window.ui().focused(), Some(b));
    }

    #[test]
    fn test_deferred_and_animation_in_tick() {
        let mut window = sized(100.0, 100.0);
        let s = spacer(&mut window, 10.0, 10.0);
        window.ui_mut().call_after(0.5, move |ui| {
            ui.attr(s, "alpha", 0.5).unwrap();
        });
        let mut canvas = RecordingCanvas::new();
        assert_eq!(window.update(0.0, &InputState::default(), &mut canvas).deferred, 0);
        assert_eq!(window.update(0.4, &InputState::default(), &mut canvas).deferred, 0);
        assert_eq!(window.update(0.5, &InputState::default(), &mut canvas).deferred, 1);
        assert_eq!(window.ui().calc(s, "alpha"), Some(Value::Number(0.5)));
    }
}
