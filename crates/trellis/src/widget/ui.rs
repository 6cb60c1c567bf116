//! The widget arena.
//!
//! [`Ui`] owns every widget of a session in a slotmap: the shared
//! [`WidgetBase`], the kind object implementing [`Widget`], and for
//! containers the ordered child list. Widgets refer to each other by
//! [`WidgetId`]; a parent owns its children for layout purposes, children
//! keep a non-owning back reference.
//!
//! Attributes are only ever changed through [`Ui::attr`] (programmatic
//! changes) and [`Ui::sync`] (a widget updating its own state), which keep
//! the exterior and calculated value spaces consistent, notify handlers and
//! queue layout and repaint work.

use std::collections::HashMap;

use slotmap::SlotMap;
use trellis_core::logging::targets;
use trellis_core::{Assign, AttrMap, AttributeError, Reflow, Value};

use super::base::WidgetBase;
use super::context::WidgetCx;
use super::events::Event;
use super::handlers::{AttrChange, AttrOrigin, HandlerKind, HandlerResult};
use super::painting::{FontMetrics, MonospaceMetrics};
use super::session::Session;
use super::traits::Widget;
use super::widgets::Children;
use super::WidgetId;
use crate::config::UiConfig;
use crate::error::{TreeError, TreeResult};

/// One widget in the arena.
pub(crate) struct Node {
    pub(crate) base: WidgetBase,
    /// Checked out while one of the kind's hooks runs.
    pub(crate) widget: Option<Box<dyn Widget>>,
    /// Present for containers.
    pub(crate) children: Option<Children>,
}

/// Options for [`Ui::attr_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttrOptions {
    /// Fire change handling even if nothing changed.
    pub trigger: bool,
    /// Override the attribute's reflow policy.
    pub reflow: Option<Reflow>,
}

impl AttrOptions {
    /// Options that force change handling.
    pub fn trigger() -> Self {
        Self {
            trigger: true,
            reflow: None,
        }
    }

    /// Same options with a reflow policy override.
    pub fn with_reflow(mut self, reflow: Reflow) -> Self {
        self.reflow = Some(reflow);
        self
    }
}

/// The widget arena and session of one UI.
pub struct Ui {
    pub(crate) nodes: SlotMap<WidgetId, Node>,
    pub(crate) session: Session,
    refs: HashMap<String, WidgetId>,
    metrics: Box<dyn FontMetrics>,
}

impl Ui {
    /// An empty UI with monospace text metrics.
    pub fn new(config: UiConfig) -> Self {
        Self::with_metrics(config, Box::new(MonospaceMetrics::default()))
    }

    /// An empty UI measuring text with `metrics`.
    pub fn with_metrics(config: UiConfig, metrics: Box<dyn FontMetrics>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            session: Session::new(config),
            refs: HashMap::new(),
            metrics,
        }
    }

    /// Session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session configuration.
    pub fn config(&self) -> &UiConfig {
        &self.session.config
    }

    /// Text metrics.
    pub fn metrics(&self) -> &dyn FontMetrics {
        self.metrics.as_ref()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a widget.
    ///
    /// The exterior values are the class defaults overlaid with `attrs`;
    /// calculated values are computed for non-priority attributes first and
    /// priority attributes second. The widget starts detached.
    pub fn spawn<W: Widget>(&mut self, widget: W, attrs: AttrMap) -> TreeResult<WidgetId> {
        let table = widget.attributes();
        let mut base = WidgetBase::new(table);

        let mut exterior = attrs;
        for name in table.names() {
            if !exterior.contains_key(name)
                && let Some(default) = table.default_value(name, &exterior)
            {
                exterior.insert(name.to_string(), default);
            }
        }

        let mut calc = AttrMap::new();
        for priority in [false, true] {
            for name in table.names() {
                let is_priority = table.get(name).is_some_and(|d| d.priority);
                if is_priority != priority {
                    continue;
                }
                if let Some(value) = exterior.get(name) {
                    let c = table.calculate(name, value, &calc)?;
                    calc.insert(name.to_string(), c.value);
                    calc.extend(c.fields);
                }
            }
        }
        for (name, value) in &exterior {
            if !table.contains(name) {
                calc.insert(name.clone(), value.clone());
            }
        }
        base.attrs = exterior;
        base.calc = calc;

        let children = widget.is_container().then(Children::default);
        let id = self.nodes.insert(Node {
            base,
            widget: Some(Box::new(widget)),
            children,
        });
        tracing::trace!(target: targets::ATTRIBUTE, ?id, class = table.class(), "spawned widget");

        self.with_widget(id, |w, cx| w.init(cx));
        if let Some(name) = self.nodes[id].base.calc_str("ref").map(str::to_string) {
            self.register_ref(&name, id);
        }
        if self.nodes[id].base.calc_bool("autofocus") {
            self.focus(id);
        }
        Ok(id)
    }

    /// Destroy a widget and all its descendants.
    ///
    /// The widget is detached from its parent first. Animations of the
    /// destroyed widgets are cancelled and every session reference to them
    /// is dropped.
    pub fn destroy(&mut self, id: WidgetId) -> TreeResult<()> {
        if !self.nodes.contains_key(id) {
            return Err(TreeError::InvalidWidget);
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(w) = stack.pop() {
            if let Some(node) = self.nodes.remove(w) {
                if let Some(children) = node.children {
                    stack.extend(children.ids());
                }
            }
            self.session.forget(w);
        }
        self.session.redraw = true;
        Ok(())
    }

    /// Whether `id` names a live widget.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub(crate) fn node(&self, id: WidgetId) -> TreeResult<&Node> {
        self.nodes.get(id).ok_or(TreeError::InvalidWidget)
    }

    pub(crate) fn node_mut(&mut self, id: WidgetId) -> TreeResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(TreeError::InvalidWidget)
    }

    /// Shared state of a widget.
    pub fn base(&self, id: WidgetId) -> Option<&WidgetBase> {
        self.nodes.get(id).map(|n| &n.base)
    }

    /// The kind object of a widget, if it is a `W`.
    ///
    /// Returns `None` while one of the widget's own hooks runs.
    pub fn widget<W: Widget>(&self, id: WidgetId) -> Option<&W> {
        let widget: &dyn Widget = self.nodes.get(id)?.widget.as_deref()?;
        (widget as &dyn std::any::Any).downcast_ref::<W>()
    }

    /// Parent of a widget.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.base(id)?.parent
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut cursor = Some(id);
        while let Some(w) = cursor {
            if w == ancestor {
                return true;
            }
            cursor = self.parent(w);
        }
        false
    }

    /// Run `f` with the kind object of `id` checked out.
    ///
    /// Returns `None` if the widget does not exist or its kind is already
    /// checked out further up the stack.
    pub(crate) fn with_widget<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Widget, &mut WidgetCx<'_>) -> R,
    ) -> Option<R> {
        let mut widget = self.nodes.get_mut(id)?.widget.take()?;
        let result = f(widget.as_mut(), &mut WidgetCx::new(self, id));
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }
        Some(result)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// The value an attribute reads as: the getter override when the class
    /// defines one, otherwise the exterior value.
    pub fn get(&self, id: WidgetId, name: &str) -> Option<Value> {
        self.base(id)?.get(name)
    }

    /// The calculated value of an attribute.
    pub fn calc(&self, id: WidgetId, name: &str) -> Option<Value> {
        self.base(id)?.calc(name).cloned()
    }

    /// Set an attribute.
    ///
    /// ```
    /// use trellis::prelude::*;
    ///
    /// let mut ui = Ui::new(UiConfig::default());
    /// let spacer = ui.spawn(Spacer, attrs! {}).unwrap();
    /// ui.attr(spacer, "padding", [5, 10, 15, 20]).unwrap();
    /// assert_eq!(ui.calc(spacer, "lpadding"), Some(Value::Number(20.0)));
    /// assert_eq!(ui.get(spacer, "padding"), Some(Value::from([5, 10, 15, 20])));
    /// ```
    pub fn attr(&mut self, id: WidgetId, name: &str, value: impl Into<Assign>) -> TreeResult<()> {
        self.attr_with(id, name, value, AttrOptions::default())
    }

    /// Set an attribute with options.
    ///
    /// 1. [`Assign::Default`] restores the class default, re-running a
    ///    factory; an attribute without default becomes nil.
    /// 2. Attributes the descriptor `replaces` are cleared to nil.
    /// 3. The setter override and the calculation run.
    /// 4. If the exterior or calculated value changed, a replaced attribute
    ///    was cleared, or `trigger` is set, both values are stored and the
    ///    change is handled: user `on_attr`, the kind's `attr_changed`, then
    ///    the reflow and repaint policy.
    pub fn attr_with(
        &mut self,
        id: WidgetId,
        name: &str,
        value: impl Into<Assign>,
        options: AttrOptions,
    ) -> TreeResult<()> {
        let base = &self.node(id)?.base;
        let table = base.table();
        let value = match value.into() {
            Assign::Default => table.default_value(name, &base.attrs).unwrap_or(Value::Nil),
            Assign::Value(v) => v,
        };

        let mut replaced = false;
        let replaces = table.get(name).map(|d| d.replaces).unwrap_or(&[]);
        for sibling in replaces {
            let holds = self.node(id)?.base.attrs.get(*sibling).is_some_and(|v| !v.is_nil());
            if holds {
                replaced = true;
                self.apply(id, sibling, Value::Nil, None, AttrOrigin::Attr, AttrOptions::default())?;
            }
        }

        let options = AttrOptions {
            trigger: options.trigger || replaced,
            ..options
        };
        self.apply(id, name, value, None, AttrOrigin::Attr, options)
    }

    /// Update an attribute from the widget's own state.
    ///
    /// Unlike [`Ui::attr`], the calculated value can be supplied directly,
    /// and the change is reported with [`AttrOrigin::Sync`], so it is never
    /// pushed back to the host.
    pub fn sync(
        &mut self,
        id: WidgetId,
        name: &str,
        value: impl Into<Value>,
        calculated: Option<Value>,
    ) -> TreeResult<()> {
        self.apply(id, name, value.into(), calculated, AttrOrigin::Sync, AttrOptions::default())
    }

    /// Store an attribute and handle the change if there is one.
    pub(crate) fn apply(
        &mut self,
        id: WidgetId,
        name: &str,
        value: Value,
        calculated: Option<Value>,
        origin: AttrOrigin,
        options: AttrOptions,
    ) -> TreeResult<()> {
        let base = &self.node(id)?.base;
        let table = base.table();
        let desc = table.get(name);
        let value = match desc.and_then(|d| d.set) {
            Some(setter) if origin == AttrOrigin::Attr => setter(&base.calc, value),
            _ => value,
        };
        let (calc_value, fields) = match calculated {
            Some(c) => (c, Vec::new()),
            None => {
                let c = table.calculate(name, &value, &base.calc)?;
                (c.value, c.fields)
            }
        };

        let old = base.attrs.get(name).cloned();
        let changed = options.trigger
            || old.as_ref() != Some(&value)
            || base.calc.get(name) != Some(&calc_value)
            || fields.iter().any(|(f, v)| base.calc.get(f) != Some(v));
        if !changed {
            return Ok(());
        }

        let priority = desc.is_some_and(|d| d.priority);
        // A program assignment overrides any animation of the attribute.
        if origin == AttrOrigin::Attr
            && let Some(animation) = self.session.animations.remove(id, name)
        {
            tracing::trace!(target: targets::ANIMATION, ?id, name, "animation cancelled by assignment");
            animation.future.cancel();
        }
        let base = &mut self.node_mut(id)?.base;
        base.attrs.insert(name.to_string(), value.clone());
        base.calc.insert(name.to_string(), calc_value.clone());
        base.calc.extend(fields);
        if !priority {
            self.recalculate_priority(id)?;
        }
        tracing::trace!(target: targets::ATTRIBUTE, ?id, name, %value, ?origin, "attribute changed");

        let change = AttrChange {
            name: name.to_string(),
            value,
            old: old.unwrap_or_default(),
            calculated: calc_value,
            origin,
        };
        self.handle_attr(id, &change, options.reflow);
        Ok(())
    }

    /// Write an interim calculated value (an animation step) and handle it
    /// as a change without touching the exterior value.
    pub(crate) fn set_calculated(&mut self, id: WidgetId, name: &str, calculated: Value) -> TreeResult<()> {
        let base = &mut self.node_mut(id)?.base;
        if base.calc.get(name) == Some(&calculated) {
            return Ok(());
        }
        base.calc.insert(name.to_string(), calculated.clone());
        let change = AttrChange {
            name: name.to_string(),
            value: base.attrs.get(name).cloned().unwrap_or_default(),
            old: base.attrs.get(name).cloned().unwrap_or_default(),
            calculated,
            origin: AttrOrigin::Animation,
        };
        if !base.table().get(name).is_some_and(|d| d.priority) {
            self.recalculate_priority(id)?;
        }
        self.handle_attr(id, &change, None);
        Ok(())
    }

    /// Recalculate priority attributes, which may depend on the others.
    fn recalculate_priority(&mut self, id: WidgetId) -> TreeResult<()> {
        let base = &mut self.node_mut(id)?.base;
        let table = base.table();
        for name in table.priority_names() {
            if let Some(value) = base.attrs.get(name) {
                let c = table.calculate(name, value, &base.calc)?;
                base.calc.insert(name.to_string(), c.value);
                base.calc.extend(c.fields);
            }
        }
        Ok(())
    }

    /// Notify handlers of a change and apply the reflow and repaint policy.
    fn handle_attr(&mut self, id: WidgetId, change: &AttrChange, reflow: Option<Reflow>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(mut handler) = node.base.handlers.attr.take() {
            let result = handler(&mut WidgetCx::new(self, id), change);
            if let Some(node) = self.nodes.get_mut(id) {
                node.base.handlers.attr.get_or_insert(handler);
            }
            if result == HandlerResult::Suppressed {
                return;
            }
        }
        self.with_widget(id, |w, cx| w.attr_changed(cx, change));

        match change.name.as_str() {
            "ref" => {
                if let Some(name) = change.calculated.as_str() {
                    self.register_ref(name, id);
                }
            }
            "z" => {
                if let Some(parent) = self.parent(id) {
                    self.restack(parent);
                }
            }
            _ => {}
        }

        let Some(base) = self.base(id) else {
            return;
        };
        let desc = base.table().get(&change.name);
        let policy = reflow
            .or_else(|| desc.map(|d| d.reflow))
            .unwrap_or_default();
        match policy {
            Reflow::None => {}
            Reflow::Partial => self.session.reflow.push(id),
            Reflow::Full => self.session.reflow.full = true,
        }
        if desc.is_none_or(|d| d.redraw) {
            self.session.redraw = true;
        }
    }

    // =========================================================================
    // Refs
    // =========================================================================

    fn register_ref(&mut self, name: &str, id: WidgetId) {
        if let Some(previous) = self.refs.get(name).copied()
            && previous != id
            && self.nodes.contains_key(previous)
        {
            tracing::warn!(
                target: targets::ATTRIBUTE,
                name,
                ?previous,
                ?id,
                "ambiguous ref: name already held by another widget, newest wins"
            );
        }
        self.refs.insert(name.to_string(), id);
    }

    /// Look up a widget by its `ref` name.
    ///
    /// Entries for destroyed widgets, or widgets whose `ref` changed, are
    /// dropped on lookup.
    pub fn get_ref(&mut self, name: &str) -> Option<WidgetId> {
        let id = *self.refs.get(name)?;
        let live = self
            .base(id)
            .is_some_and(|b| b.calc_str("ref") == Some(name));
        if live {
            Some(id)
        } else {
            self.refs.remove(name);
            None
        }
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Install a user handler for an event-like slot, replacing any previous
    /// one.
    pub fn on(
        &mut self,
        id: WidgetId,
        kind: HandlerKind,
        handler: impl FnMut(&mut WidgetCx<'_>, &Event) -> HandlerResult + 'static,
    ) -> TreeResult<()> {
        self.node_mut(id)?.base.handlers.set(kind, Box::new(handler));
        Ok(())
    }

    /// Remove the user handler of a slot.
    pub fn off(&mut self, id: WidgetId, kind: HandlerKind) -> TreeResult<()> {
        self.node_mut(id)?.base.handlers.clear(kind);
        Ok(())
    }

    /// Install the attribute change handler. Returning
    /// [`HandlerResult::Suppressed`] skips the kind's reaction and the
    /// reflow and repaint policy.
    pub fn on_attr(
        &mut self,
        id: WidgetId,
        handler: impl FnMut(&mut WidgetCx<'_>, &AttrChange) -> HandlerResult + 'static,
    ) -> TreeResult<()> {
        self.node_mut(id)?.base.handlers.attr = Some(Box::new(handler));
        Ok(())
    }

    /// Install the handler called after each reflow of the widget.
    pub fn on_reflow(&mut self, id: WidgetId, handler: impl FnMut(&mut WidgetCx<'_>) + 'static) -> TreeResult<()> {
        self.node_mut(id)?.base.handlers.reflow = Some(Box::new(handler));
        Ok(())
    }

    /// Call the user handler of a slot, if any.
    pub(crate) fn call_handler(&mut self, id: WidgetId, kind: HandlerKind, event: &Event) -> HandlerResult {
        let Some(mut handler) = self.nodes.get_mut(id).and_then(|n| n.base.handlers.take(kind)) else {
            return HandlerResult::NotHandled;
        };
        let result = handler(&mut WidgetCx::new(self, id), event);
        if let Some(node) = self.nodes.get_mut(id) {
            node.base.handlers.restore(kind, handler);
        }
        result
    }

    /// Run a slot: the user handler first, then unless it suppressed, the
    /// kind's default. Returns whether the event was handled.
    pub(crate) fn fire(
        &mut self,
        id: WidgetId,
        kind: HandlerKind,
        event: &Event,
        default: impl FnOnce(&mut dyn Widget, &mut WidgetCx<'_>, &Event) -> bool,
    ) -> bool {
        match self.call_handler(id, kind, event) {
            HandlerResult::Suppressed => false,
            HandlerResult::Handled => {
                self.with_widget(id, |w, cx| default(w, cx, event));
                true
            }
            HandlerResult::NotHandled => self.with_widget(id, |w, cx| default(w, cx, event)).unwrap_or(false),
        }
    }

    /// Emit a slot from widget code, as if the matching input happened.
    ///
    /// Only the user handler runs; use this from a kind hook to raise one of
    /// the widget's own events (a focused button clicking on Enter).
    pub fn emit(&mut self, id: WidgetId, kind: HandlerKind, event: &Event) -> HandlerResult {
        self.call_handler(id, kind, event)
    }

    /// Queue a full reflow of the window.
    pub fn queue_reflow(&mut self) {
        self.session.reflow.full = true;
    }

    /// Request a repaint.
    pub fn queue_draw(&mut self) {
        self.session.redraw = true;
    }

    /// Report an attribute error raised inside a hook, where it cannot be
    /// propagated.
    pub(crate) fn log_error(&self, id: WidgetId, err: &AttributeError) {
        tracing::warn!(target: targets::ATTRIBUTE, ?id, %err, "attribute update rejected");
    }
}

impl std::fmt::Debug for Ui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ui")
            .field("widgets", &self.nodes.len())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
