//! Attribute animation.
//!
//! Any numeric (or list-of-numbers, which includes colors) attribute can be
//! animated. Animations are keyed by `(widget, attribute)`: at most one runs
//! per key. Asking for an animation that is already running toward the same
//! destination returns the existing [`AnimationFuture`] instead of
//! restarting it.
//!
//! Interim values are written to the calculated map only; the exterior value
//! becomes the destination when the animation completes.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//! use trellis::widget::animation::{AnimationSpec, Easing};
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let spacer = ui.spawn(Spacer, attrs! {}).unwrap();
//! let fade = ui
//!     .animate(spacer, AnimationSpec::new("alpha", 0.0).duration(0.3).easing(Easing::OutQuad))
//!     .unwrap();
//! ui.advance_animations(0.0);
//! ui.advance_animations(0.3);
//! assert!(fade.is_done());
//! assert_eq!(ui.get(spacer, "alpha"), Some(Value::Number(0.0)));
//! ```

mod easing;
mod future;

pub use easing::{ease, Easing};
pub use future::{AnimationFuture, AnimationState};

use std::collections::BTreeMap;

use trellis_core::attribute::step_lerp;
use trellis_core::logging::targets;
use trellis_core::{StepFn, Value};

use super::handlers::AttrOrigin;
use super::ui::AttrOptions;
use super::{Ui, WidgetId};
use crate::error::TreeResult;

/// What to animate and how.
#[derive(Debug, Clone)]
pub struct AnimationSpec {
    /// Attribute to animate.
    pub attr: String,
    /// Destination (exterior) value.
    pub dst: Value,
    /// Duration in seconds; `None` uses the session default.
    pub duration: Option<f64>,
    /// Easing; `None` uses the session default.
    pub easing: Option<Easing>,
    /// Start value; defaults to the current calculated value.
    pub src: Option<Value>,
    /// Step override; defaults to the attribute's step, then linear.
    pub step: Option<StepFn>,
}

impl AnimationSpec {
    /// Animate `attr` toward `dst`.
    pub fn new(attr: impl Into<String>, dst: impl Into<Value>) -> Self {
        Self {
            attr: attr.into(),
            dst: dst.into(),
            duration: None,
            easing: None,
            src: None,
            step: None,
        }
    }

    /// Set the duration in seconds.
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Set the easing.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Start from an explicit value.
    pub fn from(mut self, src: impl Into<Value>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Override the step function.
    pub fn step(mut self, step: StepFn) -> Self {
        self.step = Some(step);
        self
    }
}

/// A running animation.
#[derive(Debug, Clone)]
pub struct Animation {
    /// Animated attribute.
    pub attr: String,
    /// Calculated start value.
    pub src: Value,
    /// Exterior destination value.
    pub dst: Value,
    /// Calculated destination value.
    pub dst_calc: Value,
    /// Start time; set by the first tick that sees the animation.
    pub start: Option<f64>,
    /// Duration in seconds.
    pub duration: f64,
    /// Easing.
    pub easing: Easing,
    pub(crate) step: StepFn,
    pub(crate) future: AnimationFuture,
}

impl Animation {
    /// Linear progress at `now`, in `0.0..=1.0`.
    pub fn progress(&self, now: f64) -> f64 {
        let start = self.start.unwrap_or(now);
        if self.duration <= 0.0 {
            1.0
        } else {
            ((now - start) / self.duration).clamp(0.0, 1.0)
        }
    }

    /// The interim calculated value at `now`.
    pub fn value_at(&self, now: f64) -> Value {
        (self.step)(&self.src, &self.dst_calc, ease(self.easing, self.progress(now)))
    }

    /// The completion future.
    pub fn future(&self) -> &AnimationFuture {
        &self.future
    }
}

/// The animation registry of a session.
#[derive(Debug, Default)]
pub struct Animations {
    active: BTreeMap<(WidgetId, String), Animation>,
}

impl Animations {
    /// Running animation for a key.
    pub fn get(&self, id: WidgetId, attr: &str) -> Option<&Animation> {
        self.active.get(&(id, attr.to_string()))
    }

    /// Number of running animations.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is animating.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub(crate) fn insert(&mut self, id: WidgetId, animation: Animation) {
        self.active.insert((id, animation.attr.clone()), animation);
    }

    pub(crate) fn remove(&mut self, id: WidgetId, attr: &str) -> Option<Animation> {
        self.active.remove(&(id, attr.to_string()))
    }

    pub(crate) fn keys(&self) -> Vec<(WidgetId, String)> {
        self.active.keys().cloned().collect()
    }

    pub(crate) fn get_mut(&mut self, id: WidgetId, attr: &str) -> Option<&mut Animation> {
        self.active.get_mut(&(id, attr.to_string()))
    }

    /// Remove every animation of a widget, returning them.
    pub(crate) fn remove_widget(&mut self, id: WidgetId) -> Vec<Animation> {
        let keys: Vec<_> = self.active.keys().filter(|(w, _)| *w == id).cloned().collect();
        keys.into_iter().filter_map(|k| self.active.remove(&k)).collect()
    }
}

impl Ui {
    /// Animate an attribute.
    ///
    /// If the same attribute is already animating toward the same
    /// destination, the running animation's future is returned and nothing
    /// restarts. A different destination cancels the running animation and
    /// starts over from the current calculated value.
    pub fn animate(&mut self, id: WidgetId, spec: AnimationSpec) -> TreeResult<AnimationFuture> {
        if let Some(running) = self.session.animations.get(id, &spec.attr)
            && running.dst == spec.dst
        {
            return Ok(running.future.clone());
        }

        let base = &self.node(id)?.base;
        let table = base.table();
        let dst_calc = table.calculate(&spec.attr, &spec.dst, &base.calc)?.value;
        let src = match spec.src {
            Some(src) => table.calculate(&spec.attr, &src, &base.calc)?.value,
            None => {
                let scale = self.session.config.scale;
                match (base.calc(&spec.attr), spec.attr.as_str()) {
                    (Some(v), _) if !v.is_nil() => v.clone(),
                    (_, "w") => Value::Number(base.geometry().w / scale),
                    (_, "h") => Value::Number(base.geometry().h / scale),
                    _ => dst_calc.clone(),
                }
            }
        };
        let step = spec
            .step
            .or_else(|| table.get(&spec.attr).and_then(|d| d.animate))
            .unwrap_or(step_lerp);

        if let Some(previous) = self.session.animations.remove(id, &spec.attr) {
            tracing::trace!(target: targets::ANIMATION, ?id, attr = %spec.attr, "animation retargeted");
            previous.future.cancel();
        }
        let config = &self.session.config;
        let animation = Animation {
            duration: spec.duration.unwrap_or(config.default_animation_duration).max(0.0),
            easing: spec.easing.unwrap_or(config.default_easing),
            attr: spec.attr,
            src,
            dst: spec.dst,
            dst_calc,
            start: None,
            step,
            future: AnimationFuture::new(),
        };
        let future = animation.future.clone();
        tracing::trace!(
            target: targets::ANIMATION,
            ?id,
            attr = %animation.attr,
            src = %animation.src,
            dst = %animation.dst,
            duration = animation.duration,
            "animation started"
        );
        self.session.animations.insert(id, animation);
        self.session.redraw = true;
        Ok(future)
    }

    /// Step every running animation to `now`. Returns how many are still
    /// running.
    ///
    /// The first call that sees an animation fixes its start time. Interim
    /// values go to the calculated map only; on completion the exterior
    /// value is set to the destination and the future resolves.
    pub fn advance_animations(&mut self, now: f64) -> usize {
        for (id, attr) in self.session.animations.keys() {
            if !self.contains(id) {
                if let Some(animation) = self.session.animations.remove(id, &attr) {
                    animation.future.cancel();
                }
                continue;
            }
            let Some(animation) = self.session.animations.get_mut(id, &attr) else {
                continue;
            };
            animation.start.get_or_insert(now);
            if animation.progress(now) < 1.0 {
                let value = animation.value_at(now);
                if let Err(err) = self.set_calculated(id, &attr, value) {
                    tracing::warn!(target: targets::ANIMATION, ?id, %attr, %err, "animation step failed");
                }
                continue;
            }

            let Some(animation) = self.session.animations.remove(id, &attr) else {
                continue;
            };
            let result = self.apply(
                id,
                &attr,
                animation.dst.clone(),
                None,
                AttrOrigin::Animation,
                AttrOptions::default(),
            );
            if let Err(err) = result {
                tracing::warn!(target: targets::ANIMATION, ?id, %attr, %err, "animation completion failed");
            }
            tracing::trace!(target: targets::ANIMATION, ?id, %attr, "animation finished");
            animation.future.resolve(animation.dst);
        }
        self.session.animations.len()
    }

    /// Stop an animation where it is. The future's cancel callbacks run.
    pub fn cancel_animation(&mut self, id: WidgetId, attr: &str) -> Option<AnimationFuture> {
        let animation = self.session.animations.remove(id, attr)?;
        animation.future.cancel();
        Some(animation.future)
    }

    /// The running animation of an attribute.
    pub fn get_animation(&self, id: WidgetId, attr: &str) -> Option<&Animation> {
        self.session.animations.get(id, attr)
    }
}
