//! Session configuration.
//!
//! [`UiConfig`] gathers the tunables of a UI session: scale, input timing,
//! performance budgets and animation defaults. It is a plain value owned by
//! the session; build it with the `with_*` methods.
//!
//! ```
//! use trellis::config::UiConfig;
//!
//! let config = UiConfig::default().with_scale(2.0).with_double_click_delay(0.3);
//! assert_eq!(config.scale, 2.0);
//! ```

use std::time::Duration;

use crate::widget::animation::Easing;

/// Tunables of a UI session.
#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    /// UI scale applied to absolute sizes and offsets.
    pub scale: f64,
    /// Maximum seconds between clicks of a double click.
    pub double_click_delay: f64,
    /// Seconds a button must be held for a long press.
    pub long_press_delay: f64,
    /// Pixels the pointer must travel with a button held before a drag starts.
    pub drag_threshold: f64,
    /// Reflows slower than this are logged.
    pub reflow_warn_threshold: Duration,
    /// Update ticks slower than this are logged.
    pub update_warn_threshold: Duration,
    /// Duration used when an animation does not specify one.
    pub default_animation_duration: f64,
    /// Easing used when an animation does not specify one.
    pub default_easing: Easing,
    /// Box offered to a shrinkwrapped window, in unscaled pixels.
    pub shrinkwrap_limit: (f64, f64),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            double_click_delay: 0.5,
            long_press_delay: 0.5,
            drag_threshold: 3.0,
            reflow_warn_threshold: Duration::from_millis(20),
            update_warn_threshold: Duration::from_millis(30),
            default_animation_duration: 0.2,
            default_easing: Easing::OutQuad,
            shrinkwrap_limit: (4096.0, 4096.0),
        }
    }
}

impl UiConfig {
    /// Set the UI scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the double click delay in seconds.
    pub fn with_double_click_delay(mut self, seconds: f64) -> Self {
        self.double_click_delay = seconds;
        self
    }

    /// Set the long press delay in seconds.
    pub fn with_long_press_delay(mut self, seconds: f64) -> Self {
        self.long_press_delay = seconds;
        self
    }

    /// Set the drag threshold in pixels.
    pub fn with_drag_threshold(mut self, pixels: f64) -> Self {
        self.drag_threshold = pixels;
        self
    }

    /// Set the slow reflow and slow update warning budgets.
    pub fn with_warn_thresholds(mut self, reflow: Duration, update: Duration) -> Self {
        self.reflow_warn_threshold = reflow;
        self.update_warn_threshold = update;
        self
    }

    /// Set the default animation duration and easing.
    pub fn with_animation_defaults(mut self, duration: f64, easing: Easing) -> Self {
        self.default_animation_duration = duration;
        self.default_easing = easing;
        self
    }
}
