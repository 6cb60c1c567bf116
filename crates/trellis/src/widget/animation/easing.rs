//! Easing functions for animations.
//!
//! An easing maps linear progress in `0.0..=1.0` to eased progress. Back
//! easings overshoot the range briefly.

use std::f64::consts::PI;

/// Available easing functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// No easing.
    #[default]
    Linear,
    /// Quadratic, accelerating.
    InQuad,
    /// Quadratic, decelerating.
    OutQuad,
    /// Quadratic, both ends smoothed.
    InOutQuad,
    /// Cubic, accelerating.
    InCubic,
    /// Cubic, decelerating.
    OutCubic,
    /// Cubic, both ends smoothed.
    InOutCubic,
    /// Quartic, accelerating.
    InQuart,
    /// Quartic, decelerating.
    OutQuart,
    /// Quartic, both ends smoothed.
    InOutQuart,
    /// Sinusoidal, accelerating.
    InSine,
    /// Sinusoidal, decelerating.
    OutSine,
    /// Sinusoidal, both ends smoothed.
    InOutSine,
    /// Exponential, accelerating.
    InExpo,
    /// Exponential, decelerating.
    OutExpo,
    /// Exponential, both ends smoothed.
    InOutExpo,
    /// Pulls back before moving forward.
    InBack,
    /// Overshoots the end, then settles.
    OutBack,
    /// Both of the above.
    InOutBack,
}

impl Easing {
    /// Look up an easing by name (`"out-quad"`, `"in_out_cubic"`, `"linear"`).
    pub fn from_name(name: &str) -> Option<Easing> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let easing = match key.as_str() {
            "linear" => Easing::Linear,
            "inquad" => Easing::InQuad,
            "outquad" => Easing::OutQuad,
            "inoutquad" => Easing::InOutQuad,
            "incubic" => Easing::InCubic,
            "outcubic" => Easing::OutCubic,
            "inoutcubic" => Easing::InOutCubic,
            "inquart" => Easing::InQuart,
            "outquart" => Easing::OutQuart,
            "inoutquart" => Easing::InOutQuart,
            "insine" => Easing::InSine,
            "outsine" => Easing::OutSine,
            "inoutsine" => Easing::InOutSine,
            "inexpo" => Easing::InExpo,
            "outexpo" => Easing::OutExpo,
            "inoutexpo" => Easing::InOutExpo,
            "inback" => Easing::InBack,
            "outback" => Easing::OutBack,
            "inoutback" => Easing::InOutBack,
            _ => return None,
        };
        Some(easing)
    }
}

/// Apply an easing function to a progress value.
///
/// ```
/// use trellis::widget::animation::{ease, Easing};
///
/// assert_eq!(ease(Easing::Linear, 0.5), 0.5);
/// assert!(ease(Easing::InQuad, 0.5) < 0.5);
/// assert!(ease(Easing::OutQuad, 0.5) > 0.5);
/// ```
#[inline]
pub fn ease(easing: Easing, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);

    match easing {
        Easing::Linear => t,
        Easing::InQuad => t * t,
        Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        Easing::InOutQuad => in_out(t, 2),
        Easing::InCubic => t.powi(3),
        Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
        Easing::InOutCubic => in_out(t, 3),
        Easing::InQuart => t.powi(4),
        Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
        Easing::InOutQuart => in_out(t, 4),
        Easing::InSine => 1.0 - ((t * PI) / 2.0).cos(),
        Easing::OutSine => ((t * PI) / 2.0).sin(),
        Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
        Easing::InExpo => in_expo(t),
        Easing::OutExpo => 1.0 - in_expo(1.0 - t),
        Easing::InOutExpo => {
            if t < 0.5 {
                in_expo(2.0 * t) / 2.0
            } else {
                1.0 - in_expo(2.0 - 2.0 * t) / 2.0
            }
        }
        Easing::InBack => in_back(t),
        Easing::OutBack => 1.0 - in_back(1.0 - t),
        Easing::InOutBack => {
            if t < 0.5 {
                in_back(2.0 * t) / 2.0
            } else {
                1.0 - in_back(2.0 - 2.0 * t) / 2.0
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

#[inline]
fn in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

#[inline]
fn in_expo(t: f64) -> f64 {
    if t <= 0.0 { 0.0 } else { 2f64.powf(10.0 * t - 10.0) }
}

#[inline]
fn in_back(t: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    C3 * t * t * t - C1 * t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 19] = [
        Easing::Linear,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
        Easing::InSine,
        Easing::OutSine,
        Easing::InOutSine,
        Easing::InExpo,
        Easing::OutExpo,
        Easing::InOutExpo,
        Easing::InBack,
        Easing::OutBack,
        Easing::InOutBack,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(ease(easing, 0.0).abs() < 1e-3, "{easing:?} at 0");
            assert!((ease(easing, 1.0) - 1.0).abs() < 1e-9, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_in_out_midpoint() {
        assert!((ease(Easing::InOutQuad, 0.5) - 0.5).abs() < 1e-9);
        assert!((ease(Easing::InOutCubic, 0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_back_overshoots() {
        assert!(ease(Easing::InBack, 0.2) < 0.0);
        assert!(ease(Easing::OutBack, 0.8) > 1.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(ease(Easing::Linear, -0.5), 0.0);
        assert_eq!(ease(Easing::Linear, 1.5), 1.0);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Easing::from_name("out-quad"), Some(Easing::OutQuad));
        assert_eq!(Easing::from_name("In_Out_Cubic"), Some(Easing::InOutCubic));
        assert_eq!(Easing::from_name("wobble"), None);
    }
}
