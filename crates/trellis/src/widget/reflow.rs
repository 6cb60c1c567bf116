//! The layout primitive.
//!
//! A parent lays out a child by *offering* it a box ([`Offer`]); the child
//! answers with the geometry it *realized* ([`Realized`]). Sizes follow a
//! border-box model: explicit `w`/`h` include padding and border, intrinsic
//! content sizes have them added.
//!
//! Explicit sizes are interpreted relative to the offered box:
//!
//! | value           | meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `v > 1`         | absolute pixels, multiplied by the scale  |
//! | `0 < v <= 1`    | fraction of the box                       |
//! | `v < 0`         | box size plus `v` (scaled)                |
//! | `0`             | zero                                      |

use super::base::WidgetBase;
use super::WidgetId;

/// The box a parent offers a child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offer {
    /// Box x, relative to the parent.
    pub x: f64,
    /// Box y, relative to the parent.
    pub y: f64,
    /// Box width available.
    pub w: f64,
    /// Box height available.
    pub h: f64,
    /// Fill the box width when no explicit width is set.
    pub fill_w: bool,
    /// Fill the box height when no explicit height is set.
    pub fill_h: bool,
    /// Never exceed the box width.
    pub clamp_w: bool,
    /// Never exceed the box height.
    pub clamp_h: bool,
    /// UI scale.
    pub scale: f64,
    /// The box width really is available (not a shrinkwrap measurement).
    pub greedy_w: bool,
    /// The box height really is available.
    pub greedy_h: bool,
    /// Nearest scrolling ancestor.
    pub viewport: Option<WidgetId>,
    /// Root widget of the window.
    pub window: Option<WidgetId>,
}

impl Offer {
    /// A greedy, non-filling box at the origin.
    pub fn new(w: f64, h: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w,
            h,
            fill_w: false,
            fill_h: false,
            clamp_w: false,
            clamp_h: false,
            scale: 1.0,
            greedy_w: true,
            greedy_h: true,
            viewport: None,
            window: None,
        }
    }

    /// Same offer at a position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Same offer with fill flags.
    pub fn fill(mut self, w: bool, h: bool) -> Self {
        self.fill_w = w;
        self.fill_h = h;
        self
    }

    /// Same offer with clamp flags.
    pub fn clamp(mut self, w: bool, h: bool) -> Self {
        self.clamp_w = w;
        self.clamp_h = h;
        self
    }

    /// Same offer with greedy flags.
    pub fn greedy(mut self, w: bool, h: bool) -> Self {
        self.greedy_w = w;
        self.greedy_h = h;
        self
    }

    /// Same offer with a scale.
    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Geometry a widget realized in response to an offer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Realized {
    /// X relative to the parent.
    pub x: f64,
    /// Y relative to the parent.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
    /// The widget consumed the whole box width.
    pub used_full_w: bool,
    /// The widget consumed the whole box height.
    pub used_full_h: bool,
}

/// Resolve an explicit size against a box.
pub fn resolve_dimension(value: Option<f64>, available: f64, scale: f64) -> Option<f64> {
    let v = value?;
    Some(if v < 0.0 {
        (available + v * scale).max(0.0)
    } else if v > 0.0 && v <= 1.0 {
        available * v
    } else {
        v * scale
    })
}

/// Resolved size limits of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limits {
    /// Minimum size.
    pub min: Option<f64>,
    /// Maximum size.
    pub max: Option<f64>,
}

impl Limits {
    /// Clamp a size into the limits. The minimum wins over the maximum.
    pub fn apply(&self, v: f64) -> f64 {
        let v = match self.max {
            Some(max) => v.min(max),
            None => v,
        };
        match self.min {
            Some(min) => v.max(min),
            None => v,
        }
    }
}

/// Resolve `minw`/`maxw` (or the height pair) of a widget.
pub fn limits(base: &WidgetBase, min: &str, max: &str, available: f64, scale: f64) -> Limits {
    Limits {
        min: resolve_dimension(base.calc_f64(min), available, scale),
        max: resolve_dimension(base.calc_f64(max), available, scale),
    }
}

/// Position of the widget's box: box origin plus its own scaled offset.
pub fn box_position(base: &WidgetBase, offer: &Offer) -> (f64, f64) {
    let x = base.calc_f64("x").unwrap_or(0.0) * offer.scale;
    let y = base.calc_f64("y").unwrap_or(0.0) * offer.scale;
    (offer.x + x, offer.y + y)
}

/// Size of one axis given the explicit value, the content size and the
/// offer flags. Returns the size and whether the whole box was used.
#[allow(clippy::too_many_arguments)]
pub(crate) fn axis_size(
    explicit: Option<f64>,
    content: f64,
    inset: f64,
    available: f64,
    fill: bool,
    greedy: bool,
    clamp: bool,
    limits: Limits,
) -> (f64, bool) {
    let (size, full) = match explicit {
        Some(v) => (v, false),
        None if fill && greedy => (available, true),
        None => (content + inset, false),
    };
    let size = if clamp { size.min(available) } else { size };
    (limits.apply(size).max(0.0), full)
}

/// Default reflow of a leaf widget with the given intrinsic content size.
pub fn reflow_leaf(base: &WidgetBase, offer: &Offer, intrinsic: (f64, f64)) -> Realized {
    let s = offer.scale;
    let (x, y) = box_position(base, offer);
    let inset = base.insets(s);
    let (w, used_full_w) = axis_size(
        resolve_dimension(base.calc_f64("w"), offer.w, s),
        intrinsic.0,
        inset.horizontal(),
        offer.w,
        offer.fill_w,
        offer.greedy_w,
        offer.clamp_w,
        limits(base, "minw", "maxw", offer.w, s),
    );
    let (h, used_full_h) = axis_size(
        resolve_dimension(base.calc_f64("h"), offer.h, s),
        intrinsic.1,
        inset.vertical(),
        offer.h,
        offer.fill_h,
        offer.greedy_h,
        offer.clamp_h,
        limits(base, "minh", "maxh", offer.h, s),
    );
    Realized {
        x,
        y,
        w,
        h,
        used_full_w,
        used_full_h,
    }
}
