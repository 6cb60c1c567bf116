//! Drawing surface abstraction and text metrics.
//!
//! Widgets paint through the [`Canvas`] trait; the host implements it on top
//! of whatever surface it has. [`RecordingCanvas`] records the calls instead
//! of rasterizing, which is what headless hosts and tests use.

use trellis_core::Color;
use unicode_segmentation::UnicodeSegmentation;

use super::base::WidgetBase;
use super::WidgetId;

/// A drawing surface.
pub trait Canvas {
    /// Set the current color.
    fn set_color(&mut self, color: Color);
    /// Set the current global alpha.
    fn set_alpha(&mut self, alpha: f64);
    /// Fill a rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    /// Stroke a rectangle outline.
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    /// Draw a line.
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    /// Fill a circle.
    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64);
    /// Draw a single line of text with its top-left corner at `(x, y)`.
    fn text(&mut self, x: f64, y: f64, text: &str);
    /// Draw a named image scaled into a rectangle.
    fn image(&mut self, name: &str, x: f64, y: f64, w: f64, h: f64);
    /// Called before a widget paints itself.
    fn begin_widget(&mut self, _id: WidgetId) {}
    /// Present the finished frame.
    fn present(&mut self) {}
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A widget started painting.
    Widget(WidgetId),
    /// `set_color`.
    Color(Color),
    /// `set_alpha`.
    Alpha(f64),
    /// `fill_rect`.
    FillRect(f64, f64, f64, f64),
    /// `stroke_rect`.
    StrokeRect(f64, f64, f64, f64),
    /// `line`.
    Line(f64, f64, f64, f64),
    /// `fill_circle`.
    Circle(f64, f64, f64),
    /// `text`.
    Text(f64, f64, String),
    /// `image`.
    Image(String, f64, f64, f64, f64),
    /// `present`.
    Present,
}

/// A canvas that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    /// Recorded calls, in order.
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    /// An empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Widgets in the order they painted.
    pub fn widget_order(&self) -> Vec<WidgetId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Widget(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, _, t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of frames presented.
    pub fn frames(&self) -> usize {
        self.ops.iter().filter(|op| **op == DrawOp::Present).count()
    }

    /// Forget everything recorded.
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn set_color(&mut self, color: Color) {
        self.ops.push(DrawOp::Color(color));
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::Alpha(alpha));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::FillRect(x, y, w, h));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::StrokeRect(x, y, w, h));
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(DrawOp::Line(x1, y1, x2, y2));
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.ops.push(DrawOp::Circle(cx, cy, r));
    }

    fn text(&mut self, x: f64, y: f64, text: &str) {
        self.ops.push(DrawOp::Text(x, y, text.to_string()));
    }

    fn image(&mut self, name: &str, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::Image(name.to_string(), x, y, w, h));
    }

    fn begin_widget(&mut self, id: WidgetId) {
        self.ops.push(DrawOp::Widget(id));
    }

    fn present(&mut self) {
        self.ops.push(DrawOp::Present);
    }
}

/// Text measurement used for intrinsic sizes.
pub trait FontMetrics {
    /// Advance of one character cell at `scale`.
    fn char_width(&self, scale: f64) -> f64;
    /// Line height at `scale`.
    fn line_height(&self, scale: f64) -> f64;
    /// Size of a single line of text.
    fn text_size(&self, text: &str, scale: f64) -> (f64, f64) {
        let chars = text.graphemes(true).count() as f64;
        (chars * self.char_width(scale), self.line_height(scale))
    }
}

/// Fixed-advance metrics approximating a monospace UI font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    /// Advance at scale 1.
    pub advance: f64,
    /// Line height at scale 1.
    pub line_height: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 7.0,
            line_height: 16.0,
        }
    }
}

impl FontMetrics for MonospaceMetrics {
    fn char_width(&self, scale: f64) -> f64 {
        self.advance * scale
    }

    fn line_height(&self, scale: f64) -> f64 {
        self.line_height * scale
    }
}

/// Paint a widget's background and border at `(x, y)`.
pub fn draw_frame(base: &WidgetBase, canvas: &mut dyn Canvas, x: f64, y: f64, scale: f64) {
    let g = base.geometry();
    if let Some(bg) = base.calc_color("bg") {
        canvas.set_color(bg);
        canvas.fill_rect(x, y, g.w, g.h);
    }
    let [top, right, bottom, left] = base.border();
    if let Some((w, c)) = top {
        canvas.set_color(c);
        canvas.fill_rect(x, y, g.w, w * scale);
    }
    if let Some((w, c)) = right {
        canvas.set_color(c);
        canvas.fill_rect(x + g.w - w * scale, y, w * scale, g.h);
    }
    if let Some((w, c)) = bottom {
        canvas.set_color(c);
        canvas.fill_rect(x, y + g.h - w * scale, g.w, w * scale);
    }
    if let Some((w, c)) = left {
        canvas.set_color(c);
        canvas.fill_rect(x, y, w * scale, g.h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_text_size_counts_graphemes() {
        let m = MonospaceMetrics::default();
        assert_eq!(m.text_size("abc", 1.0), (21.0, 16.0));
        assert_eq!(m.text_size("e\u{301}", 2.0), (14.0, 32.0));
    }

    #[test]
    fn test_recording_canvas_helpers() {
        let mut c = RecordingCanvas::new();
        c.text(0.0, 0.0, "hi");
        c.present();
        assert_eq!(c.texts(), vec!["hi"]);
        assert_eq!(c.frames(), 1);
        c.clear();
        assert!(c.ops.is_empty());
    }
}
