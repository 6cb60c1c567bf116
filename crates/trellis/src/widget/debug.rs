//! Debug formatting of widget trees.
//!
//! ```
//! use trellis::prelude::*;
//! use trellis::widget::{TreeFormatOptions, TreeStyle};
//!
//! let mut ui = Ui::new(UiConfig::default());
//! let root = ui.spawn(Container, attrs! { "ref" => "root" }).unwrap();
//! let ok = ui.spawn(Button::new(), attrs! { "label" => "OK" }).unwrap();
//! ui.add(root, ok, Cell::new()).unwrap();
//!
//! let options = TreeFormatOptions { style: TreeStyle::Ascii, ..TreeFormatOptions::minimal() };
//! assert_eq!(ui.format_tree(root, &options), "Container \"root\"\n`-- Button\n");
//! ```

use std::fmt;

use super::{Ui, WidgetId};

/// Style of tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `|` and `+--` connectors.
    Ascii,
    /// Box-drawing connectors.
    #[default]
    Unicode,
    /// Dashes only.
    Compact,
}

/// What [`Ui::format_tree`] prints.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// Connector style.
    pub style: TreeStyle,
    /// Show widget ids.
    pub show_ids: bool,
    /// Show realized geometry.
    pub show_geometry: bool,
    /// Show exterior attribute values.
    pub show_attributes: bool,
    /// Maximum depth to traverse (`None` for unlimited).
    pub max_depth: Option<usize>,
    /// Indent per level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_geometry: true,
            show_attributes: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything, attributes included.
    pub fn detailed() -> Self {
        Self {
            show_attributes: true,
            ..Default::default()
        }
    }

    /// Class and ref names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_geometry: false,
            show_attributes: false,
            ..Default::default()
        }
    }
}

impl Ui {
    /// Render the subtree under `root`, one widget per line.
    pub fn format_tree(&self, root: WidgetId, options: &TreeFormatOptions) -> String {
        let mut out = String::new();
        self.format_into(root, options, 0, true, &mut out);
        out
    }

    fn format_into(&self, id: WidgetId, options: &TreeFormatOptions, depth: usize, is_last: bool, out: &mut String) {
        if options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let Some(base) = self.base(id) else {
            return;
        };

        out.push_str(&prefix(options, depth, is_last));
        out.push_str(base.class_name());
        if let Some(name) = base.calc_str("ref") {
            out.push_str(&format!(" {name:?}"));
        }
        if options.show_ids {
            out.push_str(&format!(" [{id:?}]"));
        }
        if options.show_geometry {
            let g = base.geometry();
            let state = if !base.is_visible() {
                " hidden"
            } else if !base.is_realized() {
                " unrealized"
            } else {
                ""
            };
            out.push_str(&format!(" @ {},{} {}x{}{state}", g.x, g.y, g.w, g.h));
        }
        out.push('\n');

        if options.show_attributes {
            let indent = attribute_prefix(options, depth + 1);
            let mut attrs: Vec<_> = base.exterior().iter().filter(|(_, v)| !v.is_nil()).collect();
            attrs.sort_by(|a, b| a.0.cmp(b.0));
            for (name, value) in attrs {
                out.push_str(&format!("{indent}.{name} = {value}\n"));
            }
        }

        let children = self.children(id);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_into(child, options, depth + 1, i + 1 == count, out);
        }
    }
}

fn prefix(options: &TreeFormatOptions, depth: usize, is_last: bool) -> String {
    if depth == 0 {
        return String::new();
    }
    let (branch, tee, corner) = match options.style {
        TreeStyle::Ascii => ("|", "+--", "`--"),
        TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
        TreeStyle::Compact => ("", "-", "-"),
    };
    let mut prefix = String::new();
    for _ in 1..depth {
        prefix.push_str(branch);
        prefix.push_str(&" ".repeat(options.indent_size));
    }
    prefix.push_str(if is_last { corner } else { tee });
    prefix.push(' ');
    prefix
}

fn attribute_prefix(options: &TreeFormatOptions, depth: usize) -> String {
    let branch = match options.style {
        TreeStyle::Ascii => "|",
        TreeStyle::Unicode => "\u{2502}",
        TreeStyle::Compact => "",
    };
    format!("{branch}{}", " ".repeat(options.indent_size)).repeat(depth)
}

/// Displays a tree with default options.
pub struct TreeDisplay<'a> {
    ui: &'a Ui,
    root: WidgetId,
}

impl Ui {
    /// A [`fmt::Display`] adapter for the subtree under `root`.
    pub fn display_tree(&self, root: WidgetId) -> TreeDisplay<'_> {
        TreeDisplay { ui: self, root }
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ui.format_tree(self.root, &TreeFormatOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::widget::widgets::{Cell, Container, Spacer};
    use trellis_core::{AttrMap, Value};

    #[test]
    fn test_nested_unicode_tree() {
        let mut ui = Ui::new(UiConfig::default());
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let inner = ui.spawn(Container, AttrMap::new()).unwrap();
        let a = ui.spawn(Spacer, AttrMap::new()).unwrap();
        let b = ui.spawn(Spacer, AttrMap::new()).unwrap();
        ui.add(root, inner, Cell::new()).unwrap();
        ui.add(inner, a, Cell::new()).unwrap();
        ui.add(root, b, Cell::new()).unwrap();

        let text = ui.format_tree(root, &TreeFormatOptions::minimal());
        assert_eq!(
            text,
            "Container\n\u{251c}\u{2500}\u{2500} Container\n\u{2502}  \u{2514}\u{2500}\u{2500} Spacer\n\u{2514}\u{2500}\u{2500} Spacer\n"
        );
    }

    #[test]
    fn test_max_depth_and_attributes() {
        let mut ui = Ui::new(UiConfig::default());
        let mut attrs = AttrMap::new();
        attrs.insert("w".into(), Value::from(20));
        let root = ui.spawn(Container, AttrMap::new()).unwrap();
        let s = ui.spawn(Spacer, attrs).unwrap();
        ui.add(root, s, Cell::new()).unwrap();

        let shallow = TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::minimal()
        };
        assert_eq!(ui.format_tree(root, &shallow), "Container\n");

        let detailed = ui.format_tree(s, &TreeFormatOptions::detailed());
        assert!(detailed.contains(".w = 20"));
        assert!(detailed.contains("unrealized"));
    }
}
