//! Spacer widget implementation.
//!
//! [`Spacer`] has no content of its own. It takes up the space its `w`/`h`
//! (or its padding) ask for, which makes it useful for gaps, for
//! establishing a container's size, and as the simplest hit target.

use std::sync::LazyLock;

use trellis_core::AttributeTable;

use crate::widget::attributes::{build_table, WIDGET_ATTRS};
use crate::widget::traits::Widget;

/// Attributes of spacers.
pub static SPACER_ATTRS: LazyLock<AttributeTable> = LazyLock::new(|| build_table(Some(&WIDGET_ATTRS), "Spacer", vec![]));

/// A widget that only occupies space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spacer;

impl Widget for Spacer {
    fn attributes(&self) -> &'static AttributeTable {
        &SPACER_ATTRS
    }
}
