//! Standard widgets for Trellis.
//!
//! - [`Container`]: stacks children at their natural positions
//! - [`HBox`] / [`VBox`]: flow children along one axis
//! - [`Spacer`]: takes up space
//! - [`Button`]: clickable label and icon
//! - [`Entry`]: single-line text input
//! - [`Slider`]: one or more thumbs on a track

mod box_layout;
mod button;
mod container;
mod entry;
mod slider;
mod spacer;

pub use box_layout::{reflow_box, Axis, HBox, VBox, HBOX_ATTRS, VBOX_ATTRS};
pub use button::{Button, BUTTON_ATTRS};
pub use container::{reflow_container, Cell, Children, Container, CONTAINER_ATTRS};
pub use entry::{Entry, ENTRY_ATTRS};
pub use slider::{Slider, SLIDER_ATTRS};
pub use spacer::{Spacer, SPACER_ATTRS};
