//! Error types for the widget tree.

use thiserror::Error;
use trellis_core::AttributeError;

/// Errors from widget tree operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The widget id does not name a live widget.
    #[error("invalid or destroyed widget")]
    InvalidWidget,

    /// Children can only be added to container widgets.
    #[error("widget of class `{class}` is not a container")]
    NotAContainer {
        /// Class of the would-be parent.
        class: &'static str,
    },

    /// The child is the parent itself or one of its ancestors.
    #[error("cannot add a widget to itself or to one of its descendants")]
    CircularParentage,

    /// The widget is not a child of the container.
    #[error("widget is not a child of this container")]
    NotAChild,

    /// A child index was out of range.
    #[error("child index {index} out of range (container has {len} children)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of children.
        len: usize,
    },

    /// An attribute value was rejected.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Result type for widget tree operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_error_is_transparent() {
        let err: TreeError = AttributeError::invalid("halign", "unknown constant `up`").into();
        assert_eq!(err.to_string(), "invalid value for attribute `halign`: unknown constant `up`");
    }
}
