//! Error types for Trellis core.

use thiserror::Error;

/// Errors raised while building attribute tables or calculating values.
///
/// Table construction errors are programmer errors: the built-in widget
/// classes build their tables once and fail fast when one is returned.
/// Calculation errors surface from [`AttributeTable::calculate`] when a user
/// supplied value cannot be interpreted.
///
/// [`AttributeTable::calculate`]: crate::AttributeTable::calculate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    /// The attribute name collides with a name the instance API reserves.
    #[error("attribute name `{name}` is reserved (class `{class}`)")]
    ReservedName {
        /// Class being registered.
        class: &'static str,
        /// Offending attribute name.
        name: String,
    },

    /// A descriptor field references an attribute the class does not define.
    #[error("attribute `{attr}` of class `{class}` references unknown attribute `{target}`")]
    UnknownReference {
        /// Class being registered.
        class: &'static str,
        /// Attribute holding the reference.
        attr: String,
        /// Name that could not be found.
        target: String,
    },

    /// References form a loop.
    #[error("reference cycle in class `{class}`: {}", chain.join(" -> "))]
    ReferenceCycle {
        /// Class being registered.
        class: &'static str,
        /// The attribute names making up the cycle, in visit order.
        chain: Vec<String>,
    },

    /// A shorthand value had a shape the attribute cannot fan out.
    #[error("malformed value for shorthand attribute `{attr}`: {reason}")]
    MalformedShorthand {
        /// Shorthand attribute name.
        attr: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// A value could not be converted to the attribute's calculated form.
    #[error("invalid value for attribute `{attr}`: {reason}")]
    InvalidValue {
        /// Attribute name.
        attr: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// The attribute is not defined for the class.
    #[error("class `{class}` has no attribute `{name}`")]
    UnknownAttribute {
        /// Class queried.
        class: &'static str,
        /// Attribute name.
        name: String,
    },
}

impl AttributeError {
    /// Shorthand constructor for [`AttributeError::InvalidValue`].
    pub fn invalid(attr: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            attr: attr.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand constructor for [`AttributeError::MalformedShorthand`].
    pub fn malformed(attr: &str, reason: impl Into<String>) -> Self {
        Self::MalformedShorthand {
            attr: attr.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for attribute operations.
pub type AttributeResult<T> = std::result::Result<T, AttributeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = AttributeError::ReferenceCycle {
            class: "Widget",
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "reference cycle in class `Widget`: a -> b -> a");
    }

    #[test]
    fn test_malformed_names_attribute() {
        let err = AttributeError::malformed("padding", "expected 1 to 4 numbers");
        assert!(err.to_string().contains("`padding`"));
    }
}
