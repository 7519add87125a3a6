//! Configuration error types.
//!
//! A failing rule is not an error in this sense: it produces a
//! [`FieldError`](crate::collector::FieldError) in the error set. [`FormError`]
//! covers rule sets that cannot be evaluated as written (a `matches` rule
//! pointing at a field that was never submitted, a `min_length` without a
//! number, a malformed configuration document).

/// Error type for rule configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FormError {
    /// A rule refers to another field that is not part of the submission.
    #[error("rule `{rule}` on field `{field}` references unknown field `{referenced}`")]
    UnknownFieldReference {
        /// Field whose rule set contains the reference.
        field: String,
        /// Rule identifier carrying the reference.
        rule: String,
        /// The field name that could not be resolved.
        referenced: String,
    },

    /// A rule that needs a bracket argument was written without one.
    #[error("rule `{rule}` on field `{field}` requires an argument")]
    MissingArgument {
        /// Field whose rule set contains the rule.
        field: String,
        /// Rule identifier.
        rule: String,
    },

    /// A rule argument could not be interpreted (e.g. a non-numeric length).
    #[error("rule `{rule}` on field `{field}` has invalid argument `{argument}`")]
    InvalidArgument {
        /// Field whose rule set contains the rule.
        field: String,
        /// Rule identifier.
        rule: String,
        /// The offending argument text.
        argument: String,
    },

    /// Malformed configuration document.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FormError {
    /// Convenience constructor for [`FormError::UnknownFieldReference`].
    pub fn unknown_field_reference(
        field: impl Into<String>,
        rule: impl Into<String>,
        referenced: impl Into<String>,
    ) -> Self {
        Self::UnknownFieldReference {
            field: field.into(),
            rule: rule.into(),
            referenced: referenced.into(),
        }
    }

    /// Convenience constructor for [`FormError::MissingArgument`].
    pub fn missing_argument(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::MissingArgument {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Convenience constructor for [`FormError::InvalidArgument`].
    pub fn invalid_argument(
        field: impl Into<String>,
        rule: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            rule: rule.into(),
            argument: argument.into(),
        }
    }

    /// Returns the field whose rule set produced this error, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownFieldReference { field, .. }
            | Self::MissingArgument { field, .. }
            | Self::InvalidArgument { field, .. } => Some(field),
            Self::Config(_) => None,
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result alias for configuration-level operations.
pub type Result<T, E = FormError> = std::result::Result<T, E>;
