//! Per-field error collection and rendering.
//!
//! The [`ErrorSet`] holds at most one [`FieldError`] per field. The first
//! rule that fails for a field wins and later failures for the same field are
//! dropped, so `required|min_length[5]` on an empty value reports only the
//! `required` message. Entries keep first-detected order.

use std::fmt;
use std::io;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// FIELD ERROR
// ============================================================================

/// Rule code recorded for messages injected with `set_custom_error`.
pub const CUSTOM_CODE: &str = "custom";

/// A rendered error for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed.
    pub field: String,

    /// Message key path of the failing rule, e.g. `min_length` or
    /// `not_equal,post:key`. [`CUSTOM_CODE`] for injected messages.
    pub code: String,

    /// Final message with placeholders substituted.
    pub message: String,

    /// Replacement values used to render the message, in placeholder order.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub params: SmallVec<[String; 2]>,
}

impl FieldError {
    /// Creates an error with no params.
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
            params: SmallVec::new(),
        }
    }

    /// Attaches the replacement values used for rendering.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.field, self.code, self.message)
    }
}

impl std::error::Error for FieldError {}

// ============================================================================
// ERROR SET
// ============================================================================

/// Ordered map of field name to its single error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSet {
    errors: IndexMap<String, FieldError>,
}

impl ErrorSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `error` unless its field already has one.
    ///
    /// Returns `true` if the error was recorded.
    pub fn insert_first(&mut self, error: FieldError) -> bool {
        if self.errors.contains_key(&error.field) {
            return false;
        }
        self.errors.insert(error.field.clone(), error);
        true
    }

    /// Records `error`, replacing any existing error for its field.
    ///
    /// A replaced entry keeps its position; a new one is appended.
    pub fn force(&mut self, error: FieldError) {
        self.errors.insert(error.field.clone(), error);
    }

    /// Whether `field` has an error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// The error for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    /// The rendered message for `field`.
    #[must_use]
    pub fn message(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(|e| e.message.as_str())
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors in first-detected order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    /// `(field, message)` pairs in first-detected order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, e)| (field.as_str(), e.message.as_str()))
    }

    /// Field to message map, for callers that only need the text.
    #[must_use]
    pub fn to_message_map(&self) -> IndexMap<String, String> {
        self.messages()
            .map(|(f, m)| (f.to_owned(), m.to_owned()))
            .collect()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Renders up to `limit` errors (all if `None`) inside `delimiters`.
    ///
    /// The outer delimiters are always emitted, even with no errors.
    #[must_use]
    pub fn render(&self, delimiters: &ErrorDelimiters, limit: Option<usize>) -> String {
        let mut out = String::new();
        out.push_str(&delimiters.errors.0);
        for error in self.iter().take(limit.unwrap_or(usize::MAX)) {
            out.push_str(&delimiters.error.0);
            out.push_str(&error.message);
            out.push_str(&delimiters.error.1);
        }
        out.push_str(&delimiters.errors.1);
        out
    }

    /// Writes the rendering of [`render`](Self::render) to `writer`.
    pub fn write_to<W: io::Write>(
        &self,
        writer: &mut W,
        delimiters: &ErrorDelimiters,
        limit: Option<usize>,
    ) -> io::Result<()> {
        writer.write_all(self.render(delimiters, limit).as_bytes())
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a FieldError;
    type IntoIter = indexmap::map::Values<'a, String, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.values()
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Form validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

// ============================================================================
// DELIMITERS
// ============================================================================

/// Text placed around the whole error block and around each error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDelimiters {
    /// `(start, end)` around the whole block.
    pub errors: (String, String),
    /// `(start, end)` around each error.
    pub error: (String, String),
}

impl Default for ErrorDelimiters {
    fn default() -> Self {
        Self {
            errors: (r#"<div class="errors">"#.to_owned(), "</div>".to_owned()),
            error: (r#"<p class="error">"#.to_owned(), "</p>".to_owned()),
        }
    }
}

impl ErrorDelimiters {
    /// Delimiters that render messages one per line with no markup.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            errors: (String::new(), String::new()),
            error: (String::new(), "\n".to_owned()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
