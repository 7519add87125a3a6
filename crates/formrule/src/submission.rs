//! Submitted form values.
//!
//! A [`Submission`] is the snapshot one validation pass runs against: the
//! field values in the order they arrived plus whether the request was a real
//! submission. Values are never trimmed in place; the engine works on a
//! trimmed copy.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Characters stripped from both ends of every submitted value.
pub const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\u{0B}'];

/// Trims [`TRIM_CHARS`] from both ends of `value`.
#[must_use]
pub fn trim_value(value: &str) -> &str {
    value.trim_matches(TRIM_CHARS)
}

/// How the form arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubmissionMethod {
    /// Initial render, nothing to validate.
    #[default]
    Get,
    /// A submitted form.
    Post,
}

/// Field values plus the submission method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    method: SubmissionMethod,
    #[serde(default)]
    values: IndexMap<String, String>,
}

impl Submission {
    /// An empty submission with the given method.
    #[must_use]
    pub fn new(method: SubmissionMethod) -> Self {
        Self {
            method,
            values: IndexMap::new(),
        }
    }

    /// A submitted (POST) form with the given values.
    pub fn post<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(SubmissionMethod::Post).with_values(values)
    }

    /// An unsubmitted (GET) form.
    #[must_use]
    pub fn get() -> Self {
        Self::new(SubmissionMethod::Get)
    }

    /// Adds or replaces one value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds or replaces several values.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, value) in values {
            self.insert(field, value);
        }
        self
    }

    /// Adds or replaces one value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    /// The submission method.
    #[must_use]
    pub fn method(&self) -> SubmissionMethod {
        self.method
    }

    /// Whether this is a real submission worth validating.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.method == SubmissionMethod::Post
    }

    /// The trimmed value of `field`.
    #[must_use]
    pub fn get_value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(|v| trim_value(v))
    }

    /// The value of `field` exactly as submitted.
    #[must_use]
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Whether `field` was submitted at all.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Field names in submission order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of submitted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A copy of every value trimmed, in submission order.
    #[must_use]
    pub fn trimmed(&self) -> IndexMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), trim_value(v).to_owned()))
            .collect()
    }
}
