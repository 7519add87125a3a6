//! Per-rule evaluation context.
//!
//! A [`RuleContext`] is what an evaluator sees: the field under test, its
//! trimmed value, the rest of the trimmed submission, labels, the message
//! catalog, named callbacks, and the pass-local [`PassState`] it may record
//! failures into.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::callbacks::CallbackRegistry;
use crate::catalog::{MessageCatalog, MessageKey};
use crate::collector::{ErrorSet, FieldError};
use crate::error::FormError;
use crate::parser::RuleSpec;
use crate::rules::length::LengthMode;

/// Mutable state owned by a single validation pass.
#[derive(Debug, Clone, Default)]
pub struct PassState {
    /// Errors recorded so far, first failure per field.
    pub errors: ErrorSet,
    /// Set by trap rules; fails the pass without a visible message.
    pub forced_failure: bool,
}

/// Read-only inputs shared by every rule in a pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PassInputs<'a> {
    pub values: &'a IndexMap<String, String>,
    pub labels: &'a HashMap<String, String>,
    pub catalog: &'a MessageCatalog,
    pub callbacks: &'a CallbackRegistry,
    pub length_mode: LengthMode,
}

/// The view of a pass handed to one rule evaluation.
pub struct RuleContext<'a> {
    field: &'a str,
    value: &'a str,
    spec: &'a RuleSpec,
    inputs: PassInputs<'a>,
    state: &'a mut PassState,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        field: &'a str,
        value: &'a str,
        spec: &'a RuleSpec,
        inputs: PassInputs<'a>,
        state: &'a mut PassState,
    ) -> Self {
        Self {
            field,
            value,
            spec,
            inputs,
            state,
        }
    }

    /// Name of the field under test.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field
    }

    /// Trimmed value of the field under test.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value
    }

    /// Display label of the field under test.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label_of(self.field)
    }

    /// Display label of any field, defaulting to its name.
    #[must_use]
    pub fn label_of<'f>(&'f self, field: &'f str) -> &'f str {
        self.inputs
            .labels
            .get(field)
            .map_or(field, String::as_str)
    }

    /// Whether the field's own rule string contains the bare `required` token.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.spec.is_required()
    }

    /// Whether an optional, empty field should skip a format/length rule.
    ///
    /// Only the empty string is empty: `"0"` is a value, unlike PHP's `empty()`.
    #[must_use]
    pub fn skips_when_empty(&self) -> bool {
        !self.is_required() && self.value.is_empty()
    }

    /// How lengths are measured in this pass.
    #[must_use]
    pub fn length_mode(&self) -> LengthMode {
        self.inputs.length_mode
    }

    /// Trimmed value of another submitted field.
    ///
    /// `rule` names the referencing rule for the error report.
    pub fn submitted(&self, rule: &str, other: &str) -> Result<&str, FormError> {
        self.inputs
            .values
            .get(other)
            .map(String::as_str)
            .ok_or_else(|| FormError::unknown_field_reference(self.field, rule, other))
    }

    /// Whether `field` already has an error in this pass.
    #[must_use]
    pub fn has_error(&self, field: &str) -> bool {
        self.state.errors.contains(field)
    }

    /// Named callbacks available to rules.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        self.inputs.callbacks
    }

    /// Records a failure for the field under test.
    ///
    /// The message is resolved through the catalog and its overrides. Does
    /// nothing if the field already has an error.
    pub fn fail(&mut self, key: &MessageKey, replacements: &[&str]) {
        if self.state.errors.contains(self.field) {
            return;
        }
        let message = self.inputs.catalog.render(self.field, key, replacements);
        let error = FieldError::new(self.field, key.path(), message)
            .with_params(replacements.iter().copied());
        self.state.errors.insert_first(error);
    }

    /// Marks the whole pass as failed without recording a message.
    pub fn force_failure(&mut self) {
        self.state.forced_failure = true;
    }
}
