//! The form validator: rule registration, the validation pass, and results.
//!
//! ```rust,ignore
//! use formrule::prelude::*;
//!
//! let mut form = FormValidator::new();
//! form.set_rule("name", "Name", "required|min_length[3]")
//!     .set_rule("email", "Email", ["required", "valid_email"]);
//!
//! let report = form.validate(&Submission::post([("name", ""), ("email", "bad")]));
//! assert!(!report.is_success());
//! ```
//!
//! [`FormValidator::validate`] is pass-local and takes `&self`, so one
//! configured validator can check any number of submissions. The stateful
//! surface ([`run_validation`](FormValidator::run_validation),
//! [`form_success`](FormValidator::form_success),
//! [`display_errors`](FormValidator::display_errors)) keeps the last report.

use std::collections::HashMap;
use std::io;

use indexmap::IndexMap;

use crate::callbacks::CallbackRegistry;
use crate::catalog::{MessageCatalog, MessageKey, OverrideScope, render_template};
use crate::collector::{CUSTOM_CODE, ErrorDelimiters, ErrorSet, FieldError};
use crate::config::RuleSetDef;
use crate::context::{PassInputs, PassState, RuleContext};
use crate::error::FormError;
use crate::parser::{RuleList, RuleSpec};
use crate::rules::{LengthMode, RuleEvaluator, RuleRegistry};
use crate::submission::Submission;

// ============================================================================
// VALIDATION REPORT
// ============================================================================

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    values: IndexMap<String, String>,
    errors: ErrorSet,
    forced_failure: bool,
    configuration_errors: Vec<FormError>,
}

impl ValidationReport {
    /// Whether the submission passed.
    ///
    /// Requires no field errors, no forced failure, and no configuration
    /// errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.forced_failure && self.configuration_errors.is_empty()
    }

    /// Field errors in first-detected order.
    #[must_use]
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Whether a trap rule failed the pass.
    #[must_use]
    pub fn forced_failure(&self) -> bool {
        self.forced_failure
    }

    /// Rule sets that could not be evaluated as written, without duplicates.
    #[must_use]
    pub fn configuration_errors(&self) -> &[FormError] {
        &self.configuration_errors
    }

    /// The trimmed values the pass ran against.
    #[must_use]
    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }

    /// The trimmed value of one field.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// The error set as a JSON object of field to error record.
    pub fn errors_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string(&self.errors)?)
    }
}

// ============================================================================
// FORM VALIDATOR
// ============================================================================

/// Holds rule sets, labels, messages and named functions for one form.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    specs: IndexMap<String, RuleSpec>,
    labels: HashMap<String, String>,
    catalog: MessageCatalog,
    registry: RuleRegistry,
    callbacks: CallbackRegistry,
    delimiters: ErrorDelimiters,
    length_mode: LengthMode,
    custom_errors: ErrorSet,
    last: Option<ValidationReport>,
}

impl FormValidator {
    /// A validator with the built-in rules and default messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Rule registration
    // ------------------------------------------------------------------------

    /// Assigns `rules` to `field`, replacing any previous rule set and label.
    ///
    /// `rules` may be a pipe string (`"required|valid_email"`) or a list of
    /// rule names (`["required", "valid_email"]`); both parse the same.
    pub fn set_rule(
        &mut self,
        field: impl Into<String>,
        label: impl Into<String>,
        rules: impl Into<RuleList>,
    ) -> &mut Self {
        let field = field.into();
        self.labels.insert(field.clone(), label.into());
        self.specs.insert(field, RuleSpec::from(rules.into()));
        self
    }

    /// Bulk form of [`set_rule`](Self::set_rule).
    ///
    /// Records without a label keep any label set earlier, and otherwise
    /// display the field name.
    pub fn set_rules<I>(&mut self, rule_sets: I) -> &mut Self
    where
        I: IntoIterator<Item = RuleSetDef>,
    {
        for def in rule_sets {
            match def.label {
                Some(label) => {
                    self.set_rule(def.name, label, def.rules);
                }
                None => {
                    self.specs.insert(def.name, RuleSpec::from(def.rules));
                }
            }
        }
        self
    }

    /// The parsed rule set of `field`.
    #[must_use]
    pub fn rule_spec(&self, field: &str) -> Option<&RuleSpec> {
        self.specs.get(field)
    }

    /// Fields with a rule set, in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Display label of `field`, defaulting to its name.
    #[must_use]
    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.labels.get(field).map_or(field, String::as_str)
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    /// Replaces the message for `rule` on every field.
    ///
    /// `rule` is a rule identifier (covering all of its phrasings) or a
    /// variant path such as `not_equal,post:key`.
    pub fn set_message(&mut self, rule: impl Into<String>, template: impl Into<String>) -> &mut Self {
        self.catalog
            .set_override(OverrideScope::Global, rule, template);
        self
    }

    /// Replaces the message for `rule` on `field` only.
    pub fn set_field_message(
        &mut self,
        rule: impl Into<String>,
        field: impl Into<String>,
        template: impl Into<String>,
    ) -> &mut Self {
        self.catalog
            .set_override(OverrideScope::Field(field.into()), rule, template);
        self
    }

    /// Sets the default template for a rule, typically one added with
    /// [`register_rule`](Self::register_rule).
    pub fn set_default_message(&mut self, rule: &str, template: impl Into<String>) -> &mut Self {
        self.catalog
            .set_default(MessageKey::from_rule(rule), template);
        self
    }

    /// Records `message` as the error for `field`, replacing any error the
    /// field already has.
    ///
    /// `%1` is replaced with the field's label; the catalog is not consulted.
    /// The error is applied to the last report and seeds every later pass
    /// until [`reset`](Self::reset).
    pub fn set_custom_error(&mut self, field: impl Into<String>, message: &str) -> &mut Self {
        let field = field.into();
        let label = self.label(&field).to_owned();
        let rendered = render_template(message, &[label.as_str()]);
        let error = FieldError::new(field, CUSTOM_CODE, rendered).with_params([label]);

        if let Some(last) = self.last.as_mut() {
            last.errors.force(error.clone());
        }
        self.custom_errors.force(error);
        self
    }

    /// The message catalog.
    #[must_use]
    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    // ------------------------------------------------------------------------
    // Extension points
    // ------------------------------------------------------------------------

    /// Adds or replaces the evaluator for rule identifier `name`.
    pub fn register_rule<E>(&mut self, name: impl Into<String>, evaluator: E) -> &mut Self
    where
        E: RuleEvaluator + 'static,
    {
        self.registry.register(name, evaluator);
        self
    }

    /// Registers a function for `callback[name]`.
    pub fn register_callback<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.register_callback(name, callback);
        self
    }

    /// Registers a predicate for `required[name]`.
    pub fn register_gate<F>(&mut self, name: impl Into<String>, gate: F) -> &mut Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.callbacks.register_gate(name, gate);
        self
    }

    /// The rule registry.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Named functions available to rules.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    // ------------------------------------------------------------------------
    // Rendering settings
    // ------------------------------------------------------------------------

    /// Text placed before and after the whole error block.
    pub fn set_errors_delimiter(&mut self, start: impl Into<String>, end: impl Into<String>) -> &mut Self {
        self.delimiters.errors = (start.into(), end.into());
        self
    }

    /// Text placed before and after each error.
    pub fn set_error_delimiter(&mut self, start: impl Into<String>, end: impl Into<String>) -> &mut Self {
        self.delimiters.error = (start.into(), end.into());
        self
    }

    /// Replaces both delimiter pairs.
    pub fn set_delimiters(&mut self, delimiters: ErrorDelimiters) -> &mut Self {
        self.delimiters = delimiters;
        self
    }

    /// Current delimiters.
    #[must_use]
    pub fn delimiters(&self) -> &ErrorDelimiters {
        &self.delimiters
    }

    /// How the length rules count characters.
    pub fn set_length_mode(&mut self, mode: LengthMode) -> &mut Self {
        self.length_mode = mode;
        self
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Runs every rule of every submitted field that has a rule set.
    ///
    /// Values are trimmed into a copy first; `submission` is not modified.
    /// Fields are visited in submission order and their rules in declaration
    /// order. Registered fields absent from the submission are not checked.
    /// Unknown rule identifiers are skipped.
    #[tracing::instrument(level = "debug", skip_all, fields(fields = submission.len()))]
    pub fn validate(&self, submission: &Submission) -> ValidationReport {
        let values = submission.trimmed();
        let mut state = PassState {
            errors: self.custom_errors.clone(),
            forced_failure: false,
        };
        let mut configuration_errors: Vec<FormError> = Vec::new();

        let inputs = PassInputs {
            values: &values,
            labels: &self.labels,
            catalog: &self.catalog,
            callbacks: &self.callbacks,
            length_mode: self.length_mode,
        };

        for (field, value) in &values {
            let Some(spec) = self.specs.get(field) else {
                continue;
            };
            tracing::trace!(field = field.as_str(), rules = spec.source(), "validating field");

            for token in spec.tokens() {
                let Some(evaluator) = self.registry.get(token.name()) else {
                    if !token.name().is_empty() {
                        tracing::warn!(field = field.as_str(), rule = token.name(), "unknown rule skipped");
                    }
                    continue;
                };

                tracing::trace!(field = field.as_str(), rule = token.raw(), "evaluating rule");
                let mut ctx = RuleContext::new(field, value, spec, inputs, &mut state);

                if let Err(err) = evaluator.evaluate(token, &mut ctx)
                    && !configuration_errors.contains(&err)
                {
                    tracing::warn!(error = %err, "rule configuration error");
                    configuration_errors.push(err);
                }
            }
        }

        let report = ValidationReport {
            values,
            errors: state.errors,
            forced_failure: state.forced_failure,
            configuration_errors,
        };

        tracing::debug!(
            errors = report.errors.len(),
            forced_failure = report.forced_failure,
            configuration_errors = report.configuration_errors.len(),
            success = report.is_success(),
            "validation pass finished"
        );
        report
    }

    /// Validates `submission` and keeps the report, unless the form was not
    /// actually submitted, in which case nothing happens.
    pub fn run_validation(&mut self, submission: &Submission) -> &mut Self {
        if submission.is_submitted() {
            self.last = Some(self.validate(submission));
        } else {
            tracing::debug!(method = ?submission.method(), "form not submitted, validation skipped");
        }
        self
    }

    /// Whether the last pass succeeded. `false` before any pass has run.
    #[must_use]
    pub fn form_success(&self) -> bool {
        self.last.as_ref().is_some_and(ValidationReport::is_success)
    }

    /// The report of the last pass.
    #[must_use]
    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.last.as_ref()
    }

    /// Current errors: those of the last pass, or injected ones if no pass
    /// has run yet.
    #[must_use]
    pub fn errors(&self) -> &ErrorSet {
        self.last
            .as_ref()
            .map_or(&self.custom_errors, ValidationReport::errors)
    }

    /// Field to message map of the current errors.
    #[must_use]
    pub fn return_errors(&self) -> IndexMap<String, String> {
        self.errors().to_message_map()
    }

    /// Renders up to `limit` current errors (all if `None`) with the
    /// configured delimiters.
    #[must_use]
    pub fn display_errors(&self, limit: Option<usize>) -> String {
        self.errors().render(&self.delimiters, limit)
    }

    /// Writes [`display_errors`](Self::display_errors) to `writer`.
    pub fn write_errors<W: io::Write>(&self, writer: &mut W, limit: Option<usize>) -> io::Result<()> {
        self.errors().write_to(writer, &self.delimiters, limit)
    }

    /// Clears rule sets, labels, message overrides, injected errors and the
    /// last report.
    ///
    /// Registered rules, named functions, delimiters and the length mode are
    /// kept.
    pub fn reset(&mut self) {
        self.specs.clear();
        self.labels.clear();
        self.catalog.clear_overrides();
        self.custom_errors.clear();
        self.last = None;
    }
}

// ============================================================================
// TESTS
// ============================================================================
