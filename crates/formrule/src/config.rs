//! Declarative form configuration.
//!
//! A [`FormConfig`] describes a whole form as data:
//!
//! ```json
//! {
//!   "rules": [
//!     { "name": "name",  "label": "Name",  "rules": "required|min_length[3]" },
//!     { "name": "email", "label": "Email", "rules": ["required", "valid_email"] }
//!   ],
//!   "messages": {
//!     "global": { "required": "Please fill in %1." },
//!     "fields": { "email": { "valid_email": "%1 looks wrong." } }
//!   },
//!   "delimiters": { "errors": ["<ul>", "</ul>"], "error": ["<li>", "</li>"] },
//!   "length_mode": "bytes"
//! }
//! ```
//!
//! Every section is optional.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::collector::ErrorDelimiters;
use crate::engine::FormValidator;
use crate::error::FormError;
use crate::parser::RuleList;
use crate::rules::LengthMode;

/// Rules for one field, as accepted by
/// [`FormValidator::set_rules`](crate::engine::FormValidator::set_rules).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetDef {
    /// Field name.
    pub name: String,
    /// Display label; the field name is shown when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Pipe string or list of rule names.
    pub rules: RuleList,
}

impl RuleSetDef {
    /// A record with a label.
    pub fn new(name: impl Into<String>, label: impl Into<String>, rules: impl Into<RuleList>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
            rules: rules.into(),
        }
    }
}

/// Message overrides, global and per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageOverrides {
    /// Rule identifier (or variant path) to template, for every field.
    pub global: IndexMap<String, String>,
    /// Field name to (rule identifier to template).
    pub fields: IndexMap<String, IndexMap<String, String>>,
}

impl MessageOverrides {
    /// Whether no override is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.fields.is_empty()
    }
}

/// A complete form description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Rule sets in registration order.
    pub rules: Vec<RuleSetDef>,
    /// Message overrides.
    #[serde(skip_serializing_if = "MessageOverrides::is_empty")]
    pub messages: MessageOverrides,
    /// Error rendering delimiters.
    pub delimiters: ErrorDelimiters,
    /// How length rules count.
    pub length_mode: LengthMode,
}

impl FormConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, FormError> {
        let config: Self = serde_json::from_str(json)?;
        tracing::debug!(
            fields = config.rules.len(),
            global_messages = config.messages.global.len(),
            field_messages = config.messages.fields.len(),
            "form configuration loaded"
        );
        Ok(config)
    }
}

impl FormValidator {
    /// Builds a validator with the built-in rules from `config`.
    #[must_use]
    pub fn from_config(config: FormConfig) -> Self {
        let mut form = Self::new();
        form.apply_config(config);
        form
    }

    /// Applies `config` on top of the current settings.
    pub fn apply_config(&mut self, config: FormConfig) -> &mut Self {
        let FormConfig {
            rules,
            messages,
            delimiters,
            length_mode,
        } = config;

        self.set_rules(rules)
            .set_delimiters(delimiters)
            .set_length_mode(length_mode);

        for (rule, template) in messages.global {
            self.set_message(rule, template);
        }
        for (field, templates) in messages.fields {
            for (rule, template) in templates {
                self.set_field_message(rule, field.clone(), template);
            }
        }
        self
    }
}
