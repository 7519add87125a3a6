//! Prelude module for convenient imports.
//!
//! `use formrule::prelude::*;` brings in the validator, submissions, rule
//! extension types and error types.

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::config::{FormConfig, MessageOverrides, RuleSetDef};
pub use crate::engine::{FormValidator, ValidationReport};
pub use crate::submission::{Submission, SubmissionMethod};

// ============================================================================
// RULES: extension points
// ============================================================================

pub use crate::callbacks::CallbackRegistry;
pub use crate::catalog::{MessageKey, NotEqual};
pub use crate::context::RuleContext;
pub use crate::parser::{RuleList, RuleSpec, RuleToken};
pub use crate::rules::{LengthMode, RuleEvaluator, RuleRegistry};

// ============================================================================
// ERRORS
// ============================================================================

pub use crate::collector::{ErrorDelimiters, ErrorSet, FieldError};
pub use crate::error::FormError;
