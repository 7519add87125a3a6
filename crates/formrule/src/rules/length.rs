//! Length rules: `min_length[n]`, `max_length[n]`, `exact_length[n]`.
//!
//! Length is measured in Unicode scalar values by default. Engines built with
//! [`LengthMode::Bytes`] count raw bytes instead. All three rules pass an
//! empty value when the field is not `required`.

use serde::{Deserialize, Serialize};

use crate::catalog::MessageKey;
use crate::context::RuleContext;
use crate::error::FormError;
use crate::parser::RuleToken;

use super::{RuleEvaluator, length_arg};

// ============================================================================
// LENGTH MODE
// ============================================================================

/// How to count string length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthMode {
    /// Count bytes.
    Bytes,
    /// Count Unicode scalar values.
    #[default]
    Chars,
}

impl LengthMode {
    /// Measures the length of a string according to this mode.
    #[inline]
    #[must_use]
    pub fn measure(self, input: &str) -> usize {
        match self {
            Self::Bytes => input.len(),
            Self::Chars => input.chars().count(),
        }
    }
}

// ============================================================================
// SHARED CHECK
// ============================================================================

fn check_length(
    token: &RuleToken,
    ctx: &mut RuleContext<'_>,
    key: &MessageKey,
    fails: impl Fn(usize, usize) -> bool,
) -> Result<(), FormError> {
    let bound = length_arg(token, ctx.field())?;
    let actual = ctx.length_mode().measure(ctx.value());

    if fails(actual, bound) && !ctx.skips_when_empty() {
        let label = ctx.label().to_owned();
        let bound = bound.to_string();
        ctx.fail(key, &[label.as_str(), bound.as_str()]);
    }
    Ok(())
}

// ============================================================================
// RULES
// ============================================================================

/// Fails when the value is shorter than the bracket argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MinLength;

impl RuleEvaluator for MinLength {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        check_length(token, ctx, &MessageKey::MinLength, |len, min| len < min)
    }
}

/// Fails when the value is longer than the bracket argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MaxLength;

impl RuleEvaluator for MaxLength {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        check_length(token, ctx, &MessageKey::MaxLength, |len, max| len > max)
    }
}

/// Fails when the value's length differs from the bracket argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExactLength;

impl RuleEvaluator for ExactLength {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        check_length(token, ctx, &MessageKey::ExactLength, |len, n| len != n)
    }
}

// ============================================================================
// TESTS
// ============================================================================
