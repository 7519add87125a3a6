//! `callback[name]`: hands the value to a registered function.

use crate::context::RuleContext;
use crate::error::FormError;
use crate::parser::RuleToken;

use super::RuleEvaluator;

/// Invokes the named [`FieldCallback`](crate::callbacks::FieldCallback) with
/// the trimmed value when the value is non-empty.
///
/// The callback's outcome does not affect validation. Names with no
/// registered callback are skipped. Rules that should fail a field belong in
/// the rule registry instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Callback;

impl RuleEvaluator for Callback {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        let Some(name) = token.arg(0) else {
            return Err(FormError::missing_argument(ctx.field(), token.name()));
        };

        if ctx.value().is_empty() {
            return Ok(());
        }

        match ctx.callbacks().callback(name) {
            Some(callback) => callback(ctx.value()),
            None => tracing::debug!(field = ctx.field(), callback = name, "callback not registered"),
        }
        Ok(())
    }
}
