//! Rule evaluators and the registry that dispatches to them.
//!
//! Each rule identifier maps to one [`RuleEvaluator`]. The built-in set:
//!
//! | Identifier        | Evaluator                 |
//! |-------------------|---------------------------|
//! | `required`        | [`Required`]              |
//! | `min_length[n]`   | [`MinLength`]             |
//! | `max_length[n]`   | [`MaxLength`]             |
//! | `exact_length[n]` | [`ExactLength`]           |
//! | `matches[f]`      | [`Matches`]               |
//! | `not_equal[...]`  | [`NotEqualTo`]            |
//! | `valid_email`     | [`ValidEmail`]            |
//! | `depends[f]`      | [`Depends`]               |
//! | `callback[name]`  | [`Callback`]              |
//! | `honeypot`        | [`Honeypot`]              |
//!
//! Evaluators record failures through [`RuleContext::fail`] and return `Err`
//! only for configuration problems.

pub mod callback;
pub mod compare;
pub mod format;
pub mod length;
pub mod presence;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use callback::Callback;
pub use compare::{Depends, Matches, NotEqualTo};
pub use format::ValidEmail;
pub use length::{ExactLength, LengthMode, MaxLength, MinLength};
pub use presence::{Honeypot, Required};

use crate::context::RuleContext;
use crate::error::FormError;
use crate::parser::RuleToken;

// ============================================================================
// EVALUATOR TRAIT
// ============================================================================

/// A single rule kind.
///
/// Implemented by the built-ins and by any
/// `Fn(&RuleToken, &mut RuleContext<'_>) -> Result<(), FormError>` closure.
pub trait RuleEvaluator: Send + Sync {
    /// Checks the context's field against `token`.
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError>;
}

impl<F> RuleEvaluator for F
where
    F: Fn(&RuleToken, &mut RuleContext<'_>) -> Result<(), FormError> + Send + Sync,
{
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        self(token, ctx)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Maps rule identifiers to evaluators.
#[derive(Clone)]
pub struct RuleRegistry {
    evaluators: HashMap<String, Arc<dyn RuleEvaluator>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl RuleRegistry {
    /// A registry with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            evaluators: HashMap::new(),
        }
    }

    /// A registry holding the ten built-in rules.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("required", Required);
        registry.register("min_length", MinLength);
        registry.register("max_length", MaxLength);
        registry.register("exact_length", ExactLength);
        registry.register("matches", Matches);
        registry.register("not_equal", NotEqualTo);
        registry.register("valid_email", ValidEmail::new());
        registry.register("depends", Depends);
        registry.register("callback", Callback);
        registry.register("honeypot", Honeypot);
        registry
    }

    /// Registers `evaluator` under `name`, replacing any previous one.
    pub fn register<E>(&mut self, name: impl Into<String>, evaluator: E)
    where
        E: RuleEvaluator + 'static,
    {
        self.evaluators.insert(name.into(), Arc::new(evaluator));
    }

    /// The evaluator for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn RuleEvaluator>> {
        self.evaluators.get(name)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(name)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// Whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.evaluators.keys().collect();
        names.sort();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}

// ============================================================================
// ARGUMENT HELPERS
// ============================================================================

/// The first bracket argument, or [`FormError::MissingArgument`].
pub(crate) fn first_arg<'t>(token: &'t RuleToken, field: &str) -> Result<&'t str, FormError> {
    token
        .arg(0)
        .ok_or_else(|| FormError::missing_argument(field, token.name()))
}

/// The first bracket argument parsed as a length.
pub(crate) fn length_arg(token: &RuleToken, field: &str) -> Result<usize, FormError> {
    let raw = first_arg(token, field)?;
    raw.trim()
        .parse()
        .map_err(|_| FormError::invalid_argument(field, token.name(), raw))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Runs a single token against a submission without an engine.

    use std::collections::HashMap;

    use indexmap::IndexMap;

    use super::*;
    use crate::callbacks::CallbackRegistry;
    use crate::catalog::MessageCatalog;
    use crate::context::{PassInputs, PassState};
    use crate::parser::RuleSpec;

    pub struct Harness {
        pub values: IndexMap<String, String>,
        pub labels: HashMap<String, String>,
        pub catalog: MessageCatalog,
        pub callbacks: CallbackRegistry,
        pub state: PassState,
    }

    impl Harness {
        pub fn new(values: &[(&str, &str)]) -> Self {
            Self {
                values: values
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect(),
                labels: HashMap::new(),
                catalog: MessageCatalog::new(),
                callbacks: CallbackRegistry::new(),
                state: PassState::default(),
            }
        }

        pub fn label(mut self, field: &str, label: &str) -> Self {
            self.labels.insert(field.to_owned(), label.to_owned());
            self
        }

        /// Evaluates `token` from `rules` on `field` with `evaluator`.
        pub fn run(
            &mut self,
            evaluator: &dyn RuleEvaluator,
            field: &str,
            rules: &str,
            token: &str,
        ) -> Result<(), FormError> {
            let spec = RuleSpec::parse(rules);
            let token = RuleToken::parse(token);
            let value = self.values.get(field).cloned().unwrap_or_default();
            let inputs = PassInputs {
                values: &self.values,
                labels: &self.labels,
                catalog: &self.catalog,
                callbacks: &self.callbacks,
                length_mode: LengthMode::Chars,
            };
            let mut ctx = RuleContext::new(field, &value, &spec, inputs, &mut self.state);
            evaluator.evaluate(&token, &mut ctx)
        }

        pub fn message(&self, field: &str) -> Option<&str> {
            self.state.errors.message(field)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_registered() {
        let registry = RuleRegistry::with_builtins();
        assert_eq!(registry.len(), 10);
        for name in [
            "required",
            "min_length",
            "max_length",
            "exact_length",
            "matches",
            "not_equal",
            "valid_email",
            "depends",
            "callback",
            "honeypot",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn closures_register_as_rules() {
        let mut registry = RuleRegistry::empty();
        registry.register(
            "noop",
            |_: &RuleToken, _: &mut RuleContext<'_>| -> Result<(), FormError> { Ok(()) },
        );
        assert!(registry.contains("noop"));
        assert!(!registry.contains("required"));
    }

    #[test]
    fn length_arg_errors() {
        let missing = RuleToken::parse("min_length");
        assert_eq!(
            length_arg(&missing, "name"),
            Err(FormError::missing_argument("name", "min_length"))
        );

        let bad = RuleToken::parse("min_length[three]");
        assert_eq!(
            length_arg(&bad, "name"),
            Err(FormError::invalid_argument("name", "min_length", "three"))
        );

        let ok = RuleToken::parse("min_length[ 3 ]");
        assert_eq!(length_arg(&ok, "name"), Ok(3));
    }
}
