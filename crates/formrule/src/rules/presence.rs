//! Presence rules: `required` and `honeypot`.

use crate::catalog::MessageKey;
use crate::context::RuleContext;
use crate::error::FormError;
use crate::parser::RuleToken;

use super::RuleEvaluator;

/// Fails when the value is empty.
///
/// With an argument naming a registered required-gate (`required[gate]`),
/// emptiness only fails when the gate returns `true`. The gate is called with
/// no arguments. An argument that names no registered gate is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Required;

impl RuleEvaluator for Required {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        let gate = token.arg(0).and_then(|name| ctx.callbacks().gate(name));

        let fails = match gate {
            Some(gate) => {
                let applies = gate();
                ctx.value().is_empty() && applies
            }
            None => ctx.value().is_empty(),
        };

        if fails {
            let label = ctx.label().to_owned();
            ctx.fail(&MessageKey::Required, &[label.as_str()]);
        }
        Ok(())
    }
}

/// Trap field for bots: any non-empty value fails the whole pass.
///
/// No message is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Honeypot;

impl RuleEvaluator for Honeypot {
    fn evaluate(&self, _token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        if !ctx.value().is_empty() {
            tracing::debug!(field = ctx.field(), "honeypot field filled");
            ctx.force_failure();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::Harness;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", true)]
    #[case("x", false)]
    #[case("0", false)]
    fn required_plain(#[case] value: &str, #[case] fails: bool) {
        let mut h = Harness::new(&[("name", value)]).label("name", "Name");
        h.run(&Required, "name", "required", "required").unwrap();
        assert_eq!(h.message("name").is_some(), fails);
        if fails {
            assert_eq!(h.message("name"), Some("The Name field is required."));
        }
    }

    #[rstest]
    #[case(true, "", true)]
    #[case(false, "", false)]
    #[case(true, "filled", false)]
    fn required_gated(#[case] gate: bool, #[case] value: &str, #[case] fails: bool) {
        let mut h = Harness::new(&[("vat", value)]);
        h.callbacks.register_gate("is_business", move || gate);
        h.run(&Required, "vat", "required[is_business]", "required[is_business]")
            .unwrap();
        assert_eq!(h.message("vat").is_some(), fails);
    }

    #[test]
    fn required_unregistered_gate_behaves_plain() {
        let mut h = Harness::new(&[("vat", "")]);
        h.run(&Required, "vat", "required[nope]", "required[nope]").unwrap();
        assert_eq!(h.message("vat"), Some("The vat field is required."));
    }

    #[test]
    fn honeypot_forces_failure_silently() {
        let mut h = Harness::new(&[("website", "spam")]);
        h.run(&Honeypot, "website", "honeypot", "honeypot").unwrap();
        assert!(h.state.forced_failure);
        assert!(h.state.errors.is_empty());
    }

    #[test]
    fn honeypot_empty_passes() {
        let mut h = Harness::new(&[("website", "")]);
        h.run(&Honeypot, "website", "honeypot", "honeypot").unwrap();
        assert!(!h.state.forced_failure);
    }
}
