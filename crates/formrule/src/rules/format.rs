//! Format rules: `valid_email`.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::MessageKey;
use crate::context::RuleContext;
use crate::error::FormError;
use crate::parser::RuleToken;

use super::RuleEvaluator;

/// Dot-separated atoms of RFC 5322 "atext" before the `@`; after it either a
/// hostname with a 2-6 letter TLD or a dotted IPv4 address with optional port.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([A-Za-z0-9_!#$%&'*+\-/=?^`{|}~]+\.)*[A-Za-z0-9_!#$%&'*+\-/=?^`{|}~]+@((([a-z0-9][a-z0-9\-]{0,62}[a-z0-9]|[a-z])\.)+[a-z]{2,6}|([0-9]{1,3}\.){3}[0-9]{1,3}(:[0-9]{1,5})?)$",
    )
    .unwrap()
});

/// Fails when the value is not shaped like an e-mail address.
///
/// An empty value on a field that is not `required` passes.
#[derive(Debug, Clone)]
pub struct ValidEmail {
    pattern: Regex,
}

impl ValidEmail {
    /// Uses the built-in address pattern.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern: EMAIL_REGEX.clone(),
        }
    }

    /// Uses a caller-supplied pattern instead.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Whether `input` matches the pattern.
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }
}

impl Default for ValidEmail {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEvaluator for ValidEmail {
    fn evaluate(&self, _token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        if !self.is_match(ctx.value()) && !ctx.skips_when_empty() {
            let label = ctx.label().to_owned();
            ctx.fail(&MessageKey::ValidEmail, &[label.as_str()]);
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
    #[case("john@example.com")]
    #[case("first.last@sub.example.co.uk")]
    #[case("o'brien+tag@example.org")]
    #[case("UPPER@EXAMPLE.COM")]
    #[case("user@192.168.0.1")]
    #[case("user@10.0.0.1:8080")]
    #[case("x@a.io")]
    fn accepts(#[case] input: &str) {
        assert!(ValidEmail::new().is_match(input), "{input}");
    }

    #[rstest]
    #[case("bad")]
    #[case("")]
    #[case("@example.com")]
    #[case("user@")]
    #[case("user@example")]
    #[case("user@-example.com")]
    #[case("user..dots@example.com")]
    #[case("user@example.toolongtld")]
    #[case("sp ace@example.com")]
    fn rejects(#[case] input: &str) {
        assert!(!ValidEmail::new().is_match(input), "{input}");
    }

    #[test]
    fn message_uses_label() {
        let mut h = Harness::new(&[("email", "bad")]).label("email", "Email");
        h.run(&ValidEmail::new(), "email", "required|valid_email", "valid_email")
            .unwrap();
        assert_eq!(
            h.message("email"),
            Some("The Email field must be a valid E-Mail Address.")
        );
    }

    #[test]
    fn optional_empty_passes() {
        let mut h = Harness::new(&[("email", "")]);
        h.run(&ValidEmail::new(), "email", "valid_email", "valid_email")
            .unwrap();
        assert!(h.state.errors.is_empty());
    }

    #[test]
    fn custom_pattern() {
        let strict = ValidEmail::with_pattern(r"^[a-z]+@corp\.example$").unwrap();
        assert!(strict.is_match("ann@corp.example"));
        assert!(!strict.is_match("ann@example.com"));
    }
}
