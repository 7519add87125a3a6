//! Comparison rules: `matches[field]`, `not_equal[...]`, `depends[field]`.
//!
//! These read other submitted fields. A reference to a field that was not
//! submitted is a configuration error, reported as
//! [`FormError::UnknownFieldReference`].

use crate::catalog::{MessageKey, NotEqual};
use crate::context::RuleContext;
use crate::error::FormError;
use crate::parser::RuleToken;

use super::{RuleEvaluator, first_arg};

/// Prefix marking a `not_equal` argument as a field reference.
pub const FIELD_REF_PREFIX: &str = "post:";

/// Fails when the value differs from another submitted field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Matches;

impl RuleEvaluator for Matches {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        let other = first_arg(token, ctx.field())?;
        let other_value = ctx.submitted(token.name(), other)?;

        if ctx.value() != other_value {
            let label = ctx.label().to_owned();
            let other_label = ctx.label_of(other).to_owned();
            ctx.fail(&MessageKey::Matches, &[label.as_str(), other_label.as_str()]);
        }
        Ok(())
    }
}

/// One disallowed value from a `not_equal` argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disallowed<'a> {
    /// A literal string.
    Literal(&'a str),
    /// Another submitted field, written `post:<field>`.
    Field(&'a str),
}

impl<'a> Disallowed<'a> {
    /// Classifies one argument.
    #[must_use]
    pub fn parse(arg: &'a str) -> Self {
        match arg.strip_prefix(FIELD_REF_PREFIX) {
            Some(field) => Self::Field(field),
            None => Self::Literal(arg),
        }
    }
}

/// Fails when the value equals any listed literal or referenced field.
///
/// Arguments are checked in order and the first match decides the message:
/// `not_equal[admin,post:password]` on `admin` renders the literal phrasing,
/// on a value equal to the `password` field the field-reference phrasing.
/// A `post:` reference to a field that was not submitted is reported after
/// the remaining arguments have been checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NotEqualTo;

impl RuleEvaluator for NotEqualTo {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        if !token.has_args() {
            return Err(FormError::missing_argument(ctx.field(), token.name()));
        }

        let mut lookup_error = None;

        for arg in token.args() {
            let (variant, shown) = match Disallowed::parse(arg) {
                Disallowed::Field(other) => match ctx.submitted(token.name(), other) {
                    Ok(other_value) if ctx.value() == other_value => {
                        (NotEqual::FieldRef, ctx.label_of(other).to_owned())
                    }
                    Ok(_) => continue,
                    Err(err) => {
                        lookup_error.get_or_insert(err);
                        continue;
                    }
                },
                Disallowed::Literal(literal) => {
                    if ctx.value() != literal {
                        continue;
                    }
                    (NotEqual::Literal, literal.to_owned())
                }
            };

            let label = ctx.label().to_owned();
            ctx.fail(&MessageKey::NotEqual(variant), &[label.as_str(), shown.as_str()]);
            break;
        }

        lookup_error.map_or(Ok(()), Err)
    }
}

/// Fails when another field already has an error in this pass.
///
/// Only fields validated earlier in submission order can have one. The other
/// field must be part of the submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Depends;

impl RuleEvaluator for Depends {
    fn evaluate(&self, token: &RuleToken, ctx: &mut RuleContext<'_>) -> Result<(), FormError> {
        let other = first_arg(token, ctx.field())?;
        ctx.submitted(token.name(), other)?;

        if ctx.has_error(other) {
            let label = ctx.label().to_owned();
            let other_label = ctx.label_of(other).to_owned();
            ctx.fail(&MessageKey::Depends, &[label.as_str(), other_label.as_str()]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::FieldError;
    use crate::rules::test_support::Harness;
    use pretty_assertions::assert_eq;

    #[test]
    fn matches_passes_on_equal() {
        let mut h = Harness::new(&[("password", "s3cret"), ("confirm", "s3cret")]);
        h.run(&Matches, "confirm", "matches[password]", "matches[password]")
            .unwrap();
        assert!(h.state.errors.is_empty());
    }

    #[test]
    fn matches_fails_with_both_labels() {
        let mut h = Harness::new(&[("password", "s3cret"), ("confirm", "other")])
            .label("password", "Password")
            .label("confirm", "Confirmation");
        h.run(&Matches, "confirm", "matches[password]", "matches[password]")
            .unwrap();
        assert_eq!(
            h.message("confirm"),
            Some("The Confirmation field must match the Password.")
        );
    }

    #[test]
    fn matches_unknown_field_is_config_error() {
        let mut h = Harness::new(&[("confirm", "x")]);
        let err = h
            .run(&Matches, "confirm", "matches[password]", "matches[password]")
            .unwrap_err();
        assert_eq!(
            err,
            FormError::unknown_field_reference("confirm", "matches", "password")
        );
    }

    #[test]
    fn not_equal_literal_variant() {
        let mut h = Harness::new(&[("username", "admin"), ("other", "x")])
            .label("username", "Username");
        h.run(
            &NotEqualTo,
            "username",
            "not_equal[admin,post:other]",
            "not_equal[admin,post:other]",
        )
        .unwrap();
        let error = h.state.errors.get("username").unwrap();
        assert_eq!(error.message, "The Username field must not be admin.");
        assert_eq!(error.code, "not_equal,string");
    }

    #[test]
    fn not_equal_field_variant() {
        let mut h = Harness::new(&[("username", "bob"), ("other", "bob")])
            .label("username", "Username")
            .label("other", "Other");
        h.run(
            &NotEqualTo,
            "username",
            "not_equal[admin,post:other]",
            "not_equal[admin,post:other]",
        )
        .unwrap();
        let error = h.state.errors.get("username").unwrap();
        assert_eq!(
            error.message,
            "The Username field must not be the same as the Other field."
        );
        assert_eq!(error.code, "not_equal,post:key");
    }

    #[test]
    fn not_equal_passes_when_nothing_matches() {
        let mut h = Harness::new(&[("username", "carol"), ("other", "bob")]);
        h.run(
            &NotEqualTo,
            "username",
            "not_equal[admin,root,post:other]",
            "not_equal[admin,root,post:other]",
        )
        .unwrap();
        assert!(h.state.errors.is_empty());
    }

    #[test]
    fn not_equal_first_match_wins() {
        let mut h = Harness::new(&[("username", "root"), ("other", "root")]);
        h.run(
            &NotEqualTo,
            "username",
            "not_equal[root,post:other]",
            "not_equal[root,post:other]",
        )
        .unwrap();
        assert_eq!(h.state.errors.get("username").unwrap().code, "not_equal,string");
    }

    #[test]
    fn not_equal_checks_past_unknown_reference() {
        let mut h = Harness::new(&[("username", "admin")]).label("username", "Username");
        let err = h
            .run(
                &NotEqualTo,
                "username",
                "not_equal[post:missing,admin]",
                "not_equal[post:missing,admin]",
            )
            .unwrap_err();
        assert_eq!(
            err,
            FormError::unknown_field_reference("username", "not_equal", "missing")
        );
        assert_eq!(h.message("username"), Some("The Username field must not be admin."));
    }

    #[test]
    fn disallowed_parsing() {
        assert_eq!(Disallowed::parse("post:email"), Disallowed::Field("email"));
        assert_eq!(Disallowed::parse("admin"), Disallowed::Literal("admin"));
        assert_eq!(Disallowed::parse("xpost:email"), Disallowed::Literal("xpost:email"));
    }

    #[test]
    fn depends_on_failed_field() {
        let mut h = Harness::new(&[("email", "bad"), ("newsletter", "yes")])
            .label("email", "Email")
            .label("newsletter", "Newsletter");
        h.state
            .errors
            .insert_first(FieldError::new("email", "valid_email", "bad email"));
        h.run(&Depends, "newsletter", "depends[email]", "depends[email]")
            .unwrap();
        assert_eq!(
            h.message("newsletter"),
            Some("The Newsletter field depends on the Email field being valid.")
        );
    }

    #[test]
    fn depends_unknown_field_is_config_error() {
        let mut h = Harness::new(&[("newsletter", "yes")]);
        let err = h
            .run(&Depends, "newsletter", "depends[emial]", "depends[emial]")
            .unwrap_err();
        assert_eq!(
            err,
            FormError::unknown_field_reference("newsletter", "depends", "emial")
        );
        assert!(h.state.errors.is_empty());
    }

    #[test]
    fn depends_on_valid_field() {
        let mut h = Harness::new(&[("email", "a@b.co"), ("newsletter", "yes")]);
        h.run(&Depends, "newsletter", "depends[email]", "depends[email]")
            .unwrap();
        assert!(h.state.errors.is_empty());
    }
}
