//! Rule-string parsing.
//!
//! A rule string is a `|`-separated list of rule tokens. Each token is an
//! identifier optionally followed by one bracketed argument list:
//!
//! ```text
//! required|min_length[3]|not_equal[admin,post:username]
//! ```
//!
//! Bracket content is split on `,` into the token's arguments. There is no
//! escaping: a `|` always ends a token and only the first `[...]` segment of a
//! token is read. Identifiers are not checked here; unknown ones are skipped
//! at dispatch time.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Separator between rule tokens.
pub const RULE_SEPARATOR: char = '|';

/// Separator between arguments inside brackets.
pub const ARGUMENT_SEPARATOR: char = ',';

// ============================================================================
// RULE TOKEN
// ============================================================================

/// One parsed rule: identifier plus bracket arguments.
///
/// `min_length[3]` parses to name `min_length` and args `["3"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleToken {
    raw: String,
    name: String,
    args: SmallVec<[String; 2]>,
}

impl RuleToken {
    /// Parses a single token (no `|` handling).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (name, args) = match bracket_segment(raw) {
            Some((open, close)) => {
                let inner = &raw[open + 1..close];
                let args = inner
                    .split(ARGUMENT_SEPARATOR)
                    .map(str::to_owned)
                    .collect();
                (strip_brackets(raw), args)
            }
            None => (raw.to_owned(), SmallVec::new()),
        };

        Self {
            raw: raw.to_owned(),
            name,
            args,
        }
    }

    /// The rule identifier, with the bracket segment removed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The token text exactly as written in the rule string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// All bracket arguments in order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Whether the token was written with a bracket segment.
    #[must_use]
    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Finds the first `[` and the first `]` after it.
fn bracket_segment(token: &str) -> Option<(usize, usize)> {
    let open = token.find('[')?;
    let close = token[open + 1..].find(']')? + open + 1;
    Some((open, close))
}

/// Removes every `[...]` segment from a token, leaving the identifier.
fn strip_brackets(token: &str) -> String {
    let mut name = String::with_capacity(token.len());
    let mut rest = token;

    while let Some((open, close)) = bracket_segment(rest) {
        name.push_str(&rest[..open]);
        rest = &rest[close + 1..];
    }
    name.push_str(rest);
    name
}

// ============================================================================
// RULE SPEC
// ============================================================================

/// The ordered rule tokens assigned to one field.
///
/// Parsed once at registration and kept alongside the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    source: String,
    tokens: Vec<RuleToken>,
}

impl RuleSpec {
    /// Parses a pipe-delimited rule string.
    #[must_use]
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let tokens = parse_rule_string(&source);
        Self { source, tokens }
    }

    /// The rule string this spec was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tokens in declaration order.
    #[must_use]
    pub fn tokens(&self) -> &[RuleToken] {
        &self.tokens
    }

    /// Whether the rule set contains the exact token `required`.
    ///
    /// Only the bare token counts; `required[gate]` does not make a field
    /// required for the length and format rules.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.tokens.iter().any(|t| t.raw() == "required")
    }
}

impl From<RuleList> for RuleSpec {
    fn from(list: RuleList) -> Self {
        Self::parse(list.into_pipe_string())
    }
}

/// Splits a rule string into tokens.
///
/// An empty string still yields one (empty) token.
#[must_use]
pub fn parse_rule_string(rules: &str) -> Vec<RuleToken> {
    rules.split(RULE_SEPARATOR).map(RuleToken::parse).collect()
}

// ============================================================================
// RULE LIST
// ============================================================================

/// Rules as supplied by a caller: a pipe string or a list of rule names.
///
/// Deserializes from either a JSON string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleList {
    /// `"required|min_length[3]"`
    Pipe(String),
    /// `["required", "min_length[3]"]`
    List(Vec<String>),
}

impl RuleList {
    /// Joins list forms with `|`; pipe strings pass through.
    #[must_use]
    pub fn into_pipe_string(self) -> String {
        match self {
            Self::Pipe(rules) => rules,
            Self::List(rules) => rules.join("|"),
        }
    }
}

impl From<&str> for RuleList {
    fn from(rules: &str) -> Self {
        Self::Pipe(rules.to_owned())
    }
}

impl From<String> for RuleList {
    fn from(rules: String) -> Self {
        Self::Pipe(rules)
    }
}

impl From<Vec<String>> for RuleList {
    fn from(rules: Vec<String>) -> Self {
        Self::List(rules)
    }
}

impl From<&[&str]> for RuleList {
    fn from(rules: &[&str]) -> Self {
        Self::List(rules.iter().map(|r| (*r).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleList {
    fn from(rules: [&str; N]) -> Self {
        Self::List(rules.iter().map(|r| (*r).to_owned()).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("required", "required", &[])]
    #[case("min_length[3]", "min_length", &["3"])]
    #[case("not_equal[admin,post:other]", "not_equal", &["admin", "post:other"])]
    #[case("matches[password]", "matches", &["password"])]
    #[case("callback[]", "callback", &[""])]
    #[case("exact_length[5]x[9]", "exact_lengthx", &["5"])]
    fn parses_token(#[case] raw: &str, #[case] name: &str, #[case] args: &[&str]) {
        let token = RuleToken::parse(raw);
        assert_eq!(token.name(), name);
        assert_eq!(token.args(), args);
        assert_eq!(token.raw(), raw);
    }

    #[test]
    fn spec_keeps_source_string() {
        let spec = RuleSpec::from(RuleList::from(["required", "min_length[3]"]));
        assert_eq!(spec.source(), "required|min_length[3]");
        assert_eq!(spec.tokens().len(), 2);
    }

    #[test]
    fn splits_on_pipe_in_order() {
        let tokens = parse_rule_string("required|min_length[3]|valid_email");
        let names: Vec<_> = tokens.iter().map(RuleToken::name).collect();
        assert_eq!(names, vec!["required", "min_length", "valid_email"]);
    }

    #[test]
    fn empty_string_yields_one_token() {
        let tokens = parse_rule_string("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name(), "");
        assert!(!tokens[0].has_args());
    }

    #[test]
    fn unterminated_bracket_is_part_of_name() {
        let token = RuleToken::parse("min_length[3");
        assert_eq!(token.name(), "min_length[3");
        assert!(!token.has_args());
    }

    #[test]
    fn list_and_pipe_forms_are_equivalent() {
        let from_list = RuleSpec::from(RuleList::from(["required", "valid_email"]));
        let from_pipe = RuleSpec::from(RuleList::from("required|valid_email"));
        assert_eq!(from_list, from_pipe);
    }

    #[test]
    fn required_detection_is_literal() {
        assert!(RuleSpec::parse("min_length[2]|required").is_required());
        assert!(!RuleSpec::parse("required[is_business]|min_length[2]").is_required());
        assert!(!RuleSpec::parse("valid_email").is_required());
    }

    #[test]
    fn rule_list_deserializes_both_shapes() {
        let pipe: RuleList = serde_json::from_str(r#""required|valid_email""#).unwrap();
        let list: RuleList = serde_json::from_str(r#"["required", "valid_email"]"#).unwrap();
        assert_eq!(pipe.into_pipe_string(), list.into_pipe_string());
    }
}
