//! Message templates and overrides.
//!
//! Every failing rule renders a [`MessageKey`] through the catalog. Lookup
//! order, first hit wins:
//!
//! 1. field-scoped override for the key's variant path (`not_equal,string`)
//! 2. field-scoped override for the rule identifier (`not_equal`)
//! 3. global override for the variant path
//! 4. global override for the rule identifier
//! 5. the default template for the key
//!
//! Templates use positional placeholders `%1`, `%2`, ... filled from the
//! replacement list by position.

use std::borrow::Cow;
use std::collections::HashMap;

// ============================================================================
// MESSAGE KEY
// ============================================================================

/// Which phrasing of `not_equal` applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotEqual {
    /// The value matched a literal from the rule arguments.
    Literal,
    /// The value matched another submitted field (`post:<field>`).
    FieldRef,
}

impl NotEqual {
    /// Variant segment used in compound override keys.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Literal => "string",
            Self::FieldRef => "post:key",
        }
    }
}

/// Identifies the template a failing rule renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Required,
    MinLength,
    MaxLength,
    ExactLength,
    Matches,
    ValidEmail,
    NotEqual(NotEqual),
    Depends,
    /// A rule registered by the caller.
    Custom(String),
}

impl MessageKey {
    /// The rule identifier this key belongs to.
    #[must_use]
    pub fn rule(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::ExactLength => "exact_length",
            Self::Matches => "matches",
            Self::ValidEmail => "valid_email",
            Self::NotEqual(_) => "not_equal",
            Self::Depends => "depends",
            Self::Custom(name) => name,
        }
    }

    /// The variant segment, for rules with more than one phrasing.
    #[must_use]
    pub const fn variant(&self) -> Option<&'static str> {
        match self {
            Self::NotEqual(v) => Some(v.segment()),
            _ => None,
        }
    }

    /// Compound `rule,variant` path, or the bare rule identifier.
    #[must_use]
    pub fn path(&self) -> Cow<'_, str> {
        match self.variant() {
            Some(variant) => Cow::Owned(format!("{},{variant}", self.rule())),
            None => Cow::Borrowed(self.rule()),
        }
    }

    /// Maps a rule identifier to its key. Unknown names become `Custom`.
    ///
    /// `not_equal` maps to the literal phrasing; use
    /// [`MessageKey::NotEqual`] directly for the field-reference one.
    #[must_use]
    pub fn from_rule(rule: &str) -> Self {
        match rule {
            "required" => Self::Required,
            "min_length" => Self::MinLength,
            "max_length" => Self::MaxLength,
            "exact_length" => Self::ExactLength,
            "matches" => Self::Matches,
            "valid_email" => Self::ValidEmail,
            "not_equal" => Self::NotEqual(NotEqual::Literal),
            "depends" => Self::Depends,
            other => Self::Custom(other.to_owned()),
        }
    }
}

// ============================================================================
// OVERRIDES
// ============================================================================

/// Where an override applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverrideScope {
    /// Every field.
    Global,
    /// A single field.
    Field(String),
}

/// Caller-supplied templates that replace catalog defaults.
///
/// Keys are a rule identifier (`not_equal`, covering all phrasings) or a
/// compound variant path (`not_equal,post:key`).
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<OverrideScope, HashMap<String, String>>,
}

impl OverrideTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or replaces an override.
    pub fn insert(&mut self, scope: OverrideScope, rule: impl Into<String>, template: impl Into<String>) {
        self.entries
            .entry(scope)
            .or_default()
            .insert(rule.into(), template.into());
    }

    /// Finds the override for `key` on `field`, if any.
    #[must_use]
    pub fn lookup(&self, field: &str, key: &MessageKey) -> Option<&str> {
        let path = key.path();
        let field_scope = OverrideScope::Field(field.to_owned());

        [&field_scope, &OverrideScope::Global]
            .into_iter()
            .filter_map(|scope| self.entries.get(scope))
            .find_map(|table| {
                table
                    .get(path.as_ref())
                    .or_else(|| table.get(key.rule()))
            })
            .map(String::as_str)
    }

    /// Number of installed overrides across all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Whether no override is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every override.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Template used for caller-registered rules with no catalog entry.
pub const FALLBACK_TEMPLATE: &str = "The %1 field is invalid.";

/// Default templates keyed by [`MessageKey`], plus the override table.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    defaults: HashMap<MessageKey, Cow<'static, str>>,
    overrides: OverrideTable,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCatalog {
    /// Creates a catalog holding the built-in English templates.
    #[must_use]
    pub fn new() -> Self {
        let defaults = [
            (MessageKey::Required, "The %1 field is required."),
            (
                MessageKey::MinLength,
                "The %1 field must be at least %2 characters long.",
            ),
            (
                MessageKey::MaxLength,
                "The %1 field must be no more than %2 characters.",
            ),
            (
                MessageKey::ExactLength,
                "The %1 field must be exactly %2 characters.",
            ),
            (MessageKey::Matches, "The %1 field must match the %2."),
            (
                MessageKey::ValidEmail,
                "The %1 field must be a valid E-Mail Address.",
            ),
            (
                MessageKey::NotEqual(NotEqual::FieldRef),
                "The %1 field must not be the same as the %2 field.",
            ),
            (
                MessageKey::NotEqual(NotEqual::Literal),
                "The %1 field must not be %2.",
            ),
            (
                MessageKey::Depends,
                "The %1 field depends on the %2 field being valid.",
            ),
        ]
        .into_iter()
        .map(|(key, template)| (key, Cow::Borrowed(template)))
        .collect();

        Self {
            defaults,
            overrides: OverrideTable::new(),
        }
    }

    /// Sets the default template for a key (typically a custom rule).
    pub fn set_default(&mut self, key: MessageKey, template: impl Into<String>) {
        self.defaults.insert(key, Cow::Owned(template.into()));
    }

    /// The default template for a key, ignoring overrides.
    #[must_use]
    pub fn default_template(&self, key: &MessageKey) -> Option<&str> {
        self.defaults.get(key).map(AsRef::as_ref)
    }

    /// Installs an override.
    pub fn set_override(
        &mut self,
        scope: OverrideScope,
        rule: impl Into<String>,
        template: impl Into<String>,
    ) {
        self.overrides.insert(scope, rule, template);
    }

    /// The override table.
    #[must_use]
    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Drops all overrides, keeping the defaults.
    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// Resolves the template that applies to `key` on `field`.
    #[must_use]
    pub fn template(&self, field: &str, key: &MessageKey) -> &str {
        self.overrides
            .lookup(field, key)
            .or_else(|| self.default_template(key))
            .unwrap_or(FALLBACK_TEMPLATE)
    }

    /// Resolves and renders the message for `key` on `field`.
    #[must_use]
    pub fn render(&self, field: &str, key: &MessageKey, replacements: &[&str]) -> String {
        render_template(self.template(field, key), replacements)
    }
}

// ============================================================================
// TEMPLATING
// ============================================================================

/// Substitutes `%1`, `%2`, ... with `replacements[0]`, `replacements[1]`, ...
///
/// The longest run of digits after `%` is read as the index. Placeholders
/// with no matching replacement, and `%` not followed by a digit, are kept
/// verbatim. Replacement text is not rescanned.
#[must_use]
pub fn render_template(template: &str, replacements: &[&str]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();

        let replacement = after[..digits]
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| replacements.get(i));

        match replacement {
            Some(value) => {
                out.push_str(value);
                rest = &after[digits..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
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
    #[case("The %1 field is required.", &["Name"], "The Name field is required.")]
    #[case("%1 vs %2", &["a", "b"], "a vs b")]
    #[case("%2 before %1", &["a", "b"], "b before a")]
    #[case("%1 and %1", &["x"], "x and x")]
    #[case("100% sure, %1", &["ok"], "100% sure, ok")]
    #[case("missing %3", &["a"], "missing %3")]
    #[case("%0 stays", &["a"], "%0 stays")]
    #[case("no placeholders", &[], "no placeholders")]
    #[case("trailing %", &["a"], "trailing %")]
    fn renders_placeholders(
        #[case] template: &str,
        #[case] replacements: &[&str],
        #[case] expected: &str,
    ) {
        assert_eq!(render_template(template, replacements), expected);
    }

    #[test]
    fn double_digit_placeholder() {
        let values: Vec<String> = (1..=10).map(|i| format!("v{i}")).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        assert_eq!(render_template("%10/%1", &refs), "v10/v1");
    }

    #[test]
    fn replacement_text_is_not_rescanned() {
        assert_eq!(render_template("%1 %2", &["%2", "b"]), "%2 b");
    }

    #[test]
    fn not_equal_variants_have_distinct_templates() {
        let catalog = MessageCatalog::new();
        assert_eq!(
            catalog.render("username", &MessageKey::NotEqual(NotEqual::Literal), &["Username", "admin"]),
            "The Username field must not be admin."
        );
        assert_eq!(
            catalog.render(
                "username",
                &MessageKey::NotEqual(NotEqual::FieldRef),
                &["Username", "Password"]
            ),
            "The Username field must not be the same as the Password field."
        );
    }

    #[test]
    fn field_override_beats_global() {
        let mut catalog = MessageCatalog::new();
        catalog.set_override(OverrideScope::Global, "required", "Global %1");
        catalog.set_override(OverrideScope::Field("email".into()), "required", "Email %1");

        assert_eq!(catalog.render("email", &MessageKey::Required, &["E"]), "Email E");
        assert_eq!(catalog.render("name", &MessageKey::Required, &["N"]), "Global N");
    }

    #[test]
    fn variant_override_beats_rule_override() {
        let mut catalog = MessageCatalog::new();
        catalog.set_override(OverrideScope::Global, "not_equal", "any %1");
        catalog.set_override(OverrideScope::Global, "not_equal,post:key", "field %1");

        let literal = MessageKey::NotEqual(NotEqual::Literal);
        let field_ref = MessageKey::NotEqual(NotEqual::FieldRef);
        assert_eq!(catalog.render("u", &literal, &["U"]), "any U");
        assert_eq!(catalog.render("u", &field_ref, &["U"]), "field U");
    }

    #[test]
    fn custom_rule_falls_back() {
        let mut catalog = MessageCatalog::new();
        let key = MessageKey::from_rule("is_even");
        assert_eq!(key, MessageKey::Custom("is_even".into()));
        assert_eq!(catalog.render("n", &key, &["Number"]), "The Number field is invalid.");

        catalog.set_default(key.clone(), "%1 must be even.");
        assert_eq!(catalog.render("n", &key, &["Number"]), "Number must be even.");
    }

    #[test]
    fn override_table_counts() {
        let mut table = OverrideTable::new();
        assert!(table.is_empty());
        table.insert(OverrideScope::Global, "required", "a");
        table.insert(OverrideScope::Field("x".into()), "required", "b");
        table.insert(OverrideScope::Field("x".into()), "required", "c");
        assert_eq!(table.len(), 2);
        table.clear();
        assert!(table.is_empty());
    }
}
