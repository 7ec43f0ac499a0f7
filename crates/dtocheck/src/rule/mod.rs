//! Compiled constraints.
//!
//! A [`Rule`] pairs a [`RuleKind`] with a stringified argument and a
//! [`Predicate`] over one JSON value. Rules never carry per-call state, so a
//! single instance can be shared by every field and every validation pass.
//!
//! Error messages are rendered from `(kind, field name, argument)` alone, see
//! [`RuleKind::render`].

mod date;
mod predicates;
mod registry;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::FieldError;

pub use date::{DateLayout, DEFAULT_DATE_LAYOUT};
pub use predicates::{
    CollectionLength, Email, Exists, LengthBound, MatchesDate, StrLength, TypeOf,
};
pub use registry::{HintCompiler, HintFamily, RuleRegistry, RuleRegistryBuilder};

// ============================================================================
// RULE KIND
// ============================================================================

/// The fixed vocabulary of rule types.
///
/// Every [`FieldError`] carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleKind {
    /// Value must be present and non-empty.
    #[serde(rename = "required")]
    Required,
    /// Value must be convertible to the declared type.
    #[serde(rename = "type")]
    Type,
    /// String must have exactly N characters.
    #[serde(rename = "length")]
    Length,
    /// String must have at least N characters.
    #[serde(rename = "minlength")]
    MinLength,
    /// String must have at most N characters.
    #[serde(rename = "maxlength")]
    MaxLength,
    /// Collection must have exactly N elements.
    #[serde(rename = "slice:len")]
    CollectionLength,
    /// Collection must have at least N elements.
    #[serde(rename = "slice:minlen")]
    CollectionMinLength,
    /// Collection must have at most N elements.
    #[serde(rename = "slice:maxlen")]
    CollectionMaxLength,
    /// String must be a mail address.
    #[serde(rename = "email")]
    Email,
    /// String must parse under a date layout.
    #[serde(rename = "date")]
    Date,
}

impl RuleKind {
    /// All kinds, in declaration order.
    pub const ALL: [RuleKind; 10] = [
        RuleKind::Required,
        RuleKind::Type,
        RuleKind::Length,
        RuleKind::MinLength,
        RuleKind::MaxLength,
        RuleKind::CollectionLength,
        RuleKind::CollectionMinLength,
        RuleKind::CollectionMaxLength,
        RuleKind::Email,
        RuleKind::Date,
    ];

    /// The stable identifier reported on field errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Type => "type",
            RuleKind::Length => "length",
            RuleKind::MinLength => "minlength",
            RuleKind::MaxLength => "maxlength",
            RuleKind::CollectionLength => "slice:len",
            RuleKind::CollectionMinLength => "slice:minlen",
            RuleKind::CollectionMaxLength => "slice:maxlen",
            RuleKind::Email => "email",
            RuleKind::Date => "date",
        }
    }

    /// Looks a kind up by its identifier.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == identifier)
    }

    /// True for the element-count rules, which apply to a collection as a
    /// whole rather than to each of its elements.
    #[must_use]
    pub const fn is_collection_count(self) -> bool {
        matches!(
            self,
            RuleKind::CollectionLength
                | RuleKind::CollectionMinLength
                | RuleKind::CollectionMaxLength
        )
    }

    /// Renders the message for a violation of this kind.
    #[must_use]
    pub fn render(self, field: &str, argument: &str) -> String {
        match self {
            RuleKind::Required => {
                format!("'{field}' field of type '{argument}' is missing or empty")
            }
            RuleKind::Type => {
                let expected = if argument == "struct" { "json" } else { argument };
                format!("'{field}' field type must be '{expected}'")
            }
            RuleKind::Length => format!("'{field}' field must have {argument} characters"),
            RuleKind::MinLength => {
                format!("'{field}' field must have at least {argument} characters")
            }
            RuleKind::MaxLength => {
                format!("'{field}' field must have {argument} characters at max")
            }
            RuleKind::CollectionLength => {
                format!("the '{field}' field must have {argument} elements")
            }
            RuleKind::CollectionMinLength => {
                format!("the '{field}' field must have at least {argument} elements")
            }
            RuleKind::CollectionMaxLength => {
                format!("the '{field}' field must have {argument} elements at max")
            }
            RuleKind::Email => {
                format!("the value provided for the '{field}' field isn't a valid email")
            }
            RuleKind::Date => format!("'{field}' field doesn't match with the '{argument}' format"),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PREDICATE
// ============================================================================

/// A stateless check over a single value.
///
/// `Value::Null` stands for both an explicit `null` and an absent key.
pub trait Predicate: Send + Sync {
    /// Returns true when the value satisfies the constraint.
    fn test(&self, value: &Value) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn test(&self, value: &Value) -> bool {
        self(value)
    }
}

// ============================================================================
// RULE
// ============================================================================

/// One compiled, executable constraint.
#[derive(Clone)]
pub struct Rule {
    kind: RuleKind,
    description: Cow<'static, str>,
    argument: Cow<'static, str>,
    predicate: Arc<dyn Predicate>,
}

impl Rule {
    /// Creates a rule from its parts.
    pub fn new(
        kind: RuleKind,
        description: impl Into<Cow<'static, str>>,
        argument: impl Into<Cow<'static, str>>,
        predicate: impl Predicate + 'static,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            argument: argument.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// The rule's kind.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// The rule type identifier, e.g. `"slice:minlen"`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Human-readable description of what the rule checks.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The stringified argument used in error messages.
    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Runs the predicate.
    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.predicate.test(value)
    }

    /// Renders a violation of this rule for `field_name`.
    #[must_use]
    pub fn generate_error(&self, field_name: impl Into<String>) -> FieldError {
        FieldError::new(self.kind, field_name, self.argument.clone().into_owned())
    }

    /// True when the rule applies to a collection as a whole.
    #[must_use]
    pub fn is_slice_rule(&self) -> bool {
        self.kind.is_collection_count()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("argument", &self.argument)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn identifiers_round_trip() {
        for kind in RuleKind::ALL {
            assert_eq!(RuleKind::from_identifier(kind.as_str()), Some(kind));
        }
        assert_eq!(RuleKind::from_identifier("nope"), None);
    }

    #[test]
    fn only_count_rules_are_slice_rules() {
        let counts: Vec<_> = RuleKind::ALL
            .into_iter()
            .filter(|k| k.is_collection_count())
            .collect();
        assert_eq!(
            counts,
            vec![
                RuleKind::CollectionLength,
                RuleKind::CollectionMinLength,
                RuleKind::CollectionMaxLength
            ]
        );
    }

    #[test]
    fn type_message_renders_struct_as_json() {
        assert_eq!(
            RuleKind::Type.render("address", "struct"),
            "'address' field type must be 'json'"
        );
        assert_eq!(
            RuleKind::Type.render("age", "i64"),
            "'age' field type must be 'i64'"
        );
    }

    #[test]
    fn closure_predicates_plug_in() {
        let rule = Rule::new(RuleKind::Email, "always fails", "", |_: &Value| false);
        assert!(!rule.is_valid(&json!("a@b.com")));
        let err = rule.generate_error("contact");
        assert_eq!(err.rule_type(), "email");
        assert_eq!(
            err.message(),
            "the value provided for the 'contact' field isn't a valid email"
        );
    }

    #[test]
    fn serializes_as_identifier() {
        assert_eq!(
            serde_json::to_value(RuleKind::CollectionMaxLength).unwrap(),
            json!("slice:maxlen")
        );
    }
}
