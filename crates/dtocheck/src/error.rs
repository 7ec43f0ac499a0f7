//! Error types for validation failures
//!
//! - [`FieldError`] records one rule violation on one (possibly indexed) field.
//! - [`ValidationError`] aggregates the violations of a single validation call.
//! - [`SchemaError`] is raised while describing a schema, before any input is seen.
//! - [`DtoError`] is the umbrella returned by the DTO entry points.

use std::fmt;

use serde::Serialize;

use crate::rule::RuleKind;

// ============================================================================
// FIELD ERROR
// ============================================================================

/// A single rule violation.
///
/// The message is derived from `(rule, name, argument)` and nothing else, so
/// an error can always be rebuilt from its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    name: String,
    message: String,
    #[serde(rename = "rule_type")]
    rule: RuleKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    argument: String,
}

impl FieldError {
    /// Creates an error and renders its message.
    pub fn new(rule: RuleKind, name: impl Into<String>, argument: impl Into<String>) -> Self {
        let name = name.into();
        let argument = argument.into();
        let message = rule.render(&name, &argument);
        Self {
            name,
            message,
            rule,
            argument,
        }
    }

    /// Field name, suffixed with `[i]` for collection elements.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered, human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The rule type identifier, e.g. `"required"`.
    #[must_use]
    pub fn rule_type(&self) -> &'static str {
        self.rule.as_str()
    }

    /// The rule kind that produced this error.
    #[must_use]
    pub fn rule(&self) -> RuleKind {
        self.rule
    }

    /// The rule argument the message was rendered with.
    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldError {}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Ordered report of every violation found by one validation call.
///
/// Never empty: [`ValidationError::from_field_errors`] returns `None` when
/// there is nothing to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Wraps a list of field errors, or returns `None` if it is empty.
    #[must_use]
    pub fn from_field_errors(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// All field errors in discovery order.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Every rendered message.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(FieldError::message).collect()
    }

    /// Every failing field name.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(FieldError::name).collect()
    }

    /// Every rule type identifier.
    #[must_use]
    pub fn rule_types(&self) -> Vec<&'static str> {
        self.errors.iter().map(FieldError::rule_type).collect()
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the field errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Consumes the report, returning the raw list.
    #[must_use]
    pub fn into_field_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            f.write_str(error.message())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl IntoIterator for ValidationError {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationError {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// ============================================================================
// SCHEMA / DTO ERRORS
// ============================================================================

/// Errors raised while turning a schema description into fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A hint matched no compiler while the strict hint policy was active.
    #[error("field '{field}' carries unrecognized hint '{hint}'")]
    UnknownHint {
        /// The field carrying the hint.
        field: String,
        /// The offending token.
        hint: String,
    },
}

/// Errors returned by the DTO entry points.
#[derive(Debug, thiserror::Error)]
pub enum DtoError {
    /// The input violated one or more rules.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationError),

    /// The schema could not be described.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The input could not be represented as a JSON tree.
    #[error("failed to encode input: {0}")]
    Encode(#[source] serde_json::Error),

    /// The validated tree did not deserialize into the schema type.
    #[error("failed to decode input: {0}")]
    Decode(#[source] serde_json::Error),
}

impl DtoError {
    /// The validation report, if this is a validation failure.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            DtoError::Invalid(report) => Some(report),
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ValidationError {
        ValidationError::from_field_errors(vec![
            FieldError::new(RuleKind::Required, "name", "string"),
            FieldError::new(RuleKind::MinLength, "tags[1]", "3"),
        ])
        .unwrap()
    }

    #[test]
    fn empty_list_is_success() {
        assert!(ValidationError::from_field_errors(Vec::new()).is_none());
    }

    #[test]
    fn derived_views() {
        let report = sample();
        assert_eq!(report.fields(), vec!["name", "tags[1]"]);
        assert_eq!(report.rule_types(), vec!["required", "minlength"]);
        assert_eq!(
            report.messages(),
            vec![
                "'name' field of type 'string' is missing or empty",
                "'tags[1]' field must have at least 3 characters",
            ]
        );
    }

    #[test]
    fn display_joins_messages() {
        assert_eq!(
            sample().to_string(),
            "'name' field of type 'string' is missing or empty & \
             'tags[1]' field must have at least 3 characters"
        );
    }

    #[test]
    fn message_is_regenerable() {
        for error in sample() {
            let rebuilt = FieldError::new(error.rule(), error.name(), error.argument());
            assert_eq!(rebuilt, error);
        }
    }

    #[test]
    fn serializes_as_list() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value[1],
            json!({
                "name": "tags[1]",
                "message": "'tags[1]' field must have at least 3 characters",
                "rule_type": "minlength",
                "argument": "3",
            })
        );
    }

    #[test]
    fn dto_error_exposes_report() {
        let err = DtoError::from(sample());
        assert_eq!(err.validation().map(ValidationError::len), Some(2));
        assert!(err.to_string().starts_with("validation failed: "));
    }
}
