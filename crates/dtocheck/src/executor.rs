//! Validation passes.
//!
//! A [`Validator`] flattens a schema into [`Field`]s once; each call binds
//! every field to the input, runs its rules and collects the failures in
//! field order.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::describe::Schema;
use crate::error::{DtoError, FieldError, SchemaError, ValidationError};
use crate::extract::{Binding, resolve};
use crate::field::{Field, describe_members};
use crate::rule::{RuleKind, RuleRegistry};

// ============================================================================
// VALIDATOR
// ============================================================================

/// A compiled schema, reusable across calls and threads.
pub struct Validator<T> {
    fields: Vec<Field>,
    config: ValidatorConfig,
    _schema: PhantomData<fn() -> T>,
}

impl<T: Schema> Validator<T> {
    /// Compiles `T` with the default configuration.
    pub fn new() -> Result<Self, SchemaError> {
        Self::with_config(ValidatorConfig::default())
    }

    /// Compiles `T` with `config`.
    pub fn with_config(config: ValidatorConfig) -> Result<Self, SchemaError> {
        let registry = if config.uses_default_rules() {
            Cow::Borrowed(RuleRegistry::standard())
        } else {
            Cow::Owned(RuleRegistry::from_config(&config))
        };
        Self::with_registry(config, &registry)
    }

    /// Compiles `T` with `config`, taking hint compilers from `registry`.
    pub fn with_registry(
        config: ValidatorConfig,
        registry: &RuleRegistry,
    ) -> Result<Self, SchemaError> {
        let fields = describe_members(T::members(), registry, &config, 0)?;
        tracing::debug!(
            schema = T::schema_name(),
            fields = fields.len(),
            "compiled schema"
        );
        Ok(Self {
            fields,
            config,
            _schema: PhantomData,
        })
    }

    /// The flattened fields, in evaluation order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Checks `input`, reporting every violation.
    pub fn validate(&self, input: &Value) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        for field in self.fields.iter().filter(|field| !field.is_struct()) {
            for binding in resolve(field.path(), input, &self.config.path_delimiter) {
                check(field, &binding, &mut errors);
            }
        }

        tracing::debug!(
            schema = T::schema_name(),
            errors = errors.len(),
            "validation pass finished"
        );
        match ValidationError::from_field_errors(errors) {
            Some(report) => Err(report),
            None => Ok(()),
        }
    }
}

impl<T: Schema + DeserializeOwned> Validator<T> {
    /// Validates `input`, then decodes it into `T`.
    pub fn validate_dto(&self, input: &Value) -> Result<T, DtoError> {
        self.validate(input)?;
        T::deserialize(input).map_err(DtoError::Decode)
    }

    /// Decodes `input` into `T` whatever the outcome, reporting violations
    /// separately.
    pub fn validate_dto_partially(&self, input: &Value) -> Partial<T> {
        Partial {
            instance: T::deserialize(input),
            report: self.validate(input).err(),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.fields.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            config: self.config.clone(),
            _schema: PhantomData,
        }
    }
}

/// Result of a partial validation: the decoded instance and the report are
/// independent of each other.
#[derive(Debug)]
pub struct Partial<T> {
    /// The input decoded into the schema type.
    pub instance: Result<T, serde_json::Error>,
    /// Violations, if any.
    pub report: Option<ValidationError>,
}

impl<T> Partial<T> {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.report.is_none()
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

fn check(field: &Field, binding: &Binding<'_>, errors: &mut Vec<FieldError>) {
    let Binding { name, value } = binding;

    if field.validate_if_exists() && value.is_null() {
        tracing::trace!(field = %name, "skipping absent optional field");
        return;
    }
    if field.is_conditional()
        && field.is_slice()
        && value.as_array().is_some_and(Vec::is_empty)
    {
        tracing::trace!(field = %name, "skipping empty optional collection");
        return;
    }

    if field.is_slice() && !value.is_array() && !value.is_null() && field.checks_type() {
        report(errors, FieldError::new(RuleKind::Type, name.as_str(), field.type_name()));
        return;
    }

    for rule in field.rules() {
        if field.is_slice() && !rule.is_slice_rule() {
            match value.as_array() {
                Some(items) if !items.is_empty() => {
                    for (index, item) in items.iter().enumerate() {
                        if !rule.is_valid(item) {
                            report(errors, rule.generate_error(format!("{name}[{index}]")));
                        }
                    }
                    continue;
                }
                None if !value.is_null() => {}
                _ => {
                    if rule.kind() == RuleKind::Required {
                        report(errors, rule.generate_error(name.as_str()));
                    }
                    continue;
                }
            }
        }

        if !rule.is_valid(value) {
            report(errors, rule.generate_error(name.as_str()));
            break;
        }
    }
}

fn report(errors: &mut Vec<FieldError>, error: FieldError) {
    tracing::trace!(field = error.name(), rule = error.rule_type(), "rule failed");
    errors.push(error);
}

// ============================================================================
// ONE-SHOT ENTRY POINTS
// ============================================================================

fn encode(data: impl Serialize) -> Result<Value, DtoError> {
    serde_json::to_value(data).map_err(DtoError::Encode)
}

/// Validates `data` against `T`, describing the schema for this call only.
pub fn validate<T: Schema>(data: impl Serialize) -> Result<(), DtoError> {
    let input = encode(data)?;
    Validator::<T>::new()?.validate(&input)?;
    Ok(())
}

/// Validates `data` against `T` and decodes it on success.
pub fn validate_dto<T>(data: impl Serialize) -> Result<T, DtoError>
where
    T: Schema + DeserializeOwned,
{
    let input = encode(data)?;
    Validator::<T>::new()?.validate_dto(&input)
}

/// Decodes `data` into `T` and validates it, independently.
pub fn validate_dto_partially<T>(data: impl Serialize) -> Result<Partial<T>, DtoError>
where
    T: Schema + DeserializeOwned,
{
    let input = encode(data)?;
    Ok(Validator::<T>::new()?.validate_dto_partially(&input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    crate::schema! {
        #[derive(Debug, PartialEq)]
        struct Account {
            #[field("name", validate = "required,minlen=2")]
            name: String,
            #[field("tags", validate = "minlen=3,slice:maxlen=3")]
            #[serde(default)]
            tags: Vec<String>,
            #[field("scores", validate = "type")]
            #[serde(default)]
            scores: Vec<u8>,
        }
    }

    fn validator() -> Validator<Account> {
        Validator::new().unwrap()
    }

    fn failures(input: Value) -> Vec<(String, &'static str)> {
        match validator().validate(&input) {
            Ok(()) => Vec::new(),
            Err(report) => report
                .iter()
                .map(|e| (e.name().to_string(), e.rule_type()))
                .collect(),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert_eq!(failures(json!({"name": "ok", "tags": ["abc"], "scores": [1]})), vec![]);
    }

    #[test]
    fn first_failure_wins_per_field() {
        assert_eq!(failures(json!({"name": 5})), vec![("name".to_string(), "type")]);
    }

    #[test]
    fn every_failing_element_is_reported() {
        assert_eq!(
            failures(json!({"name": "ok", "tags": ["ab", "abcd", "x"]})),
            vec![
                ("tags[0]".to_string(), "minlength"),
                ("tags[2]".to_string(), "minlength")
            ]
        );
    }

    #[test]
    fn count_rules_apply_to_whole_collection() {
        assert_eq!(
            failures(json!({"name": "ok", "tags": ["abc", "abc", "abc", "abc"]})),
            vec![("tags".to_string(), "slice:maxlen")]
        );
    }

    #[test]
    fn non_array_for_typed_collection() {
        let report = validator()
            .validate(&json!({"name": "ok", "scores": "high"}))
            .unwrap_err();
        assert_eq!(
            report.messages(),
            vec!["'scores' field type must be '[]u8'"]
        );
    }

    #[test]
    fn element_types_are_checked() {
        assert_eq!(
            failures(json!({"name": "ok", "scores": [1, 300, -1, 2.5]})),
            vec![
                ("scores[1]".to_string(), "type"),
                ("scores[2]".to_string(), "type"),
                ("scores[3]".to_string(), "type")
            ]
        );
    }

    #[test]
    fn dto_decodes_only_when_valid() {
        let v = validator();
        let account = v.validate_dto(&json!({"name": "Ann"})).unwrap();
        assert_eq!(account.name, "Ann");

        let err = v.validate_dto(&json!({"name": ""})).unwrap_err();
        assert_eq!(err.validation().map(ValidationError::rule_types), Some(vec!["required"]));
    }

    #[test]
    fn partial_always_decodes() {
        let partial = validator().validate_dto_partially(&json!({"name": "A"}));
        assert!(!partial.is_valid());
        assert_eq!(partial.instance.unwrap().name, "A");
    }

    #[test]
    fn one_shot_functions_encode_input() {
        #[derive(serde::Serialize)]
        struct Raw<'a> {
            name: &'a str,
        }

        let account: Account = validate_dto(Raw { name: "Zed" }).unwrap();
        assert_eq!(account.tags, Vec::<String>::new());
        assert!(matches!(
            validate::<Account>(Raw { name: "Z" }),
            Err(DtoError::Invalid(_))
        ));
        let partial = validate_dto_partially::<Account>(json!({"name": 1})).unwrap();
        assert!(partial.instance.is_err());
        assert_eq!(partial.report.map(|r| r.len()), Some(1));
    }

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Validator<Account>>();
    }
}
