//! Integration tests for the prelude and the extension points.
//!
//! Verifies that `use dtocheck::prelude::*` covers the common path and that
//! custom hint compilers plug into a validator.

use dtocheck::prelude::*;
use dtocheck::rule::{HintCompiler, HintFamily, Rule, RuleKind, RuleRegistry};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

schema! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Contact {
        #[field("email", validate = "required,email")]
        pub email: String,
        #[field("phone", validate = "required,digits,len=10", omitempty)]
        #[serde(default)]
        pub phone: Option<String>,
    }
}

// ============================================================================
// PRELUDE IMPORT SMOKE TEST
// ============================================================================

#[test]
fn prelude_covers_the_common_path() {
    let contact: Contact = validate_dto(json!({"email": "a@b.com"})).unwrap();
    assert_eq!(contact.phone, None);

    let err = validate_dto::<Contact>(json!({"email": "nope"})).unwrap_err();
    let report: &ValidationError = err.validation().unwrap();
    assert_eq!(
        report.to_string(),
        "the value provided for the 'email' field isn't a valid email"
    );
}

#[test]
fn omitempty_tag_makes_member_optional() {
    let validator = Validator::<Contact>::new().unwrap();
    let phone = &validator.fields()[1];
    assert_eq!(phone.name(), "phone");
    assert!(phone.is_omit_empty());
    assert!(!phone.is_required());

    assert!(validator.validate(&json!({"email": "a@b.com"})).is_ok());
    assert_eq!(
        validator
            .validate(&json!({"email": "a@b.com", "phone": "123"}))
            .unwrap_err()
            .rule_types(),
        vec!["length"]
    );
}

#[test]
fn report_serializes_as_list() {
    let report = Validator::<Contact>::new()
        .unwrap()
        .validate(&json!({}))
        .unwrap_err();
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!([{
            "name": "email",
            "message": "'email' field of type 'string' is missing or empty",
            "rule_type": "required",
            "argument": "string",
        }])
    );
}

// ============================================================================
// CUSTOM HINT COMPILERS
// ============================================================================

fn digits_registry() -> RuleRegistry {
    let digits = HintCompiler::new(HintFamily::Validation, r"^digits$", |_| {
        Rule::new(RuleKind::Type, "value must be all digits", "digits", |value: &Value| {
            value
                .as_str()
                .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        })
    })
    .unwrap();
    RuleRegistry::builder().compiler(digits).build()
}

#[test]
fn custom_compilers_extend_the_vocabulary() {
    let validator =
        Validator::<Contact>::with_registry(ValidatorConfig::strict(), &digits_registry()).unwrap();

    let report = validator
        .validate(&json!({"email": "a@b.com", "phone": "12345abcde"}))
        .unwrap_err();
    assert_eq!(report.messages(), vec!["'phone' field type must be 'digits'"]);

    assert!(
        validator
            .validate(&json!({"email": "a@b.com", "phone": "0123456789"}))
            .is_ok()
    );
}

#[test]
fn strict_mode_without_the_compiler_fails() {
    assert!(Validator::<Contact>::with_config(ValidatorConfig::strict()).is_err());
    assert!(Validator::<Contact>::new().is_ok());
}

#[test]
fn validators_share_across_threads() {
    let validator = std::sync::Arc::new(Validator::<Contact>::new().unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let validator = std::sync::Arc::clone(&validator);
            std::thread::spawn(move || {
                validator
                    .validate(&json!({"email": format!("user{i}@example.com")}))
                    .is_ok()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
