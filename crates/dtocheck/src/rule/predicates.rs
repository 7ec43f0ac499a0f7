//! The built-in predicates behind each rule kind.
//!
//! All of them take a single JSON value. Apart from [`TypeOf`], a `null`
//! value fails every predicate here.

use std::sync::LazyLock;

use serde_json::Value;

use super::date::DateLayout;
use crate::config::LengthMode;
use crate::describe::ScalarType;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap()
});

/// Display name before `<addr>`: atoms (dots allowed) or quoted strings.
static DISPLAY_NAME_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r##"^(?:[a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]+|"(?:[^"\\]|\\.)*")(?:[ \t]+(?:[a-zA-Z0-9!#$%&'*+/=?^_`{|}~.-]+|"(?:[^"\\]|\\.)*"))*$"##
    ).unwrap()
});

// ============================================================================
// EXISTS
// ============================================================================

crate::predicate! {
    /// Presence check behind `required`.
    ///
    /// Objects always pass; arrays and strings must be non-empty.
    pub Exists;
    test(value) {
        match value {
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            Value::String(text) => !text.is_empty(),
            _ => true,
        }
    }
}

// ============================================================================
// TYPE OF
// ============================================================================

crate::predicate! {
    /// Convertibility to a declared type. `None` expects a JSON object.
    ///
    /// A `null` value always passes; presence is checked by [`Exists`].
    #[derive(Copy, PartialEq, Eq)]
    pub TypeOf { expected: Option<ScalarType> };
    test(self, value) {
        match (value, self.expected) {
            (Value::Null, _) => true,
            (_, Some(scalar)) => scalar.accepts(value),
            (_, None) => value.is_object(),
        }
    }
    new(expected: Option<ScalarType>) { Self { expected } }
}

// ============================================================================
// LENGTH BOUNDS
// ============================================================================

/// A comparison against a length or element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthBound {
    /// `== n`
    Exact(usize),
    /// `>= n`
    Min(usize),
    /// `<= n`
    Max(usize),
}

impl LengthBound {
    /// True when `len` satisfies the bound.
    #[inline]
    #[must_use]
    pub fn admits(self, len: usize) -> bool {
        match self {
            LengthBound::Exact(n) => len == n,
            LengthBound::Min(n) => len >= n,
            LengthBound::Max(n) => len <= n,
        }
    }

    /// The bound's operand.
    #[must_use]
    pub fn value(self) -> usize {
        match self {
            LengthBound::Exact(n) | LengthBound::Min(n) | LengthBound::Max(n) => n,
        }
    }
}

crate::predicate! {
    /// String length. Non-strings fail.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub StrLength { bound: LengthBound, mode: LengthMode };
    test(self, value) {
        value
            .as_str()
            .is_some_and(|text| self.bound.admits(self.mode.measure(text)))
    }
    new(bound: LengthBound, mode: LengthMode) { Self { bound, mode } }
}

crate::predicate! {
    /// Array element count. Non-arrays fail.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub CollectionLength { bound: LengthBound };
    test(self, value) {
        value
            .as_array()
            .is_some_and(|items| self.bound.admits(items.len()))
    }
    new(bound: LengthBound) { Self { bound } }
}

// ============================================================================
// EMAIL
// ============================================================================

crate::predicate! {
    /// A single mail address, bare or as `Display Name <addr>`.
    pub Email;
    test(value) { value.as_str().is_some_and(is_email) }
}

fn is_email(input: &str) -> bool {
    let input = input.trim();
    match (input.rfind('<'), input.strip_suffix('>')) {
        (Some(open), Some(inner)) => {
            let name = inner[..open].trim();
            (name.is_empty() || DISPLAY_NAME_REGEX.is_match(name))
                && EMAIL_REGEX.is_match(&inner[open + 1..])
        }
        _ => EMAIL_REGEX.is_match(input),
    }
}

// ============================================================================
// DATE
// ============================================================================

crate::predicate! {
    /// A string parsing under a reference-date layout.
    #[derive(PartialEq, Eq)]
    pub MatchesDate { layout: DateLayout };
    test(self, value) { value.as_str().is_some_and(|text| self.layout.matches(text)) }
    new(layout: DateLayout) { Self { layout } }
}

// ============================================================================
// TESTS
// ============================================================================
