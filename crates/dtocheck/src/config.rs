//! Validator configuration.
//!
//! The defaults reproduce the lenient behaviour most callers expect:
//! unknown hints are ignored, `nestedProps` keeps every listed child and
//! string length is measured in characters.

use serde::{Deserialize, Serialize};

use crate::rule::DEFAULT_DATE_LAYOUT;

/// How unrecognized hint tokens are treated when a schema is described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintPolicy {
    /// Drop the token and log it at debug level.
    #[default]
    Lenient,
    /// Fail schema description with [`SchemaError::UnknownHint`](crate::SchemaError::UnknownHint).
    Strict,
}

/// Which nested members survive a `nestedProps=a|b` whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedPropsPolicy {
    /// Every listed member, in schema order.
    #[default]
    AllListed,
    /// Only the first member matching a listed name.
    FirstMatch,
}

/// How to count string length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthMode {
    /// Count bytes (fastest, ASCII-only correct).
    Bytes,
    /// Count Unicode scalar values (correct for all text).
    #[default]
    Chars,
}

impl LengthMode {
    /// Measures the length of a string according to this mode.
    #[inline]
    #[must_use]
    pub fn measure(self, input: &str) -> usize {
        match self {
            LengthMode::Bytes => input.len(),
            LengthMode::Chars => input.chars().count(),
        }
    }
}

/// Settings shared by schema description and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Separator between path segments in nested field names.
    pub path_delimiter: String,
    /// Layout used by a bare `date` hint.
    pub default_date_layout: String,
    /// Treatment of unrecognized hints.
    pub hint_policy: HintPolicy,
    /// Treatment of `nestedProps` whitelists.
    pub nested_props: NestedPropsPolicy,
    /// String length measurement for `len`/`minlen`/`maxlen`.
    pub length_mode: LengthMode,
    /// Maximum nesting depth of struct and collection members.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            path_delimiter: ".".to_string(),
            default_date_layout: DEFAULT_DATE_LAYOUT.to_string(),
            hint_policy: HintPolicy::Lenient,
            nested_props: NestedPropsPolicy::AllListed,
            length_mode: LengthMode::Chars,
            max_depth: 32,
        }
    }
}

impl ValidatorConfig {
    /// Default settings, but unknown hints fail schema description.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            hint_policy: HintPolicy::Strict,
            ..Self::default()
        }
    }

    /// Sets the hint policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_hint_policy(mut self, policy: HintPolicy) -> Self {
        self.hint_policy = policy;
        self
    }

    /// Sets the `nestedProps` policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_nested_props(mut self, policy: NestedPropsPolicy) -> Self {
        self.nested_props = policy;
        self
    }

    /// Sets the string length mode.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_length_mode(mut self, mode: LengthMode) -> Self {
        self.length_mode = mode;
        self
    }

    /// Sets the path delimiter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.path_delimiter = delimiter.into();
        self
    }

    /// Sets the layout used by a bare `date` hint.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_default_date_layout(mut self, layout: impl Into<String>) -> Self {
        self.default_date_layout = layout.into();
        self
    }

    /// Sets the nesting bound.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// True when the rule-relevant settings match the defaults, so the
    /// shared registry can be used.
    pub(crate) fn uses_default_rules(&self) -> bool {
        self.default_date_layout == DEFAULT_DATE_LAYOUT && self.length_mode == LengthMode::Chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn partial_config_fills_defaults() {
        let config: ValidatorConfig =
            serde_json::from_value(json!({"hint_policy": "strict", "length_mode": "bytes"}))
                .unwrap();
        assert_eq!(config.hint_policy, HintPolicy::Strict);
        assert_eq!(config.length_mode, LengthMode::Bytes);
        assert_eq!(config.path_delimiter, ".");
        assert_eq!(config.max_depth, 32);
        assert!(!config.uses_default_rules());
    }

    #[test]
    fn presets() {
        assert_eq!(ValidatorConfig::strict().hint_policy, HintPolicy::Strict);
        assert!(ValidatorConfig::default().uses_default_rules());
    }

    #[test]
    fn length_modes_differ_on_multibyte_text() {
        assert_eq!(LengthMode::Chars.measure("héllo"), 5);
        assert_eq!(LengthMode::Bytes.measure("héllo"), 6);
    }
}
