//! Hint compilation.
//!
//! A [`RuleRegistry`] is an ordered, immutable list of [`HintCompiler`]s.
//! Length-family compilers are tried before validation-family ones and the
//! first matching pattern wins.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::date::{DEFAULT_DATE_LAYOUT, DateLayout};
use super::predicates::{CollectionLength, Email, LengthBound, MatchesDate, StrLength};
use super::{Rule, RuleKind};
use crate::config::{LengthMode, ValidatorConfig};

static STANDARD: LazyLock<RuleRegistry> = LazyLock::new(|| RuleRegistry::builder().build());

// ============================================================================
// HINT COMPILER
// ============================================================================

/// Groups compilers; lower families are consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HintFamily {
    /// `len`, `minlen`, `maxlen` and their `slice:` counterparts.
    Length,
    /// `email`, `date` and custom checks.
    Validation,
}

type Build = dyn Fn(&str) -> Rule + Send + Sync;

/// One anchored hint pattern plus the constructor for its rule.
///
/// The constructor receives the pattern's first capture group, or `""` when
/// the pattern has none.
#[derive(Clone)]
pub struct HintCompiler {
    family: HintFamily,
    pattern: Regex,
    build: Arc<Build>,
}

impl HintCompiler {
    /// Creates a compiler from a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn new(
        family: HintFamily,
        pattern: &str,
        build: impl Fn(&str) -> Rule + Send + Sync + 'static,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            family,
            pattern: Regex::new(pattern)?,
            build: Arc::new(build),
        })
    }

    fn builtin(
        family: HintFamily,
        pattern: &'static str,
        build: impl Fn(&str) -> Rule + Send + Sync + 'static,
    ) -> Self {
        Self {
            family,
            pattern: Regex::new(pattern).unwrap(),
            build: Arc::new(build),
        }
    }

    /// The compiler's family.
    #[must_use]
    pub fn family(&self) -> HintFamily {
        self.family
    }

    /// The pattern source.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Builds the rule for `hint`, or `None` if the pattern does not match.
    #[must_use]
    pub fn compile(&self, hint: &str) -> Option<Rule> {
        let captures = self.pattern.captures(hint)?;
        let argument = captures.get(1).map_or("", |m| m.as_str());
        Some((self.build)(argument))
    }
}

impl fmt::Debug for HintCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintCompiler")
            .field("family", &self.family)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Ordered table of hint compilers.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    compilers: Vec<HintCompiler>,
}

impl RuleRegistry {
    /// The process-wide registry for the default configuration.
    #[must_use]
    pub fn standard() -> &'static RuleRegistry {
        &STANDARD
    }

    /// Starts a registry with the built-in compilers.
    #[must_use]
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// Builds a registry honouring the rule-related settings of `config`.
    #[must_use]
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::builder()
            .length_mode(config.length_mode)
            .default_date_layout(config.default_date_layout.clone())
            .build()
    }

    /// Compiles one hint token. Unmatched tokens yield `None`.
    #[must_use]
    pub fn compile(&self, hint: &str) -> Option<Rule> {
        self.compilers.iter().find_map(|c| c.compile(hint))
    }

    /// The compilers in the order they are tried.
    #[must_use]
    pub fn compilers(&self) -> &[HintCompiler] {
        &self.compilers
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        RuleRegistry::standard().clone()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`RuleRegistry`].
#[derive(Debug, Clone)]
#[must_use = "builder methods must be chained or built"]
pub struct RuleRegistryBuilder {
    length_mode: LengthMode,
    default_date_layout: String,
    extra: Vec<HintCompiler>,
}

impl Default for RuleRegistryBuilder {
    fn default() -> Self {
        Self {
            length_mode: LengthMode::default(),
            default_date_layout: DEFAULT_DATE_LAYOUT.to_string(),
            extra: Vec::new(),
        }
    }
}

impl RuleRegistryBuilder {
    /// How `len`/`minlen`/`maxlen` count characters.
    pub fn length_mode(mut self, mode: LengthMode) -> Self {
        self.length_mode = mode;
        self
    }

    /// Layout for a bare `date` hint.
    pub fn default_date_layout(mut self, layout: impl Into<String>) -> Self {
        self.default_date_layout = layout.into();
        self
    }

    /// Appends a compiler after the built-ins of its family.
    pub fn compiler(mut self, compiler: HintCompiler) -> Self {
        self.extra.push(compiler);
        self
    }

    /// Finalizes the table.
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        let mode = self.length_mode;
        let mut compilers = vec![
            string_length(r"^len=(\d+)$", RuleKind::Length, LengthBound::Exact, mode),
            string_length(r"^minlen=(\d+)$", RuleKind::MinLength, LengthBound::Min, mode),
            string_length(r"^maxlen=(\d+)$", RuleKind::MaxLength, LengthBound::Max, mode),
            element_count(
                r"^slice:len=(\d+)$",
                RuleKind::CollectionLength,
                LengthBound::Exact,
            ),
            element_count(
                r"^slice:minlen=(\d+)$",
                RuleKind::CollectionMinLength,
                LengthBound::Min,
            ),
            element_count(
                r"^slice:maxlen=(\d+)$",
                RuleKind::CollectionMaxLength,
                LengthBound::Max,
            ),
        ];

        let email = Rule::new(RuleKind::Email, "value must be a mail address", "", Email);
        compilers.push(HintCompiler::builtin(
            HintFamily::Validation,
            r"^email$",
            move |_| email.clone(),
        ));

        let default_date = date_rule(self.default_date_layout);
        compilers.push(HintCompiler::builtin(
            HintFamily::Validation,
            r"^date=?([0-9/-]{0,10})$",
            move |layout| {
                if layout.is_empty() {
                    default_date.clone()
                } else {
                    date_rule(layout.to_string())
                }
            },
        ));

        compilers.extend(self.extra);
        compilers.sort_by_key(HintCompiler::family);
        RuleRegistry { compilers }
    }
}

fn parse_bound(argument: &str) -> usize {
    argument.parse().unwrap_or(0)
}

fn comparison(bound: LengthBound) -> &'static str {
    match bound {
        LengthBound::Exact(_) => "==",
        LengthBound::Min(_) => ">=",
        LengthBound::Max(_) => "<=",
    }
}

fn string_length(
    pattern: &'static str,
    kind: RuleKind,
    bound: fn(usize) -> LengthBound,
    mode: LengthMode,
) -> HintCompiler {
    HintCompiler::builtin(HintFamily::Length, pattern, move |argument| {
        let n = parse_bound(argument);
        Rule::new(
            kind,
            format!("string length {} {n}", comparison(bound(n))),
            n.to_string(),
            StrLength::new(bound(n), mode),
        )
    })
}

fn element_count(
    pattern: &'static str,
    kind: RuleKind,
    bound: fn(usize) -> LengthBound,
) -> HintCompiler {
    HintCompiler::builtin(HintFamily::Length, pattern, move |argument| {
        let n = parse_bound(argument);
        Rule::new(
            kind,
            format!("element count {} {n}", comparison(bound(n))),
            n.to_string(),
            CollectionLength::new(bound(n)),
        )
    })
}

fn date_rule(layout: String) -> Rule {
    let compiled = DateLayout::new(layout.clone());
    Rule::new(
        RuleKind::Date,
        format!("value must be a date formatted as {layout}"),
        layout,
        MatchesDate::new(compiled),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("len=5", RuleKind::Length, "5")]
    #[case("minlen=3", RuleKind::MinLength, "3")]
    #[case("maxlen=10", RuleKind::MaxLength, "10")]
    #[case("slice:len=2", RuleKind::CollectionLength, "2")]
    #[case("slice:minlen=1", RuleKind::CollectionMinLength, "1")]
    #[case("slice:maxlen=4", RuleKind::CollectionMaxLength, "4")]
    #[case("email", RuleKind::Email, "")]
    #[case("date", RuleKind::Date, "2006-01-02")]
    #[case("date=02/01/2006", RuleKind::Date, "02/01/2006")]
    fn compiles_vocabulary(#[case] hint: &str, #[case] kind: RuleKind, #[case] argument: &str) {
        let rule = RuleRegistry::standard().compile(hint).unwrap();
        assert_eq!(rule.kind(), kind);
        assert_eq!(rule.argument(), argument);
    }

    #[rstest]
    #[case("required")]
    #[case("ifExists")]
    #[case("type")]
    #[case("nestedProps=a|b")]
    #[case("len=")]
    #[case("len=-1")]
    #[case(" email")]
    #[case("EMAIL")]
    #[case("date=2006-01-02T15:04")]
    #[case("")]
    fn leaves_other_tokens_alone(#[case] hint: &str) {
        assert!(RuleRegistry::standard().compile(hint).is_none(), "{hint}");
    }

    #[test]
    fn length_family_comes_first() {
        let families: Vec<_> = RuleRegistry::standard()
            .compilers()
            .iter()
            .map(HintCompiler::family)
            .collect();
        let first_validation = families
            .iter()
            .position(|f| *f == HintFamily::Validation)
            .unwrap();
        assert!(
            families[first_validation..]
                .iter()
                .all(|f| *f == HintFamily::Validation)
        );
    }

    #[test]
    fn compiled_rules_check_values() {
        let registry = RuleRegistry::standard();
        let len = registry.compile("len=5").unwrap();
        assert!(len.is_valid(&json!("abcde")));
        assert!(!len.is_valid(&json!("abcd")));
        assert!(!len.is_slice_rule());

        let count = registry.compile("slice:minlen=2").unwrap();
        assert!(count.is_slice_rule());
        assert!(!count.is_valid(&json!([])));
    }

    #[test]
    fn config_changes_defaults() {
        let config = ValidatorConfig::default()
            .with_length_mode(LengthMode::Bytes)
            .with_default_date_layout("02/01/2006");
        let registry = RuleRegistry::from_config(&config);

        let date = registry.compile("date").unwrap();
        assert_eq!(date.argument(), "02/01/2006");
        assert!(date.is_valid(&json!("31/12/2020")));

        let len = registry.compile("maxlen=4").unwrap();
        assert!(!len.is_valid(&json!("héllo")));
    }

    #[test]
    fn custom_compilers_join_their_family() {
        let upper = HintCompiler::new(HintFamily::Validation, r"^upper$", |_| {
            Rule::new(RuleKind::Email, "uppercase", "", |v: &serde_json::Value| {
                v.as_str().is_some_and(|s| s.chars().all(char::is_uppercase))
            })
        })
        .unwrap();
        let registry = RuleRegistry::builder().compiler(upper).build();

        assert_eq!(registry.compilers().last().unwrap().pattern(), "^upper$");
        let rule = registry.compile("upper").unwrap();
        assert!(rule.is_valid(&json!("ABC")));
        assert!(!rule.is_valid(&json!("abc")));
    }

    #[test]
    fn bad_custom_pattern_is_reported() {
        assert!(HintCompiler::new(HintFamily::Length, r"^len=(\d+$", |_| unreachable!()).is_err());
    }
}
