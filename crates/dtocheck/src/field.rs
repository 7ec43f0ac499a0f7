//! Flattened field descriptors.
//!
//! Each schema member becomes one [`Field`]; struct and collection members
//! additionally contribute one field per nested member, named by joining the
//! lower-cased parent name and the child name with the path delimiter.

use crate::config::{HintPolicy, NestedPropsPolicy, ValidatorConfig};
use crate::describe::{FieldKind, Member, ScalarType};
use crate::error::SchemaError;
use crate::rule::{Exists, Rule, RuleKind, RuleRegistry, TypeOf};

const REQUIRED: &str = "required";
const TYPE: &str = "type";
const IF_EXISTS: &str = "ifExists";
const OMIT_EMPTY: &str = "omitempty";
const NESTED_PROPS: &str = "nestedProps=";

// ============================================================================
// PATH
// ============================================================================

/// One step of a field's path into the input tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) key: String,
    /// Collection layers between this key's value and the next key.
    pub(crate) layers: usize,
}

// ============================================================================
// FIELD
// ============================================================================

/// The engine's descriptor for one (possibly nested) schema member.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    path: Vec<Segment>,
    kind: FieldKind,
    hints: Vec<String>,
    required: bool,
    validate_if_exists: bool,
    conditional: bool,
    must_validate_type: bool,
    omit_empty: bool,
    hide_parent_name: bool,
    nested_props: Option<Vec<String>>,
    rules: Vec<Rule>,
}

impl Field {
    /// Describes one member and compiles its rules.
    ///
    /// # Errors
    ///
    /// Fails under [`HintPolicy::Strict`] when a hint matches no compiler.
    pub fn from_member(
        member: &Member,
        registry: &RuleRegistry,
        config: &ValidatorConfig,
    ) -> Result<Self, SchemaError> {
        let hints: Vec<String> = member
            .annotation()
            .split(',')
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .map(str::to_string)
            .collect();
        let has = |token: &str| hints.iter().any(|hint| hint == token);

        let omit_empty = member.is_omit_empty() || has(OMIT_EMPTY);
        let required = has(REQUIRED) && !omit_empty;
        let conditional = has(IF_EXISTS);
        let nested_props = hints
            .iter()
            .find_map(|hint| hint.strip_prefix(NESTED_PROPS))
            .map(|list| {
                list.split('|')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            });

        let mut field = Self {
            name: member.name().to_string(),
            path: vec![Segment {
                key: member.name().to_string(),
                layers: 0,
            }],
            kind: member.kind().clone(),
            required,
            validate_if_exists: conditional || !required,
            conditional,
            must_validate_type: has(TYPE),
            omit_empty,
            hide_parent_name: member.hides_parent_name(),
            nested_props,
            rules: Vec::new(),
            hints,
        };
        field.rules = field.generate_rules(registry, config)?;
        Ok(field)
    }

    fn generate_rules(
        &self,
        registry: &RuleRegistry,
        config: &ValidatorConfig,
    ) -> Result<Vec<Rule>, SchemaError> {
        let mut rules = Vec::new();

        if self.required {
            rules.push(Rule::new(
                RuleKind::Required,
                "value must be present and non-empty",
                self.kind.type_name(),
                Exists,
            ));
        }

        if self.required || self.must_validate_type {
            let element = match &self.kind {
                FieldKind::Slice(element) => element.as_ref(),
                kind => kind,
            };
            rules.extend(type_rule(element));
        }

        for hint in &self.hints {
            if is_structural(hint) {
                continue;
            }
            match registry.compile(hint) {
                Some(rule) => rules.push(rule),
                None => match config.hint_policy {
                    HintPolicy::Lenient => {
                        tracing::debug!(field = %self.name, hint = %hint, "dropping unrecognized hint");
                    }
                    HintPolicy::Strict => {
                        return Err(SchemaError::UnknownHint {
                            field: self.name.clone(),
                            hint: hint.clone(),
                        });
                    }
                },
            }
        }

        Ok(rules)
    }

    /// Describes the members nested under this one.
    ///
    /// Struct members of nested schemas are included, each followed by its
    /// own nested members. Description stops at `max_depth` levels, so a
    /// recursive schema is checked down to that depth only.
    pub fn generate_nested_fields(
        &self,
        registry: &RuleRegistry,
        config: &ValidatorConfig,
    ) -> Result<Vec<Field>, SchemaError> {
        self.nested_fields(registry, config, 1)
    }

    fn nested_fields(
        &self,
        registry: &RuleRegistry,
        config: &ValidatorConfig,
        depth: usize,
    ) -> Result<Vec<Field>, SchemaError> {
        let Some(shape) = self.kind.nested_shape() else {
            return Ok(Vec::new());
        };
        if depth > config.max_depth {
            tracing::debug!(
                field = %self.name,
                max_depth = config.max_depth,
                "nesting bound reached, members below are not described"
            );
            return Ok(Vec::new());
        }

        let mut children = describe_members(shape.members(), registry, config, depth)?;

        if let Some(listed) = &self.nested_props {
            children = filter_listed(children, listed, config);
        }

        if self.conditional {
            for child in children.iter_mut().filter(|child| !child.conditional) {
                child.validate_if_exists = true;
                child.conditional = true;
            }
        }

        if !self.hide_parent_name {
            let parent = Segment {
                key: self.name.to_lowercase(),
                layers: self.kind.collection_layers(),
            };
            for child in &mut children {
                child.prefix(&parent, &config.path_delimiter);
            }
        }

        Ok(children)
    }

    fn prefix(&mut self, parent: &Segment, delimiter: &str) {
        self.name = format!("{}{delimiter}{}", parent.key, self.name);
        self.path.insert(0, parent.clone());
    }

    /// External name, a delimited path for nested members.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn path(&self) -> &[Segment] {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The type name shown in messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.kind.type_name().into_owned()
    }

    /// Every token of the annotation, structural ones included.
    #[must_use]
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// True when an absent value skips evaluation.
    #[must_use]
    pub fn validate_if_exists(&self) -> bool {
        self.validate_if_exists
    }

    /// True when `ifExists` was declared here or inherited from a parent.
    /// Such collection fields also skip evaluation when empty.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.conditional
    }

    #[must_use]
    pub fn must_validate_type(&self) -> bool {
        self.must_validate_type
    }

    #[must_use]
    pub fn is_omit_empty(&self) -> bool {
        self.omit_empty
    }

    #[must_use]
    pub fn hides_parent_name(&self) -> bool {
        self.hide_parent_name
    }

    #[must_use]
    pub fn is_struct(&self) -> bool {
        self.kind.is_struct()
    }

    #[must_use]
    pub fn is_slice(&self) -> bool {
        self.kind.is_slice()
    }

    /// The compiled rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// True when this field checks value types.
    pub(crate) fn checks_type(&self) -> bool {
        self.required || self.must_validate_type
    }
}

fn is_structural(hint: &str) -> bool {
    matches!(hint, REQUIRED | TYPE | IF_EXISTS | OMIT_EMPTY) || hint.starts_with(NESTED_PROPS)
}

fn type_rule(kind: &FieldKind) -> Option<Rule> {
    let (expected, argument) = match kind {
        FieldKind::Scalar(ScalarType::Any) | FieldKind::Slice(_) => return None,
        FieldKind::Scalar(scalar) => (Some(*scalar), scalar.name()),
        FieldKind::Struct(_) => (None, "struct"),
    };
    Some(Rule::new(
        RuleKind::Type,
        "value must convert to the declared type",
        argument,
        TypeOf::new(expected),
    ))
}

fn filter_listed(children: Vec<Field>, listed: &[String], config: &ValidatorConfig) -> Vec<Field> {
    match config.nested_props {
        NestedPropsPolicy::AllListed => children
            .into_iter()
            .filter(|child| {
                listed.iter().any(|name| {
                    child.name == *name
                        || child
                            .name
                            .strip_prefix(name.as_str())
                            .is_some_and(|rest| rest.starts_with(config.path_delimiter.as_str()))
                })
            })
            .collect(),
        NestedPropsPolicy::FirstMatch => children
            .into_iter()
            .find(|child| listed.contains(&child.name))
            .into_iter()
            .collect(),
    }
}

// ============================================================================
// SCHEMA FLATTENING
// ============================================================================

/// Flattens a member list into fields, nested members following their parent.
pub(crate) fn describe_members(
    members: Vec<Member>,
    registry: &RuleRegistry,
    config: &ValidatorConfig,
    depth: usize,
) -> Result<Vec<Field>, SchemaError> {
    let mut fields = Vec::with_capacity(members.len());
    for member in &members {
        let field = Field::from_member(member, registry, config)?;
        let nested = field.nested_fields(registry, config, depth + 1)?;
        fields.push(field);
        fields.extend(nested);
    }
    Ok(fields)
}
