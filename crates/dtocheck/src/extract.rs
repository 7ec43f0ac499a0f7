//! Binding field paths to values in an untyped tree.

use serde_json::Value;

use crate::field::Segment;

static NULL: Value = Value::Null;

/// One concrete occurrence of a field in the input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Binding<'v> {
    pub(crate) name: String,
    pub(crate) value: &'v Value,
}

/// Resolves a path against `root`.
///
/// A single-segment path is looked up in the root object, or binds the whole
/// root when the root is an array. Longer paths walk objects key by key and
/// bind `null` once a key is missing or a branch is not an object.
///
/// A segment whose parent member is a collection fans out: every element
/// continues the walk under an indexed name such as `items[1].sku`, and a
/// value that is not an array yields no occurrences.
pub(crate) fn resolve<'v>(path: &[Segment], root: &'v Value, delimiter: &str) -> Vec<Binding<'v>> {
    let [first, rest @ ..] = path else {
        return Vec::new();
    };

    if rest.is_empty() {
        let value = if root.is_array() {
            root
        } else {
            root.get(&first.key).unwrap_or(&NULL)
        };
        return vec![Binding {
            name: first.key.clone(),
            value,
        }];
    }

    let mut current = vec![Binding {
        name: String::new(),
        value: root,
    }];

    for (i, segment) in path.iter().enumerate() {
        current = current
            .into_iter()
            .map(|binding| {
                let name = if binding.name.is_empty() {
                    segment.key.clone()
                } else {
                    format!("{}{delimiter}{}", binding.name, segment.key)
                };
                let value = match binding.value {
                    Value::Object(map) => map.get(&segment.key).unwrap_or(&NULL),
                    _ => &NULL,
                };
                Binding { name, value }
            })
            .collect();

        if i + 1 < path.len() {
            for _ in 0..segment.layers {
                current = current.into_iter().flat_map(fan_out).collect();
            }
        }
    }

    current
}

fn fan_out(binding: Binding<'_>) -> Vec<Binding<'_>> {
    match binding.value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| Binding {
                name: format!("{}[{index}]", binding.name),
                value,
            })
            .collect(),
        _ => Vec::new(),
    }
}
