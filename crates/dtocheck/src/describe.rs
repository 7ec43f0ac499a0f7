//! Static schema description.
//!
//! A schema type lists its members through [`Schema`]; every member type
//! reports its classification through [`Describe`]. Both are normally
//! generated by [`schema!`](crate::schema!).

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

// ============================================================================
// TRAITS
// ============================================================================

/// Maps a Rust type to its validation classification.
pub trait Describe {
    /// The classification of `Self`.
    fn kind() -> FieldKind;
}

/// A declared composite type that input can be validated against.
pub trait Schema {
    /// The members, in declaration order.
    fn members() -> Vec<Member>;

    /// The type's name, used when it appears as a collection element.
    fn schema_name() -> &'static str;
}

// ============================================================================
// FIELD KIND
// ============================================================================

/// Primitive member types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// A string holding a UUID.
    Uuid,
    /// Any JSON value.
    Any,
}

impl ScalarType {
    /// The name shown in `required` and `type` messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::String => "string",
            ScalarType::Uuid => "string UUID",
            ScalarType::Any => "any",
        }
    }

    /// True when `value` converts cleanly to this type.
    ///
    /// Integers accept integral numbers inside their width, including
    /// floats with no fractional part.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ScalarType::Bool => value.is_boolean(),
            ScalarType::I8 => integral(value, i8::MIN.into(), i8::MAX.into()),
            ScalarType::I16 => integral(value, i16::MIN.into(), i16::MAX.into()),
            ScalarType::I32 => integral(value, i32::MIN.into(), i32::MAX.into()),
            ScalarType::I64 => integral(value, i64::MIN.into(), i64::MAX.into()),
            ScalarType::U8 => integral(value, 0, u8::MAX.into()),
            ScalarType::U16 => integral(value, 0, u16::MAX.into()),
            ScalarType::U32 => integral(value, 0, u32::MAX.into()),
            ScalarType::U64 => integral(value, 0, u64::MAX.into()),
            ScalarType::F32 | ScalarType::F64 => value.is_number(),
            ScalarType::String => value.is_string(),
            ScalarType::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
            ScalarType::Any => true,
        }
    }
}

/// Floats are compared against `max + 1`, which is exact in `f64` for every
/// width, so `i64::MAX` and `u64::MAX` do not round up into range.
fn integral(value: &Value, min: i128, max: i128) -> bool {
    let range = min..=max;
    if let Some(n) = value.as_i64() {
        return range.contains(&i128::from(n));
    }
    if let Some(n) = value.as_u64() {
        return range.contains(&i128::from(n));
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => {
            f >= min as f64 && f < (max + 1) as f64
        }
        _ => false,
    }
}

/// Shape of a nested schema, resolved lazily so recursive types can be
/// described.
#[derive(Clone, Copy)]
pub struct StructShape {
    name: &'static str,
    members: fn() -> Vec<Member>,
}

impl StructShape {
    /// The schema type's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The schema's members.
    #[must_use]
    pub fn members(&self) -> Vec<Member> {
        (self.members)()
    }
}

impl PartialEq for StructShape {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for StructShape {}

impl fmt::Debug for StructShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StructShape").field(&self.name).finish()
    }
}

/// How a member is classified for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Struct(StructShape),
    Slice(Box<FieldKind>),
}

impl FieldKind {
    /// The kind of a schema type.
    #[must_use]
    pub fn structure<T: Schema>() -> Self {
        FieldKind::Struct(StructShape {
            name: T::schema_name(),
            members: T::members,
        })
    }

    /// The type name used in `required` messages.
    #[must_use]
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            FieldKind::Scalar(scalar) => Cow::Borrowed(scalar.name()),
            FieldKind::Struct(_) => Cow::Borrowed("struct"),
            FieldKind::Slice(element) => Cow::Owned(format!("[]{}", element.element_name())),
        }
    }

    fn element_name(&self) -> Cow<'static, str> {
        match self {
            FieldKind::Struct(shape) => Cow::Borrowed(shape.name),
            other => other.type_name(),
        }
    }

    /// True for collection members.
    #[must_use]
    pub fn is_slice(&self) -> bool {
        matches!(self, FieldKind::Slice(_))
    }

    /// True for nested schema members.
    #[must_use]
    pub fn is_struct(&self) -> bool {
        matches!(self, FieldKind::Struct(_))
    }

    /// Number of collection layers wrapping the innermost kind.
    #[must_use]
    pub fn collection_layers(&self) -> usize {
        match self {
            FieldKind::Slice(element) => 1 + element.collection_layers(),
            _ => 0,
        }
    }

    /// The struct shape reached through any number of collection layers.
    #[must_use]
    pub fn nested_shape(&self) -> Option<&StructShape> {
        match self {
            FieldKind::Struct(shape) => Some(shape),
            FieldKind::Slice(element) => element.nested_shape(),
            FieldKind::Scalar(_) => None,
        }
    }
}

// ============================================================================
// DESCRIBE IMPLS
// ============================================================================

macro_rules! describe_scalar {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn kind() -> FieldKind {
                    FieldKind::Scalar(ScalarType::$scalar)
                }
            }
        )*
    };
}

describe_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    uuid::Uuid => Uuid,
    Value => Any,
}

impl<T: Describe> Describe for Option<T> {
    fn kind() -> FieldKind {
        T::kind()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::Slice(Box::new(T::kind()))
    }
}

impl<T: Describe> Describe for Box<T> {
    fn kind() -> FieldKind {
        T::kind()
    }
}

// ============================================================================
// MEMBER
// ============================================================================

/// One declared member of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builder methods must be chained or built"]
pub struct Member {
    name: Cow<'static, str>,
    kind: FieldKind,
    annotation: Cow<'static, str>,
    omit_empty: bool,
    hide_parent_name: bool,
}

impl Member {
    /// Creates a member from a serialization tag of the form
    /// `name[,option...]`. The `omitempty` option is recognized.
    pub fn new(tag: impl Into<Cow<'static, str>>, kind: FieldKind) -> Self {
        let tag = tag.into();
        let mut parts = tag.split(',');
        let name = parts.next().unwrap_or_default().trim().to_string();
        let omit_empty = parts.any(|option| option.trim() == "omitempty");
        Self {
            name: Cow::Owned(name),
            kind,
            annotation: Cow::Borrowed(""),
            omit_empty,
            hide_parent_name: false,
        }
    }

    /// Sets the comma-separated hint annotation.
    pub fn validate(mut self, annotation: impl Into<Cow<'static, str>>) -> Self {
        self.annotation = annotation.into();
        self
    }

    /// Marks the member as never required.
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Keeps nested member names free of this member's name.
    pub fn hide_parent_name(mut self) -> Self {
        self.hide_parent_name = true;
        self
    }

    /// External name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classification.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Raw hint annotation.
    #[must_use]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    #[must_use]
    pub fn is_omit_empty(&self) -> bool {
        self.omit_empty
    }

    #[must_use]
    pub fn hides_parent_name(&self) -> bool {
        self.hide_parent_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Point;

    impl Schema for Point {
        fn members() -> Vec<Member> {
            vec![Member::new("x", i32::kind()), Member::new("y", i32::kind())]
        }

        fn schema_name() -> &'static str {
            "Point"
        }
    }

    impl Describe for Point {
        fn kind() -> FieldKind {
            FieldKind::structure::<Point>()
        }
    }

    #[test]
    fn type_names() {
        assert_eq!(String::kind().type_name(), "string");
        assert_eq!(uuid::Uuid::kind().type_name(), "string UUID");
        assert_eq!(Option::<u16>::kind().type_name(), "u16");
        assert_eq!(Vec::<String>::kind().type_name(), "[]string");
        assert_eq!(Vec::<Point>::kind().type_name(), "[]Point");
        assert_eq!(Vec::<Vec<bool>>::kind().type_name(), "[][]bool");
        assert_eq!(Point::kind().type_name(), "struct");
    }

    #[test]
    fn nested_shape_sees_through_collections() {
        let kind = Vec::<Vec<Point>>::kind();
        assert_eq!(kind.nested_shape().map(StructShape::name), Some("Point"));
        assert_eq!(kind.nested_shape().unwrap().members().len(), 2);
        assert!(String::kind().nested_shape().is_none());
    }

    #[test]
    fn tag_parsing() {
        let member = Member::new("nick,omitempty", String::kind());
        assert_eq!(member.name(), "nick");
        assert!(member.is_omit_empty());

        let member = Member::new("", String::kind());
        assert_eq!(member.name(), "");
        assert!(!member.is_omit_empty());
    }

    #[test]
    fn integer_widths() {
        assert!(ScalarType::I32.accepts(&json!(2_147_483_647)));
        assert!(!ScalarType::I32.accepts(&json!(2_147_483_648_i64)));
        assert!(ScalarType::U64.accepts(&json!(u64::MAX)));
        assert!(!ScalarType::I64.accepts(&json!(u64::MAX)));
        assert!(ScalarType::U16.accepts(&json!(12.0)));
        assert!(!ScalarType::U16.accepts(&json!(true)));
    }

    #[test]
    fn float_bounds_at_64_bit_widths() {
        assert!(!ScalarType::I64.accepts(&json!(2f64.powi(63))));
        assert!(ScalarType::I64.accepts(&json!(-(2f64.powi(63)))));
        assert!(!ScalarType::U64.accepts(&json!(2f64.powi(64))));
        assert!(ScalarType::U64.accepts(&json!(9.0e18)));
        assert!(!ScalarType::U8.accepts(&json!(256.0)));
        assert!(ScalarType::U8.accepts(&json!(255.0)));
    }
}
