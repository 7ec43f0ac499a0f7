//! Macros for declaring predicates and schemas with minimal boilerplate.
//!
//! # Available Macros
//!
//! - [`predicate!`]: struct definition + [`Predicate`](crate::rule::Predicate) impl
//! - [`schema!`]: DTO struct + serde derives + [`Schema`](crate::Schema) and
//!   [`Describe`](crate::Describe) impls
//!
//! # Examples
//!
//! ```rust,ignore
//! use dtocheck::schema;
//!
//! schema! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Signup {
//!         #[field("email", validate = "required,email")]
//!         pub email: String,
//!         #[field("nickname", validate = "ifExists,minlen=3,maxlen=16")]
//!         pub nickname: Option<String>,
//!     }
//! }
//! ```

// ============================================================================
// PREDICATE MACRO
// ============================================================================

/// Creates a predicate type: struct definition, `Predicate` implementation
/// and, for structs with fields, a `new` constructor.
///
/// `#[derive(Debug, Clone)]` is always applied. Add extra derives via `#[derive(...)]`.
///
/// # Variants
///
/// **Unit predicate** (zero-sized, no fields):
/// ```rust,ignore
/// predicate! {
///     pub IsString;
///     test(value) { value.is_string() }
/// }
/// ```
///
/// **Struct with fields** (custom `new`):
/// ```rust,ignore
/// predicate! {
///     #[derive(Copy, PartialEq, Eq)]
///     pub AtLeast { min: usize };
///     test(self, value) { value.as_array().is_some_and(|a| a.len() >= self.min) }
///     new(min: usize) { Self { min } }
/// }
/// ```
#[macro_export]
macro_rules! predicate {
    // ── Variant 1: Unit predicate (no fields) ────────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident;
        test($val:ident) $test:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::rule::Predicate for $name {
            fn test(&self, $val: &::serde_json::Value) -> bool $test
        }
    };

    // ── Variant 2: Struct with fields + custom new ───────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident { $($field:ident: $fty:ty),+ $(,)? };
        test($self_:ident, $val:ident) $test:block
        new($($narg:ident: $naty:ty),* $(,)?) $new_body:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(pub $field: $fty,)+
        }

        impl $name {
            #[must_use]
            pub fn new($($narg: $naty),*) -> Self $new_body
        }

        impl $crate::rule::Predicate for $name {
            fn test(&$self_, $val: &::serde_json::Value) -> bool $test
        }
    };
}

// ============================================================================
// SCHEMA MACRO
// ============================================================================

/// Declares a DTO struct together with its schema description.
///
/// Every field carries a leading `#[field(...)]` attribute:
///
/// - the external (serialized) name, always first;
/// - `validate = "..."`: the comma-separated hint list;
/// - `omitempty`: never required, skipped when absent;
/// - `hide_parent_name`: nested members are not prefixed with this field's name.
///
/// Further attributes (doc comments, `#[serde(default)]`, ...) follow it.
/// The generated struct derives `serde::Deserialize` and `serde::Serialize`,
/// so the calling crate must depend on `serde`.
///
/// ```rust,ignore
/// schema! {
///     #[derive(Debug, Default)]
///     pub struct Address {
///         #[field("city", validate = "required")]
///         pub city: String,
///     }
/// }
///
/// schema! {
///     #[derive(Debug, Default)]
///     pub struct Customer {
///         #[field("address", validate = "ifExists")]
///         #[serde(default)]
///         pub address: Address,
///         #[field("tags", validate = "slice:maxlen=5,minlen=2")]
///         #[serde(default)]
///         pub tags: Vec<String>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                #[field($json:literal $(, $key:ident $(= $val:literal)?)* $(,)?)]
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(::serde::Deserialize, ::serde::Serialize)]
        $vis struct $name {
            $(
                #[serde(rename = $json)]
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Schema for $name {
            fn members() -> ::std::vec::Vec<$crate::Member> {
                ::std::vec![
                    $({
                        let member = $crate::Member::new(
                            $json,
                            <$fty as $crate::Describe>::kind(),
                        );
                        $( let member = $crate::__schema_attr!(member, $key $(= $val)?); )*
                        member
                    }),*
                ]
            }

            fn schema_name() -> &'static str {
                ::core::stringify!($name)
            }
        }

        impl $crate::Describe for $name {
            fn kind() -> $crate::FieldKind {
                $crate::FieldKind::structure::<$name>()
            }
        }
    };
}

/// Applies one `#[field(...)]` key to a member. Not public API.
#[doc(hidden)]
#[macro_export]
macro_rules! __schema_attr {
    ($member:ident, validate = $hints:literal) => {
        $member.validate($hints)
    };
    ($member:ident, omitempty) => {
        $member.omit_empty()
    };
    ($member:ident, hide_parent_name) => {
        $member.hide_parent_name()
    };
}
