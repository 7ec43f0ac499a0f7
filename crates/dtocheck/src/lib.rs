//! # dtocheck
//!
//! Schema-driven validation of untyped JSON trees against Rust DTOs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dtocheck::prelude::*;
//!
//! schema! {
//!     #[derive(Debug)]
//!     pub struct Signup {
//!         #[field("email", validate = "required,email")]
//!         pub email: String,
//!         #[field("tags", validate = "ifExists,slice:maxlen=5,minlen=2")]
//!         #[serde(default)]
//!         pub tags: Vec<String>,
//!     }
//! }
//!
//! let signup: Signup = validate_dto(serde_json::json!({"email": "a@b.com"}))?;
//! ```
//!
//! ## Hints
//!
//! A member's `validate` annotation is a comma-separated list drawn from a
//! fixed vocabulary:
//!
//! - **Structural**: `required`, `type`, `ifExists`, `omitempty`,
//!   `nestedProps=a|b`
//! - **Strings**: `len=N`, `minlen=N`, `maxlen=N`, `email`, `date`,
//!   `date=LAYOUT`
//! - **Collections**: `slice:len=N`, `slice:minlen=N`, `slice:maxlen=N`
//!
//! On a collection member, every rule except the `slice:` counts is applied
//! to each element and failures are reported as `name[i]`.
//!
//! ## Reusing a compiled schema
//!
//! The free functions describe the schema on every call. A [`Validator`]
//! compiles it once and can be shared between threads.

mod config;
mod describe;
mod error;
mod executor;
mod extract;
mod field;
mod macros;
pub mod prelude;
pub mod rule;

pub use config::{HintPolicy, LengthMode, NestedPropsPolicy, ValidatorConfig};
pub use describe::{Describe, FieldKind, Member, ScalarType, Schema, StructShape};
pub use error::{DtoError, FieldError, SchemaError, ValidationError};
pub use executor::{Partial, Validator, validate, validate_dto, validate_dto_partially};
pub use field::Field;
