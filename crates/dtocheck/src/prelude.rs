//! Prelude module for convenient imports.
//!
//! `use dtocheck::prelude::*;` brings in the schema traits, the macros, the
//! entry points and the error types.

pub use crate::{
    Describe, DtoError, FieldError, Partial, Schema, ValidationError, Validator, ValidatorConfig,
    schema, validate, validate_dto, validate_dto_partially,
};
