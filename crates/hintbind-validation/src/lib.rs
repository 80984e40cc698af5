//! Hintbind Validation
//!
//! Validators derived from type hints.
//!
//! This crate is the validation foundation for `hintbind-api`:
//! - `hint` / `resolver`: annotations and their normalized descriptors
//! - `factory` / `validators`: descriptor + options to a concrete validator
//! - `schema`: schema types whose fields are synthesized from annotations
//! - `nested`: nested schema and external model capability
//!
//! # Example
//!
//! ```rust
//! use hintbind_validation::{build, resolve, FieldOptions, TypeHint, Value, ValidatorContext};
//!
//! let hint = TypeHint::parse("List[int]");
//! let validator = build(&resolve(&hint), &FieldOptions::new());
//!
//! let value = validator
//!     .run_validation(Some(Value::from(vec!["1", "2", "3"])), &ValidatorContext::new())
//!     .unwrap();
//! assert_eq!(value, Value::from(vec![1i64, 2, 3]));
//!
//! // Invalid item
//! let result = validator.run_validation(Some(Value::from(vec!["x"])), &ValidatorContext::new());
//! assert!(result.is_err());
//! ```

// Public modules
pub mod constraints;
pub mod context;
pub mod errors;
pub mod factory;
pub mod formats;
pub mod hint;
pub mod nested;
pub mod options;
pub mod resolver;
pub mod schema;
pub mod temporal;
pub mod types;
pub mod validators;

// Re-export commonly used types
pub use constraints::{
    DecimalConstraints, FilePathConstraints, ListConstraints, NumericConstraints, Rounding,
    StringConstraints, StringFormat, TemporalConstraints,
};
pub use context::ValidatorContext;
pub use errors::{AttributeError, ErrorType, ValidationError, ValidationErrors, ValidationResult};
pub use factory::build;
pub use hint::{EnumType, HintScope, TypeHint};
pub use nested::{NestedKind, NestedSchema, NestedType, SerdeModel};
pub use options::FieldOptions;
pub use resolver::{resolve, BaseKind, Shape, TypeDescriptor};
pub use schema::{Schema, SchemaBuilder, SchemaInstance, SchemaRegistry};
pub use types::Value;
pub use validators::{Validator, ValidatorKind};

// Typed scalar re-exports
pub use rust_decimal::Decimal;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
