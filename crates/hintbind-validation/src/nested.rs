//! Nested object capability
//!
//! A hint naming a nested type resolves to one of two variants:
//!
//! - `NestedType::Schema`: a schema type built with [`crate::schema::Schema`],
//!   whose declared validators check each member. A sequence payload is
//!   validated as many instances.
//! - `NestedType::Model`: an external model behind the [`NestedSchema`]
//!   trait, typically a serde type wrapped in [`SerdeModel`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::ValidatorContext;
use crate::errors::{ErrorType, ValidationError, ValidationErrors, ValidationResult};
use crate::schema::Schema;
use crate::types::Value;

/// Field key used for errors that belong to no single member
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Whole-object validation capability
pub trait NestedSchema: Send + Sync {
    /// Type name, used for registry lookups and debugging
    fn name(&self) -> &str;

    /// Validate a raw payload into its normalized form
    fn validate(&self, raw: &Value, ctx: &ValidatorContext) -> ValidationResult<Value>;
}

/// Which variant a nested type is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedKind {
    /// Declared-field schema type
    Schema,
    /// External model type
    Model,
}

/// Handle to a nested schema or model type
#[derive(Clone)]
pub enum NestedType {
    /// Schema type with synthesized fields
    Schema(Arc<Schema>),
    /// External model
    Model(Arc<dyn NestedSchema>),
}

impl NestedType {
    /// Wrap a schema type
    pub fn schema(schema: Arc<Schema>) -> Self {
        Self::Schema(schema)
    }

    /// Wrap a serde model type
    pub fn model<T>(name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        Self::Model(Arc::new(SerdeModel::<T>::new(name)))
    }

    /// Type name
    pub fn name(&self) -> &str {
        match self {
            Self::Schema(schema) => schema.name(),
            Self::Model(model) => model.name(),
        }
    }

    /// Variant tag
    pub fn kind(&self) -> NestedKind {
        match self {
            Self::Schema(_) => NestedKind::Schema,
            Self::Model(_) => NestedKind::Model,
        }
    }

    /// The schema type, if this is one
    pub fn as_schema(&self) -> Option<&Arc<Schema>> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Model(_) => None,
        }
    }

    /// Validate one object payload
    pub fn validate(&self, raw: &Value, ctx: &ValidatorContext) -> ValidationResult<Value> {
        match self {
            Self::Schema(schema) => NestedSchema::validate(schema.as_ref(), raw, ctx),
            Self::Model(model) => model.validate(raw, ctx),
        }
    }

    /// Validate a sequence payload as many objects, keying errors by index
    pub fn validate_many(&self, items: &[Value], ctx: &ValidatorContext) -> ValidationResult<Value> {
        let mut errors = ValidationErrors::new();
        let mut validated = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let segment = format!("[{}]", index);
            match self.validate(item, &ctx.child(segment.as_str())) {
                Ok(value) => validated.push(value),
                Err(e) => errors.merge(e.nested_under(&segment)),
            }
        }
        errors.into_result().map(|_| Value::List(validated))
    }
}

impl PartialEq for NestedType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Schema(a), Self::Schema(b)) => Arc::ptr_eq(a, b) || a.name() == b.name(),
            (Self::Model(a), Self::Model(b)) => Arc::ptr_eq(a, b) || a.name() == b.name(),
            _ => false,
        }
    }
}

impl fmt::Debug for NestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(schema) => write!(f, "Schema({})", schema.name()),
            Self::Model(model) => write!(f, "Model({})", model.name()),
        }
    }
}

// ============================================================================
// Serde Models
// ============================================================================

/// External model validated by round-tripping through serde
pub struct SerdeModel<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeModel<T> {
    /// Create a model handle
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> NestedSchema for SerdeModel<T>
where
    T: DeserializeOwned + Serialize,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &Value, _ctx: &ValidatorContext) -> ValidationResult<Value> {
        let payload: serde_json::Value = raw.clone().into();
        let model: T = serde_path_to_error::deserialize(payload).map_err(translate_serde_error)?;
        serde_json::to_value(&model)
            .map(Value::from)
            .map_err(|error| {
                ValidationErrors::single(
                    ValidationError::type_error(error.to_string()).with_field(NON_FIELD_ERRORS),
                )
            })
    }
}

/// Map a path-tracked serde error onto a field-keyed validation error
///
/// Errors are keyed by the path to the failing member (`author.pages`,
/// `tags[2]`). Missing and unknown members are reported on the member
/// serde names in backticks; root-level type errors go under
/// `non_field_errors`.
pub fn translate_serde_error(
    error: serde_path_to_error::Error<serde_json::Error>,
) -> ValidationErrors {
    let path = error.path().to_string();
    let parent = (path != ".").then_some(path);
    let message = error.into_inner().to_string();

    let named = message
        .split('`')
        .nth(1)
        .filter(|name| !name.is_empty())
        .filter(|_| message.starts_with("missing field") || message.starts_with("unknown field"))
        .map(|name| match &parent {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.to_string(),
        });

    let error = match (named, parent) {
        (Some(field), _) if message.starts_with("missing field") => {
            ValidationError::missing_error().with_field(field)
        }
        (Some(field), _) | (None, Some(field)) => {
            ValidationError::new(message, ErrorType::ValueError).with_field(field)
        }
        (None, None) => ValidationError::type_error(message).with_field(NON_FIELD_ERRORS),
    };
    ValidationErrors::single(error)
}
