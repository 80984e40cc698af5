//! Schema types
//!
//! A schema is a named, ordered registry of field validators. Fields are
//! either declared explicitly or synthesized from annotations: each
//! annotation is resolved to a descriptor and built into a validator, with
//! its default (if any) making the field optional.
//!
//! ```
//! use hintbind_validation::hint::TypeHint;
//! use hintbind_validation::schema::Schema;
//! use hintbind_validation::types::Value;
//!
//! let author = Schema::builder("Author")
//!     .annotate("name", TypeHint::Str)
//!     .annotate_with_default("age", TypeHint::optional(TypeHint::Int), Value::Null)
//!     .build();
//!
//! let mut instance = author.instance(Value::object([("name", Value::str("JK Rowling"))]));
//! assert!(instance.is_valid());
//! assert_eq!(instance.get("name").unwrap(), &Value::str("JK Rowling"));
//! ```
//!
//! The registry is built once, when the schema is built, and shared by
//! every instance.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::context::ValidatorContext;
use crate::errors::{AttributeError, ValidationError, ValidationErrors, ValidationResult};
use crate::factory;
use crate::hint::TypeHint;
use crate::nested::{NestedSchema, NestedType, NON_FIELD_ERRORS};
use crate::options::FieldOptions;
use crate::resolver::resolve;
use crate::types::Value;
use crate::validators::Validator;

// ============================================================================
// Declared Fields
// ============================================================================

/// How a field entered the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    /// Declared with an explicit validator
    Declared,
    /// Synthesized from an annotation
    Synthesized,
}

/// One entry of a schema's field registry
#[derive(Debug, Clone)]
pub struct DeclaredField {
    /// Field name
    pub name: String,
    /// Validator for the field
    pub validator: Validator,
    /// Declared or synthesized
    pub origin: FieldOrigin,
}

/// An annotated attribute awaiting synthesis
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Attribute name
    pub name: String,
    /// Annotation
    pub hint: TypeHint,
    /// Field options; `options.default` carries the assigned default
    pub options: FieldOptions,
}

// ============================================================================
// Schema
// ============================================================================

/// A schema type
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<DeclaredField>,
}

impl Schema {
    /// Start declaring a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            inherited: Vec::new(),
            declared: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Start declaring a schema that inherits `parent`'s fields
    pub fn extend(parent: &Arc<Schema>, name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            inherited: parent.fields.clone(),
            ..Self::builder(name)
        }
    }

    /// Schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in registry order
    pub fn fields(&self) -> &[DeclaredField] {
        &self.fields
    }

    /// Field by name
    pub fn field(&self, name: &str) -> Option<&DeclaredField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` is a field
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Instance bound to one object payload
    pub fn instance(self: &Arc<Self>, data: Value) -> SchemaInstance {
        SchemaInstance::new(Arc::clone(self), data, false)
    }

    /// Instance bound to a sequence of object payloads
    pub fn many(self: &Arc<Self>, data: Value) -> SchemaInstance {
        SchemaInstance::new(Arc::clone(self), data, true)
    }

    /// Handle for use in hints
    pub fn nested_type(self: &Arc<Self>) -> NestedType {
        NestedType::Schema(Arc::clone(self))
    }

    /// Hint naming this schema
    pub fn hint(self: &Arc<Self>) -> TypeHint {
        TypeHint::Nested(self.nested_type())
    }

    /// Validate one object payload through every field
    pub fn validate_object(&self, raw: &Value, ctx: &ValidatorContext) -> ValidationResult<Value> {
        if !matches!(raw, Value::Object(_)) {
            return Err(ValidationError::type_error(format!(
                "Invalid data. Expected a dictionary, but got {}.",
                raw.type_name()
            ))
            .with_field(NON_FIELD_ERRORS)
            .into());
        }

        let mut errors = ValidationErrors::new();
        let mut validated = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let raw_field = raw.get(&field.name).cloned();
            let validator = &field.validator;
            if raw_field.is_none() && !validator.is_required() && validator.default_value().is_none() {
                continue;
            }
            match validator.run_validation(raw_field, &ctx.child(field.name.as_str())) {
                Ok(value) => validated.push((field.name.clone(), value)),
                Err(e) => errors.merge(e.nested_under(&field.name)),
            }
        }

        errors.into_result().map(|_| Value::Object(validated))
    }
}

impl NestedSchema for Schema {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, raw: &Value, ctx: &ValidatorContext) -> ValidationResult<Value> {
        self.validate_object(raw, ctx)
    }
}

// ============================================================================
// Builder and Synthesis
// ============================================================================

/// Declares a schema's explicit fields and annotations
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    inherited: Vec<DeclaredField>,
    declared: Vec<(String, Validator)>,
    annotations: Vec<Annotation>,
}

impl SchemaBuilder {
    /// Declare a field with an explicit validator
    pub fn declare(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.declared.push((name.into(), validator));
        self
    }

    /// Annotate an attribute with no default
    pub fn annotate(self, name: impl Into<String>, hint: TypeHint) -> Self {
        self.annotate_with_options(name, hint, FieldOptions::new())
    }

    /// Annotate an attribute with an assigned default (`Value::Null` for `None`)
    pub fn annotate_with_default(
        self,
        name: impl Into<String>,
        hint: TypeHint,
        default: Value,
    ) -> Self {
        self.annotate_with_options(name, hint, FieldOptions::new().default_value(default))
    }

    /// Annotate an attribute with field options
    pub fn annotate_with_options(
        mut self,
        name: impl Into<String>,
        hint: TypeHint,
        options: FieldOptions,
    ) -> Self {
        self.annotations.push(Annotation {
            name: name.into(),
            hint,
            options,
        });
        self
    }

    /// Whether `name` already carries an explicit validator (own or inherited)
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.iter().any(|(n, _)| n == name)
            || self
                .inherited
                .iter()
                .any(|f| f.name == name && f.origin == FieldOrigin::Declared)
    }

    /// Own annotations, in declaration order
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Build the schema
    pub fn build(self) -> Arc<Schema> {
        let synthesized = synthesize(&self);
        let SchemaBuilder {
            name,
            inherited,
            declared,
            ..
        } = self;

        let mut fields = inherited;
        for (field_name, validator) in declared {
            upsert(&mut fields, field_name, validator, FieldOrigin::Declared);
        }
        for (field_name, validator) in synthesized {
            upsert(&mut fields, field_name, validator, FieldOrigin::Synthesized);
        }

        debug!(schema = %name, fields = fields.len(), "Built schema");
        Arc::new(Schema { name, fields })
    }

    /// Build the schema and register it process-wide under its name
    pub fn register(self) -> Arc<Schema> {
        let schema = self.build();
        SchemaRegistry::global().register(Arc::clone(&schema));
        schema
    }
}

fn upsert(fields: &mut Vec<DeclaredField>, name: String, validator: Validator, origin: FieldOrigin) {
    match fields.iter_mut().find(|f| f.name == name) {
        Some(existing) => {
            existing.validator = validator;
            existing.origin = origin;
        }
        None => fields.push(DeclaredField {
            name,
            validator,
            origin,
        }),
    }
}

/// Validators for every own annotation without an explicit validator
///
/// Pure: reads the builder and returns `(name, validator)` pairs in
/// annotation order. A name annotated twice keeps its last annotation.
pub fn synthesize(builder: &SchemaBuilder) -> Vec<(String, Validator)> {
    let mut synthesized: Vec<(String, Validator)> = Vec::new();
    for annotation in builder.annotations() {
        if builder.is_declared(&annotation.name) {
            continue;
        }
        let descriptor = resolve(&annotation.hint);
        debug!(
            schema = %builder.name,
            field = %annotation.name,
            kind = descriptor.base_kind.as_str(),
            optional = descriptor.is_optional,
            "Synthesized field"
        );
        let validator = factory::build(&descriptor, &annotation.options);
        match synthesized.iter_mut().find(|(n, _)| *n == annotation.name) {
            Some(entry) => entry.1 = validator,
            None => synthesized.push((annotation.name.clone(), validator)),
        }
    }
    synthesized
}

// ============================================================================
// Instances
// ============================================================================

/// A schema bound to raw data
#[derive(Debug, Clone)]
pub struct SchemaInstance {
    schema: Arc<Schema>,
    initial_data: Value,
    many: bool,
    context: ValidatorContext,
    validated: Option<Value>,
    errors: ValidationErrors,
}

impl SchemaInstance {
    fn new(schema: Arc<Schema>, initial_data: Value, many: bool) -> Self {
        Self {
            schema,
            initial_data,
            many,
            context: ValidatorContext::new(),
            validated: None,
            errors: ValidationErrors::new(),
        }
    }

    /// Validate with this context
    pub fn with_context(mut self, context: ValidatorContext) -> Self {
        self.context = context;
        self
    }

    /// Schema type
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Raw data the instance was bound to
    pub fn initial_data(&self) -> &Value {
        &self.initial_data
    }

    /// Run validation; true when the data is valid
    pub fn is_valid(&mut self) -> bool {
        let nested = NestedType::Schema(Arc::clone(&self.schema));
        let result = match (&self.initial_data, self.many) {
            (Value::List(items), true) => nested.validate_many(items, &self.context),
            (other, true) => Err(ValidationError::type_error(format!(
                "Expected a list of items but got type \"{}\".",
                other.type_name()
            ))
            .with_field(NON_FIELD_ERRORS)
            .into()),
            (data, false) => self.schema.validate_object(data, &self.context),
        };

        match result {
            Ok(value) => {
                self.validated = Some(value);
                self.errors = ValidationErrors::new();
                true
            }
            Err(errors) => {
                self.validated = None;
                self.errors = errors;
                false
            }
        }
    }

    /// Run validation, returning the validated data or the errors
    pub fn validate(&mut self) -> ValidationResult<&Value> {
        if self.is_valid() {
            self.as_dict().map_err(|_| self.errors.clone())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Validated attribute by name
    pub fn get(&self, name: &str) -> Result<&Value, AttributeError> {
        let validated = self.validated.as_ref().ok_or(AttributeError::NotValidated)?;
        if !self.schema.has_field(name) {
            return Err(AttributeError::NoSuchField(name.to_string()));
        }
        validated.attr(name)
    }

    /// The whole validated mapping (a list for many-instances)
    pub fn as_dict(&self) -> Result<&Value, AttributeError> {
        self.validated.as_ref().ok_or(AttributeError::NotValidated)
    }

    /// Errors from the last validation run
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }
}

// ============================================================================
// Registry
// ============================================================================

static GLOBAL_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// Name-indexed schema registry, written at registration and read by hint
/// parsing
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry
    pub fn global() -> &'static SchemaRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register (or replace) a schema under its name
    pub fn register(&self, schema: Arc<Schema>) {
        debug!(schema = %schema.name(), "Registered schema");
        self.schemas.write().insert(schema.name().to_string(), schema);
    }

    /// Look up a schema by name
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }
}
