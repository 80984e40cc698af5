//! Validation error types
//!
//! A validator failure is a `ValidationErrors` collection: one entry per
//! message, each tagged with the location it came from and the field path
//! relative to the value being validated (empty for the value itself,
//! `name` / `[0]` / `author.name` for nested members).

use std::fmt;
use thiserror::Error;

// ============================================================================
// Validation Result
// ============================================================================

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationErrors>;

// ============================================================================
// Validation Errors Collection
// ============================================================================

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{} validation error(s)", errors.len())]
pub struct ValidationErrors {
    /// List of individual validation errors
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Collection holding a single error
    pub fn single(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Merge another ValidationErrors into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Convert to Result - Ok if no errors, Err if there are errors
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Get errors as a slice
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Re-root every error under `segment` (a field name or `[index]`)
    pub fn nested_under(mut self, segment: &str) -> Self {
        for error in &mut self.errors {
            error.field = join_field(segment, &error.field);
        }
        self
    }

    /// Stamp every error with a request location (`query`, `body`...)
    pub fn at_location(mut self, location: &str) -> Self {
        for error in &mut self.errors {
            error.location = location.to_string();
        }
        self
    }

    /// Messages in insertion order, without field paths
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// True if any message contains `needle`
    pub fn contains_message(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.message.contains(needle))
    }

    /// Structured detail: a list of messages for the value itself, or an
    /// object keyed by field path when members failed.
    pub fn to_detail(&self) -> serde_json::Value {
        if self.errors.iter().all(|e| e.field.is_empty()) {
            return serde_json::Value::Array(
                self.errors
                    .iter()
                    .map(|e| serde_json::Value::String(e.message.clone()))
                    .collect(),
            );
        }

        let mut detail = serde_json::Map::new();
        for error in &self.errors {
            let key = if error.field.is_empty() {
                "non_field_errors".to_string()
            } else {
                error.field.clone()
            };
            let entry = detail
                .entry(key)
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if let serde_json::Value::Array(messages) = entry {
                messages.push(serde_json::Value::String(error.message.clone()));
            }
        }
        serde_json::Value::Object(detail)
    }
}

fn join_field(segment: &str, rest: &str) -> String {
    if rest.is_empty() {
        segment.to_string()
    } else if rest.starts_with('[') {
        format!("{}{}", segment, rest)
    } else {
        format!("{}.{}", segment, rest)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

// ============================================================================
// Single Validation Error
// ============================================================================

/// A single validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Location of the error (e.g., "body", "query", "path"); empty until a
    /// binder stamps it
    pub location: String,

    /// Field path relative to the validated value
    pub field: String,

    /// Human-readable error message
    pub message: String,

    /// Error type classification
    pub error_type: ErrorType,
}

impl ValidationError {
    /// Create a new validation error for the value itself
    pub fn new(message: impl Into<String>, error_type: ErrorType) -> Self {
        Self {
            location: String::new(),
            field: String::new(),
            message: message.into(),
            error_type,
        }
    }

    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(message, ErrorType::TypeError)
    }

    /// Create a value error
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(message, ErrorType::ValueError)
    }

    /// Create a format error
    pub fn format_error(message: impl Into<String>) -> Self {
        Self::new(message, ErrorType::FormatError)
    }

    /// Create a missing field error
    pub fn missing_error() -> Self {
        Self::new("This field is required.", ErrorType::Missing)
    }

    /// Create a null-not-allowed error
    pub fn null_error() -> Self {
        Self::new("This field may not be null.", ErrorType::NullNotAllowed)
    }

    /// Attach a field path
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} [{}]",
            self.location, self.field, self.message, self.error_type
        )
    }
}

// ============================================================================
// Error Type Classification
// ============================================================================

/// Classification of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Type mismatch error (e.g., expected string, got list)
    TypeError,

    /// Value constraint violation (e.g., string too long, number out of range)
    ValueError,

    /// Required field missing
    Missing,

    /// Null given to a non-nullable field
    NullNotAllowed,

    /// Invalid format (e.g., invalid email, malformed UUID)
    FormatError,

    /// Value outside the allowed choices
    InvalidChoice,

    /// Current-user membership check failed
    PermissionDenied,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeError => write!(f, "type_error"),
            Self::ValueError => write!(f, "value_error"),
            Self::Missing => write!(f, "missing"),
            Self::NullNotAllowed => write!(f, "null"),
            Self::FormatError => write!(f, "format_error"),
            Self::InvalidChoice => write!(f, "invalid_choice"),
            Self::PermissionDenied => write!(f, "permission_denied"),
        }
    }
}

// ============================================================================
// Attribute Access Errors
// ============================================================================

/// Failure reading a validated attribute from a schema instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// Accessed before `is_valid()` / `validate()` ran successfully
    #[error("You must call `.is_valid()` before accessing de-serialized attributes.")]
    NotValidated,

    /// Not a declared field, or absent from the validated data
    #[error("{0} does not exist.")]
    NoSuchField(String),
}
