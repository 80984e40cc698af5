//! API error types
//!
//! Binding failures surface as one `ApiError::Validation` carrying every
//! failing parameter. Declaration problems and a missing request object are
//! programming errors and never become validation responses.

use std::fmt;

use hintbind_validation::{ValidationError, ValidationErrors};
use thiserror::Error;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(ParamErrors),

    /// Handler rejected at declaration time
    #[error("Invalid handler declaration: {0}")]
    Declaration(String),

    #[error("Could not find request in handler arguments")]
    RequestNotFound,

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 422,
            ApiError::Declaration(_)
            | ApiError::RequestNotFound
            | ApiError::Handler(_)
            | ApiError::Internal(_) => 500,
        }
    }

    /// JSON detail for the error response
    ///
    /// Validation failures are keyed by parameter; everything else is a
    /// single `detail` message.
    pub fn to_detail(&self) -> serde_json::Value {
        match self {
            ApiError::Validation(errors) => errors.to_detail(),
            other => serde_json::json!({ "detail": other.to_string() }),
        }
    }

    /// True for per-request validation failures
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

impl From<ParamErrors> for ApiError {
    fn from(errors: ParamErrors) -> Self {
        ApiError::Validation(errors)
    }
}

// ============================================================================
// Aggregate parameter errors
// ============================================================================

/// Validation failures of one binding pass, keyed by effective parameter name
///
/// Keys keep the order in which parameters were attempted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamErrors {
    entries: Vec<(String, ValidationErrors)>,
}

impl ParamErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of failing parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record failures under `key`, merging with earlier failures for it
    pub fn add(&mut self, key: impl Into<String>, errors: ValidationErrors) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.merge(errors),
            None => self.entries.push((key, errors)),
        }
    }

    /// Record a single failure under `key`
    pub fn add_error(&mut self, key: impl Into<String>, error: ValidationError) {
        self.add(key, ValidationErrors::single(error));
    }

    /// Failures recorded for `key`
    pub fn get(&self, key: &str) -> Option<&ValidationErrors> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Failing parameter names in attempt order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationErrors)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// `Ok(())` when nothing failed
    pub fn into_result(self) -> ApiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }

    /// `{"param": <detail>, ...}`
    pub fn to_detail(&self) -> serde_json::Value {
        let mut detail = serde_json::Map::new();
        for (key, errors) in &self.entries {
            detail.insert(key.clone(), errors.to_detail());
        }
        serde_json::Value::Object(detail)
    }
}

impl fmt::Display for ParamErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.keys().collect();
        write!(f, "{} invalid parameter(s): {}", self.len(), keys.join(", "))
    }
}
