//! Validator context
//!
//! Carries the request-side information a validator may need: the location
//! the raw value came from, the field path being validated, and arbitrary
//! metadata supplied by the caller (nested validators receive it unchanged).

use std::collections::HashMap;

use crate::types::Value;

/// Context passed to every validator run
#[derive(Debug, Clone, Default)]
pub struct ValidatorContext {
    /// Location in request (e.g., "body", "query")
    location: String,
    /// Current field path (e.g., "author.address")
    path: Vec<String>,
    /// Caller-supplied metadata
    metadata: HashMap<String, Value>,
}

impl ValidatorContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with location
    pub fn with_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Get location
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Get current field path
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// Context for a member one level down
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.path.push(segment.into());
        child
    }

    /// Set metadata
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Builder form of `set_metadata`
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_metadata(key, value);
        self
    }

    /// Get metadata
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_paths() {
        let ctx = ValidatorContext::with_location("body");
        let nested = ctx.child("author").child("name");
        assert_eq!(nested.current_path(), "author.name");
        assert_eq!(nested.location(), "body");
        assert_eq!(ctx.current_path(), "");
    }

    #[test]
    fn test_metadata_is_inherited() {
        let ctx = ValidatorContext::new().with_metadata("tenant", Value::str("acme"));
        assert_eq!(ctx.child("x").metadata("tenant"), Some(&Value::str("acme")));
        assert!(ctx.metadata("missing").is_none());
    }
}
