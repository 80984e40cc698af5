//! Binding configuration
//!
//! Framework-wide knobs for the parameter binder.
//!
//! # Example
//!
//! ```rust
//! use hintbind_api::BindingConfig;
//!
//! let config = BindingConfig::new()
//!     .query_delimiter("|")
//!     .model_bodies(false);
//! assert_eq!(config.query_delimiter, "|");
//! ```

/// Default separator for list-valued query parameters
pub const DEFAULT_DELIMITER: &str = ",";

/// Source key selecting the whole container
pub const WILDCARD: &str = "*";

/// Conventional name of the request parameter
pub const REQUEST_PARAM_NAME: &str = "request";

/// Binder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    /// Delimiter for implicit list-valued query parameters
    pub query_delimiter: String,

    /// Source key meaning "the whole container"
    pub wildcard: String,

    /// Unannotated parameter with this name receives the request
    pub request_param_name: String,

    /// Bind parameters annotated with external models from the body
    pub model_bodies: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            query_delimiter: DEFAULT_DELIMITER.to_string(),
            wildcard: WILDCARD.to_string(),
            request_param_name: REQUEST_PARAM_NAME.to_string(),
            model_bodies: true,
        }
    }
}

impl BindingConfig {
    /// Create a new binding config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the implicit query delimiter
    pub fn query_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.query_delimiter = delimiter.into();
        self
    }

    /// Set the wildcard source token
    pub fn wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.wildcard = wildcard.into();
        self
    }

    /// Set the request parameter name
    pub fn request_param_name(mut self, name: impl Into<String>) -> Self {
        self.request_param_name = name.into();
        self
    }

    /// Enable or disable implicit body binding for external models
    pub fn model_bodies(mut self, enabled: bool) -> Self {
        self.model_bodies = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BindingConfig::default();
        assert_eq!(config.query_delimiter, ",");
        assert_eq!(config.wildcard, "*");
        assert_eq!(config.request_param_name, "request");
        assert!(config.model_bodies);
    }

    #[test]
    fn test_builder() {
        let config = BindingConfig::new()
            .wildcard("__all__")
            .request_param_name("req");
        assert_eq!(config.wildcard, "__all__");
        assert_eq!(config.request_param_name, "req");
    }
}
