//! Parameter settings and source markers
//!
//! A `ParamSettings` value says where a handler parameter comes from and
//! which options its validator is built with. Handlers attach one as a
//! parameter default through the marker constructors:
//!
//! ```rust
//! use hintbind_api::settings::{current_user, path, query};
//!
//! let id = path().source("pk");
//! let tags = query().delimiter("|").min_length(1);
//! let email = current_user().source("profile.email").member_of(["staff"]);
//! # let _ = (id, tags, email);
//! ```

use hintbind_validation::{Decimal, FieldOptions, StringFormat, Value};
use tracing::warn;

use crate::config::DEFAULT_DELIMITER;
use crate::principal::MembershipCheck;

// ============================================================================
// Source
// ============================================================================

/// Lookup key override
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A single key (or dotted path for body and current-user)
    Key(String),
    /// The whole container
    Whole,
}

impl Source {
    /// `wildcard` selects the whole container, anything else is a key
    pub fn parse(text: &str, wildcard: &str) -> Self {
        if text == wildcard {
            Source::Whole
        } else {
            Source::Key(text.to_string())
        }
    }

    /// Re-read a key against the binder's wildcard token
    pub fn resolve(self, wildcard: &str) -> Self {
        match self {
            Source::Key(key) if key == wildcard => Source::Whole,
            other => other,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Source::Key(key) => Some(key),
            Source::Whole => None,
        }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Key(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Key(text)
    }
}

// ============================================================================
// Source kind
// ============================================================================

/// Request location a parameter is extracted from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Query { delimiter: String },
    Path,
    Header,
    Body,
    CurrentUser { membership: MembershipCheck },
}

impl SourceKind {
    /// Query source with the default delimiter
    pub fn query() -> Self {
        SourceKind::Query {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Current-user source without membership requirements
    pub fn current_user() -> Self {
        SourceKind::CurrentUser {
            membership: MembershipCheck::default(),
        }
    }

    /// Kind tag
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Query { .. } => "query_param",
            SourceKind::Path => "path",
            SourceKind::Header => "header",
            SourceKind::Body => "body",
            SourceKind::CurrentUser { .. } => "current_user",
        }
    }

    /// Location stamped on validation errors
    pub fn location(&self) -> &'static str {
        match self {
            SourceKind::Query { .. } => "query",
            SourceKind::Path => "path",
            SourceKind::Header => "header",
            SourceKind::Body => "body",
            SourceKind::CurrentUser { .. } => "user",
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Source and validator options for one handler parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSettings {
    pub kind: SourceKind,
    pub source: Option<Source>,
    pub options: FieldOptions,
}

impl ParamSettings {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            source: None,
            options: FieldOptions::default(),
        }
    }

    /// Override the lookup key
    ///
    /// A key equal to the binder's wildcard token (`*` by default) selects
    /// the whole container.
    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Select the whole container regardless of the wildcard token
    pub fn whole(mut self) -> Self {
        self.source = Some(Source::Whole);
        self
    }

    /// Replace all validator options
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Key used for lookups and error reporting
    ///
    /// The explicit source key, or the parameter name when unset or
    /// wildcard.
    pub fn effective_name<'a>(&'a self, param_name: &'a str) -> &'a str {
        self.source
            .as_ref()
            .and_then(Source::key)
            .unwrap_or(param_name)
    }

    /// True when the source selects the whole container
    pub fn is_whole(&self) -> bool {
        matches!(self.source, Some(Source::Whole))
    }

    /// List delimiter for query parameters
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        match &mut self.kind {
            SourceKind::Query { delimiter: current } => *current = delimiter.into(),
            other => warn!(kind = other.as_str(), "delimiter ignored outside query parameters"),
        }
        self
    }

    /// User must belong to every listed group
    pub fn member_of(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        match &mut self.kind {
            SourceKind::CurrentUser { membership } => {
                membership.member_of = groups.into_iter().map(Into::into).collect();
            }
            other => warn!(kind = other.as_str(), "member_of ignored outside current-user parameters"),
        }
        self
    }

    /// User must belong to at least one listed group
    pub fn member_of_any(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        match &mut self.kind {
            SourceKind::CurrentUser { membership } => {
                membership.member_of_any = groups.into_iter().map(Into::into).collect();
            }
            other => warn!(
                kind = other.as_str(),
                "member_of_any ignored outside current-user parameters"
            ),
        }
        self
    }

    /// Membership requirements, if this is a current-user parameter
    pub fn membership(&self) -> Option<&MembershipCheck> {
        match &self.kind {
            SourceKind::CurrentUser { membership } => Some(membership),
            _ => None,
        }
    }

    // Option shorthands

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.options = self.options.default_value(value);
        self
    }

    pub fn default_none(mut self) -> Self {
        self.options = self.options.default_none();
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.options = self.options.min_length(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.options = self.options.max_length(len);
        self
    }

    pub fn min_value(mut self, value: impl Into<Decimal>) -> Self {
        self.options = self.options.min_value(value);
        self
    }

    pub fn max_value(mut self, value: impl Into<Decimal>) -> Self {
        self.options = self.options.max_value(value);
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.options = self.options.regex(pattern);
        self
    }

    pub fn format(mut self, format: StringFormat) -> Self {
        self.options = self.options.format(format);
        self
    }

    /// Options for list elements
    pub fn child(mut self, child: FieldOptions) -> Self {
        self.options = self.options.child(child);
        self
    }
}

// ============================================================================
// Markers
// ============================================================================

/// Query-string parameter
pub fn query() -> ParamSettings {
    ParamSettings::new(SourceKind::query())
}

/// Path-captured parameter
pub fn path() -> ParamSettings {
    ParamSettings::new(SourceKind::Path)
}

/// Request header
pub fn header() -> ParamSettings {
    ParamSettings::new(SourceKind::Header)
}

/// Request body (whole payload unless a dotted source is given)
pub fn body() -> ParamSettings {
    ParamSettings::new(SourceKind::Body)
}

/// Current user (whole user unless a dotted source is given)
pub fn current_user() -> ParamSettings {
    ParamSettings::new(SourceKind::current_user())
}

/// Parameter of the given kind
pub fn param(kind: SourceKind) -> ParamSettings {
    ParamSettings::new(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!(Source::parse("*", "*"), Source::Whole);
        assert_eq!(Source::parse("pk", "*"), Source::Key("pk".to_string()));
        assert_eq!(Source::parse("*", "__all__"), Source::Key("*".to_string()));
    }

    #[test]
    fn test_source_keys_are_resolved_later() {
        assert_eq!(Source::from("*"), Source::Key("*".to_string()));
        assert_eq!(Source::from("*").resolve("*"), Source::Whole);
        assert_eq!(Source::from("__all__").resolve("__all__"), Source::Whole);
        assert_eq!(Source::from("*").resolve("__all__"), Source::Key("*".to_string()));
    }

    #[test]
    fn test_effective_name() {
        assert_eq!(path().effective_name("id"), "id");
        assert_eq!(path().source("pk").effective_name("id"), "pk");
        assert_eq!(query().whole().effective_name("filters"), "filters");
        assert!(query().whole().is_whole());
    }

    #[test]
    fn test_delimiter_only_applies_to_query() {
        let settings = query().delimiter("|");
        assert_eq!(
            settings.kind,
            SourceKind::Query {
                delimiter: "|".to_string()
            }
        );

        let settings = header().delimiter("|");
        assert_eq!(settings.kind, SourceKind::Header);
    }

    #[test]
    fn test_membership_builders() {
        let settings = current_user().member_of(["staff"]).member_of_any(["a", "b"]);
        let membership = settings.membership().unwrap();
        assert_eq!(membership.member_of, vec!["staff"]);
        assert_eq!(membership.member_of_any, vec!["a", "b"]);
        assert!(body().member_of(["staff"]).membership().is_none());
    }

    #[test]
    fn test_option_shorthands() {
        let settings = query().min_value(1).max_value(10).default_value(5i64);
        assert_eq!(settings.options.default, Some(Value::Int(5)));
        assert_eq!(settings.options.min_value, Some(Decimal::from(1)));
        assert_eq!(settings.kind.as_str(), "query_param");
    }
}
