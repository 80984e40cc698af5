//! Current-user abstraction and group membership checks
//!
//! Authentication happens before binding; the binder only reads the
//! resolved principal off the request.

use std::fmt;

use hintbind_validation::{ErrorType, ValidationError, ValidationResult, Value};

/// The authenticated (or anonymous) user attached to a request
pub trait Principal: fmt::Debug + Send + Sync {
    /// Top-level attribute by name
    fn attribute(&self, name: &str) -> Option<Value>;

    /// The whole user as a value
    fn to_value(&self) -> Value;

    fn is_authenticated(&self) -> bool {
        true
    }

    /// Group names the user belongs to
    fn groups(&self) -> Vec<String> {
        Vec::new()
    }

    /// Check if the user belongs to every group in `groups`
    fn has_all_groups(&self, groups: &[String]) -> bool {
        let own = self.groups();
        groups.iter().all(|g| own.contains(g))
    }

    /// Check if the user belongs to at least one group in `groups`
    fn has_any_group(&self, groups: &[String]) -> bool {
        let own = self.groups();
        groups.iter().any(|g| own.contains(g))
    }
}

/// Walk a dotted attribute path on a principal
///
/// The first segment is an attribute; later segments are object keys.
/// Any missing step yields `Value::Null`.
pub fn attribute_path(user: &dyn Principal, path: &str) -> Value {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Value::Null;
    };
    let Some(mut current) = user.attribute(first) else {
        return Value::Null;
    };
    for segment in segments {
        match current.get(segment) {
            Some(next) => current = next.clone(),
            None => return Value::Null,
        }
    }
    current
}

// ============================================================================
// User
// ============================================================================

/// Attribute-map principal
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    attributes: Vec<(String, Value)>,
    groups: Vec<String>,
    authenticated: bool,
}

impl User {
    /// Authenticated user with the given attributes
    pub fn new<K, I>(attributes: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            attributes: attributes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            groups: Vec::new(),
            authenticated: true,
        }
    }

    /// Unauthenticated user without attributes
    pub fn anonymous() -> Self {
        Self {
            attributes: Vec::new(),
            groups: Vec::new(),
            authenticated: false,
        }
    }

    /// Add a group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Add multiple groups
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }
}

impl Principal for User {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn groups(&self) -> Vec<String> {
        self.groups.clone()
    }
}

// ============================================================================
// Membership
// ============================================================================

/// Group requirements attached to a current-user parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipCheck {
    /// User must belong to all of these
    pub member_of: Vec<String>,
    /// User must belong to at least one of these
    pub member_of_any: Vec<String>,
}

impl MembershipCheck {
    pub fn new(member_of: Vec<String>, member_of_any: Vec<String>) -> Self {
        Self {
            member_of,
            member_of_any,
        }
    }

    /// Nothing to check
    pub fn is_empty(&self) -> bool {
        self.member_of.is_empty() && self.member_of_any.is_empty()
    }

    /// Run the check against the request's user
    pub fn check(&self, user: Option<&dyn Principal>) -> ValidationResult<()> {
        if self.is_empty() {
            return Ok(());
        }

        let user = match user {
            Some(user) if user.is_authenticated() => user,
            _ => {
                return Err(denied("Authentication credentials were not provided.").into());
            }
        };

        if !self.member_of.is_empty() && !user.has_all_groups(&self.member_of) {
            return Err(denied(format!(
                "User must be a member of all groups: {}.",
                self.member_of.join(", ")
            ))
            .into());
        }

        if !self.member_of_any.is_empty() && !user.has_any_group(&self.member_of_any) {
            return Err(denied(format!(
                "User must be a member of at least one group: {}.",
                self.member_of_any.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

fn denied(message: impl Into<String>) -> ValidationError {
    ValidationError::new(message, ErrorType::PermissionDenied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::new([
            ("username", Value::str("alice")),
            ("profile", Value::object([("email", Value::str("alice@example.com"))])),
        ])
        .with_groups(["staff", "editors"])
    }

    #[test]
    fn test_attribute_path() {
        let user = alice();
        assert_eq!(attribute_path(&user, "username"), Value::str("alice"));
        assert_eq!(
            attribute_path(&user, "profile.email"),
            Value::str("alice@example.com")
        );
        assert_eq!(attribute_path(&user, "profile.phone"), Value::Null);
        assert_eq!(attribute_path(&User::anonymous(), "profile.email"), Value::Null);
    }

    #[test]
    fn test_member_of_requires_all_groups() {
        let user = alice();
        let check = MembershipCheck::new(vec!["staff".into(), "editors".into()], vec![]);
        assert!(check.check(Some(&user)).is_ok());

        let check = MembershipCheck::new(vec!["staff".into(), "admins".into()], vec![]);
        let errors = check.check(Some(&user)).unwrap_err();
        assert_eq!(errors.errors[0].error_type, ErrorType::PermissionDenied);
    }

    #[test]
    fn test_member_of_any() {
        let user = alice();
        let check = MembershipCheck::new(vec![], vec!["admins".into(), "editors".into()]);
        assert!(check.check(Some(&user)).is_ok());

        let check = MembershipCheck::new(vec![], vec!["admins".into()]);
        assert!(check.check(Some(&user)).is_err());
    }

    #[test]
    fn test_anonymous_fails_configured_check() {
        let check = MembershipCheck::new(vec!["staff".into()], vec![]);
        assert!(check.check(Some(&User::anonymous())).is_err());
        assert!(check.check(None).is_err());
        assert!(MembershipCheck::default().check(None).is_ok());
    }
}
