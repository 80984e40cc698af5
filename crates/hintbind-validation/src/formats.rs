//! Format validation for common string patterns
//!
//! Pre-compiled regex validators for email, slug and URL formats, plus
//! address parsing and file-path enumeration for the remaining string formats.

use std::net::{Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::constraints::FilePathConstraints;

// ============================================================================
// Pre-compiled Regex Patterns
// ============================================================================

/// Email regex pattern (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Slug: letters, numbers, underscores or hyphens
static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// URL regex pattern (scheme, host or IP, optional port and path)
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:https?|ftps?)://(?:[^\s:@/]+(?::[^\s:@/]*)?@)?(?:localhost|\d{1,3}(?:\.\d{1,3}){3}|\[[0-9a-f:.]+\]|(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\.?)(?::\d{1,5})?(?:[/?#][^\s]*)?$",
    )
    .unwrap()
});

// ============================================================================
// Format Validators
// ============================================================================

/// Validate email format
///
/// # Example
/// ```
/// use hintbind_validation::formats::validate_email;
///
/// assert!(validate_email("user@example.com"));
/// assert!(!validate_email("invalid-email"));
/// ```
pub fn validate_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Validate slug format
pub fn validate_slug(value: &str) -> bool {
    SLUG_REGEX.is_match(value)
}

/// Validate URL format
///
/// # Example
/// ```
/// use hintbind_validation::formats::validate_url;
///
/// assert!(validate_url("https://www.nytimes.com/"));
/// assert!(validate_url("http://localhost:8080/path"));
/// assert!(!validate_url("not a url"));
/// ```
pub fn validate_url(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

/// Validate an IPv4 address
pub fn validate_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok()
}

/// Validate an IPv6 address
pub fn validate_ipv6(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

/// Validate an IPv4 or IPv6 address
pub fn validate_ip(value: &str) -> bool {
    validate_ipv4(value) || validate_ipv6(value)
}

/// Enumerate the paths a file-path validator accepts
///
/// Entries are absolute-or-relative paths exactly as joined onto
/// `options.path`, sorted for stable choice order. Unreadable entries are
/// skipped.
pub fn file_path_choices(options: &FilePathConstraints) -> Vec<String> {
    let matcher = options
        .match_pattern
        .as_deref()
        .and_then(|pattern| Regex::new(pattern).ok());
    let max_depth = if options.recursive { usize::MAX } else { 1 };

    let mut choices: Vec<String> = WalkDir::new(&options.path)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            let file_type = entry.file_type();
            (options.allow_files && file_type.is_file())
                || (options.allow_folders && file_type.is_dir())
        })
        .filter(|entry| match &matcher {
            Some(re) => re.is_match(&entry.file_name().to_string_lossy()),
            None => true,
        })
        .map(|entry| entry.path().to_string_lossy().into_owned())
        .collect();

    choices.sort();
    choices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("robert@hotmail.com"));
        assert!(validate_email("test.user+tag@subdomain.example.co.uk"));

        assert!(!validate_email("invalid-email"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@example"));
    }

    #[test]
    fn test_slug_validation() {
        assert!(validate_slug("cat"));
        assert!(validate_slug("my-slug_2"));
        assert!(!validate_slug("has space"));
        assert!(!validate_slug(""));
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_url("https://example.com"));
        assert!(validate_url("http://localhost:8080"));
        assert!(validate_url("https://sub.domain.example.com/path?query=value"));
        assert!(validate_url("http://127.0.0.1/x"));

        assert!(!validate_url("not-a-url"));
        assert!(!validate_url("://example.com"));
        assert!(!validate_url("mailto:someone@example.com"));
    }

    #[test]
    fn test_ip_validation() {
        assert!(validate_ipv4("162.254.168.185"));
        assert!(!validate_ipv4("256.1.1.1"));
        assert!(!validate_ipv4("::1"));

        assert!(validate_ipv6("::1"));
        assert!(validate_ipv6("2001:db8::ff00:42:8329"));
        assert!(!validate_ipv6("10.0.0.1"));

        assert!(validate_ip("10.0.0.1"));
        assert!(validate_ip("fe80::1"));
        assert!(!validate_ip("localhost"));
    }

    #[test]
    fn test_file_path_choices() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.html"), "a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.html"), "c").unwrap();

        let flat = file_path_choices(&FilePathConstraints {
            path: dir.path().to_path_buf(),
            ..Default::default()
        });
        assert_eq!(flat.len(), 2);

        let html = file_path_choices(&FilePathConstraints {
            path: dir.path().to_path_buf(),
            match_pattern: Some(r"\.html$".to_string()),
            recursive: true,
            ..Default::default()
        });
        assert_eq!(html.len(), 2);
        assert!(html.iter().all(|p| p.ends_with(".html")));

        let folders = file_path_choices(&FilePathConstraints {
            path: dir.path().to_path_buf(),
            allow_files: false,
            allow_folders: true,
            ..Default::default()
        });
        assert_eq!(folders.len(), 1);
    }
}
