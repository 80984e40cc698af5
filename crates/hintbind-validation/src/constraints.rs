//! Validation constraints for different validator kinds
//!
//! This module defines the constraint records that concrete validators carry:
//! string, numeric, list, decimal, temporal and file-path constraints.

use std::path::PathBuf;

use chrono::FixedOffset;
use rust_decimal::{Decimal, RoundingStrategy};

// ============================================================================
// String Constraints
// ============================================================================

/// Constraints for string validation
#[derive(Debug, Clone)]
pub struct StringConstraints {
    /// Minimum length (in characters, not bytes)
    pub min_length: Option<usize>,
    /// Maximum length (in characters, not bytes)
    pub max_length: Option<usize>,
    /// Strip leading/trailing whitespace before checks
    pub trim_whitespace: bool,
    /// Accept the empty string
    pub allow_blank: bool,
}

impl Default for StringConstraints {
    fn default() -> Self {
        Self {
            min_length: None,
            max_length: None,
            trim_whitespace: true,
            allow_blank: false,
        }
    }
}

/// Predefined string format validators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Email address format
    Email,
    /// Letters, digits, underscores and hyphens
    Slug,
    /// URL format (http/https/ftp)
    Url,
    /// UUID in any of the usual textual forms
    Uuid,
    /// A file below a configured directory
    FilePath,
    /// IPv4 address
    Ipv4,
    /// IPv6 address
    Ipv6,
    /// IPv4 or IPv6 address
    Ip,
}

impl StringFormat {
    /// Parse a format tag (`"email"`, `"ipv4"`, ...)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "email" => Some(Self::Email),
            "slug" => Some(Self::Slug),
            "url" => Some(Self::Url),
            "uuid" => Some(Self::Uuid),
            "file_path" => Some(Self::FilePath),
            "ipv4" => Some(Self::Ipv4),
            "ipv6" => Some(Self::Ipv6),
            "ip" => Some(Self::Ip),
            _ => None,
        }
    }

    /// Tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Slug => "slug",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::FilePath => "file_path",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Ip => "ip",
        }
    }
}

// ============================================================================
// Numeric Constraints
// ============================================================================

/// Constraints for numeric validation (generic over i64, f64 and Decimal)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericConstraints<T> {
    /// Minimum value (inclusive)
    pub minimum: Option<T>,
    /// Maximum value (inclusive)
    pub maximum: Option<T>,
}

// ============================================================================
// List Constraints
// ============================================================================

/// Constraints for list/array validation
#[derive(Debug, Clone, PartialEq)]
pub struct ListConstraints {
    /// Minimum number of items
    pub min_items: Option<usize>,
    /// Maximum number of items
    pub max_items: Option<usize>,
    /// Accept an empty list
    pub allow_empty: bool,
}

impl Default for ListConstraints {
    fn default() -> Self {
        Self {
            min_items: None,
            max_items: None,
            allow_empty: true,
        }
    }
}

// ============================================================================
// Decimal Constraints
// ============================================================================

/// Rounding modes accepted by decimal validators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Towards +infinity
    Ceiling,
    /// Towards -infinity
    Floor,
    /// Towards zero
    Down,
    /// Away from zero
    Up,
    /// Nearest, ties away from zero
    HalfUp,
    /// Nearest, ties towards zero
    HalfDown,
    /// Nearest, ties to even
    HalfEven,
}

impl Rounding {
    /// Parse the conventional `ROUND_*` names
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().trim_start_matches("ROUND_") {
            "CEILING" => Some(Self::Ceiling),
            "FLOOR" => Some(Self::Floor),
            "DOWN" => Some(Self::Down),
            "UP" => Some(Self::Up),
            "HALF_UP" => Some(Self::HalfUp),
            "HALF_DOWN" => Some(Self::HalfDown),
            "HALF_EVEN" => Some(Self::HalfEven),
            _ => None,
        }
    }

    pub(crate) fn strategy(self) -> RoundingStrategy {
        match self {
            Self::Ceiling => RoundingStrategy::ToPositiveInfinity,
            Self::Floor => RoundingStrategy::ToNegativeInfinity,
            Self::Down => RoundingStrategy::ToZero,
            Self::Up => RoundingStrategy::AwayFromZero,
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfDown => RoundingStrategy::MidpointTowardZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Constraints for decimal validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecimalConstraints {
    /// Inclusive bounds
    pub range: NumericConstraints<Decimal>,
    /// Maximum number of significant digits
    pub max_digits: Option<u32>,
    /// Maximum number of digits after the point (and quantization scale)
    pub decimal_places: Option<u32>,
    /// Round to `decimal_places` instead of rejecting extra places
    pub rounding: Option<Rounding>,
    /// Emit the validated decimal as a string
    pub coerce_to_string: bool,
    /// Accept `,` as the decimal separator
    pub localize: bool,
}

// ============================================================================
// Temporal Constraints
// ============================================================================

/// Accepted input formats for date/time/datetime validators
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalConstraints {
    /// strftime-style formats; `iso-8601` selects ISO parsing. Empty = ISO only.
    pub input_formats: Vec<String>,
    /// Offset applied to naive datetimes (datetime only; UTC when unset)
    pub default_timezone: Option<FixedOffset>,
}

// ============================================================================
// File Path Constraints
// ============================================================================

/// Options for the file path format
#[derive(Debug, Clone, PartialEq)]
pub struct FilePathConstraints {
    /// Directory to enumerate
    pub path: PathBuf,
    /// Regex the file name must match
    pub match_pattern: Option<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Offer files
    pub allow_files: bool,
    /// Offer directories
    pub allow_folders: bool,
}

impl Default for FilePathConstraints {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            match_pattern: None,
            recursive: false,
            allow_files: true,
            allow_folders: false,
        }
    }
}
