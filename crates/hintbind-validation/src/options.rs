//! Per-field configuration options
//!
//! `FieldOptions` is the type-level option bag the validator factory reads:
//! length and value bounds, string formats, decimal precision, temporal input
//! formats, file-path enumeration and the options for list elements.

use chrono::FixedOffset;
use rust_decimal::Decimal;

use crate::constraints::{FilePathConstraints, Rounding, StringFormat};
use crate::types::Value;

/// Options applied when building a validator for one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOptions {
    /// Fallback when the raw value is missing; `None` means "no default"
    /// (`Some(Value::Null)` is a real `None` default)
    pub default: Option<Value>,

    /// Minimum string length / list size
    pub min_length: Option<usize>,

    /// Maximum string length / list size
    pub max_length: Option<usize>,

    /// Inclusive lower bound for numeric kinds
    pub min_value: Option<Decimal>,

    /// Inclusive upper bound for numeric kinds
    pub max_value: Option<Decimal>,

    /// Pattern a string must match (takes priority over `format`)
    pub regex: Option<String>,

    /// Named string format
    pub format: Option<StringFormat>,

    /// Strip surrounding whitespace from strings
    pub trim_whitespace: bool,

    /// Accept empty strings
    pub allow_blank: bool,

    /// Accept empty lists
    pub allow_empty: bool,

    /// Decimal: maximum significant digits
    pub max_digits: Option<u32>,

    /// Decimal: maximum digits after the point
    pub decimal_places: Option<u32>,

    /// Decimal: rounding applied at `decimal_places`
    pub rounding: Option<Rounding>,

    /// Decimal: emit strings instead of decimals
    pub coerce_to_string: bool,

    /// Decimal: accept `,` as the separator
    pub localize: bool,

    /// Date/time/datetime: accepted strftime formats (`iso-8601` for ISO)
    pub input_formats: Vec<String>,

    /// Datetime: offset applied to naive inputs
    pub default_timezone: Option<FixedOffset>,

    /// File path format: enumeration options
    pub file_path: FilePathConstraints,

    /// Options for list elements
    pub child: Option<Box<FieldOptions>>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            default: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            regex: None,
            format: None,
            trim_whitespace: true,
            allow_blank: false,
            allow_empty: true,
            max_digits: None,
            decimal_places: None,
            rounding: None,
            coerce_to_string: false,
            localize: false,
            input_formats: Vec::new(),
            default_timezone: None,
            file_path: FilePathConstraints::default(),
            child: None,
        }
    }
}

impl FieldOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Use `None` as the fallback value
    pub fn default_none(mut self) -> Self {
        self.default = Some(Value::Null);
        self
    }

    /// Set the minimum length
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Set the maximum length
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Set the lower bound
    pub fn min_value(mut self, value: impl Into<Decimal>) -> Self {
        self.min_value = Some(value.into());
        self
    }

    /// Set the upper bound
    pub fn max_value(mut self, value: impl Into<Decimal>) -> Self {
        self.max_value = Some(value.into());
        self
    }

    /// Require a regex match
    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// Require a named format
    pub fn format(mut self, format: StringFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Toggle whitespace trimming
    pub fn trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Toggle blank strings
    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    /// Toggle empty lists
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Set decimal precision
    pub fn max_digits(mut self, digits: u32) -> Self {
        self.max_digits = Some(digits);
        self
    }

    /// Set decimal scale
    pub fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = Some(places);
        self
    }

    /// Round to `decimal_places` with this mode
    pub fn rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = Some(rounding);
        self
    }

    /// Emit decimals as strings
    pub fn coerce_to_string(mut self, coerce: bool) -> Self {
        self.coerce_to_string = coerce;
        self
    }

    /// Accept localized decimal input
    pub fn localize(mut self, localize: bool) -> Self {
        self.localize = localize;
        self
    }

    /// Add an accepted input format
    pub fn input_format(mut self, format: impl Into<String>) -> Self {
        self.input_formats.push(format.into());
        self
    }

    /// Set the default timezone for naive datetimes
    pub fn default_timezone(mut self, offset: FixedOffset) -> Self {
        self.default_timezone = Some(offset);
        self
    }

    /// Configure file-path enumeration (also selects the file path format)
    pub fn file_path(mut self, options: FilePathConstraints) -> Self {
        self.format = Some(StringFormat::FilePath);
        self.file_path = options;
        self
    }

    /// Options for list elements
    pub fn child(mut self, child: FieldOptions) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Element options, falling back to empty options
    pub fn child_or_default(&self) -> FieldOptions {
        self.child.as_deref().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FieldOptions::new();
        assert!(options.default.is_none());
        assert!(options.trim_whitespace);
        assert!(!options.allow_blank);
        assert!(options.allow_empty);
        assert!(options.child.is_none());
    }

    #[test]
    fn test_none_default_is_distinct_from_no_default() {
        assert_eq!(FieldOptions::new().default_none().default, Some(Value::Null));
        assert_eq!(FieldOptions::new().default, None);
    }

    #[test]
    fn test_builder_chain() {
        let options = FieldOptions::new()
            .min_value(1)
            .max_value(10)
            .child(FieldOptions::new().max_length(3));
        assert_eq!(options.min_value, Some(Decimal::from(1)));
        assert_eq!(options.child_or_default().max_length, Some(3));
    }

    #[test]
    fn test_file_path_selects_format() {
        let options = FieldOptions::new().file_path(FilePathConstraints::default());
        assert_eq!(options.format, Some(StringFormat::FilePath));
    }
}
