//! Concrete validators
//!
//! A [`Validator`] is one field's checker: its kind (what to coerce to and
//! which constraints apply) plus the required/default/null policy shared by
//! every kind. `run_validation` takes the raw value, where `None` means the
//! value was missing altogether, and returns the coerced value or the
//! collected errors.

use std::str::FromStr;

use chrono::{Offset, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::constraints::{
    DecimalConstraints, ListConstraints, NumericConstraints, Rounding, StringConstraints,
    StringFormat, TemporalConstraints,
};
use crate::context::ValidatorContext;
use crate::errors::{ErrorType, ValidationError, ValidationErrors, ValidationResult};
use crate::formats;
use crate::nested::{NestedKind, NestedType};
use crate::temporal;
use crate::types::Value;

const TRUE_VALUES: &[&str] = &["true", "yes", "on", "1", "y", "t"];
const FALSE_VALUES: &[&str] = &["false", "no", "off", "0", "n", "f"];

const ISO_DATE: &str = "YYYY-MM-DD";
const ISO_TIME: &str = "hh:mm[:ss[.uuuuuu]]";
const ISO_DATETIME: &str = "YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z]";
const DURATION_FORMAT: &str = "[DD] [HH:[MM:]]ss[.uuuuuu]";

// ============================================================================
// Validator Kinds
// ============================================================================

/// What a validator coerces to, with its constraints
#[derive(Debug, Clone)]
pub enum ValidatorKind {
    /// Booleans and their textual forms
    Boolean,
    /// Plain string
    Char(StringConstraints),
    /// String matching a pattern
    Regex(StringConstraints, Regex),
    /// String in a named format (email, slug, url, ip...)
    Format(StringConstraints, StringFormat),
    /// UUID
    Uuid,
    /// One of the paths enumerated at build time
    FilePath(Vec<String>),
    /// Integer
    Integer(NumericConstraints<i64>),
    /// Float
    Float(NumericConstraints<f64>),
    /// Fixed-point decimal
    Decimal(DecimalConstraints),
    /// Calendar date
    Date(TemporalConstraints),
    /// Wall-clock time
    Time(TemporalConstraints),
    /// Timezone-aware datetime
    DateTime(TemporalConstraints),
    /// Duration
    Duration,
    /// One of an ordered set of `(value, display)` choices
    Choice(Vec<(Value, String)>),
    /// List, optionally validating each item
    List {
        child: Option<Box<Validator>>,
        constraints: ListConstraints,
    },
    /// Nested schema or model
    Nested(NestedType),
    /// Untyped: accepts anything unchanged
    PassThrough,
}

// ============================================================================
// Validator
// ============================================================================

/// A field validator
#[derive(Debug, Clone)]
pub struct Validator {
    kind: ValidatorKind,
    required: bool,
    default: Option<Value>,
    allow_null: bool,
}

impl Validator {
    /// Required, non-nullable validator of `kind`
    pub fn new(kind: ValidatorKind) -> Self {
        let required = !matches!(kind, ValidatorKind::PassThrough);
        Self {
            kind,
            required,
            default: None,
            allow_null: false,
        }
    }

    /// Boolean validator
    pub fn boolean() -> Self {
        Self::new(ValidatorKind::Boolean)
    }

    /// Plain string validator
    pub fn char(constraints: StringConstraints) -> Self {
        Self::new(ValidatorKind::Char(constraints))
    }

    /// Integer validator
    pub fn integer(constraints: NumericConstraints<i64>) -> Self {
        Self::new(ValidatorKind::Integer(constraints))
    }

    /// Float validator
    pub fn float(constraints: NumericConstraints<f64>) -> Self {
        Self::new(ValidatorKind::Float(constraints))
    }

    /// Choice validator over `values`, displayed by their string form
    pub fn choice(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(ValidatorKind::Choice(
            values
                .into_iter()
                .map(|v| {
                    let display = v.to_display_string();
                    (v, display)
                })
                .collect(),
        ))
    }

    /// List validator
    pub fn list(child: Option<Validator>, constraints: ListConstraints) -> Self {
        Self::new(ValidatorKind::List {
            child: child.map(Box::new),
            constraints,
        })
    }

    /// Nested schema/model validator
    pub fn nested(nested: NestedType) -> Self {
        Self::new(ValidatorKind::Nested(nested))
    }

    /// Untyped validator
    pub fn pass_through() -> Self {
        Self::new(ValidatorKind::PassThrough).nullable(true)
    }

    /// Fall back to `default` when the value is missing (makes the field optional)
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.required = false;
        self
    }

    /// Accept `null`
    pub fn nullable(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    /// Validator kind
    pub fn kind(&self) -> &ValidatorKind {
        &self.kind
    }

    /// Field-class style kind name
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ValidatorKind::Boolean => "BooleanField",
            ValidatorKind::Char(_) => "CharField",
            ValidatorKind::Regex(..) => "RegexField",
            ValidatorKind::Format(_, format) => match format {
                StringFormat::Email => "EmailField",
                StringFormat::Slug => "SlugField",
                StringFormat::Url => "URLField",
                StringFormat::Ipv4 | StringFormat::Ipv6 | StringFormat::Ip => "IPAddressField",
                StringFormat::Uuid => "UUIDField",
                StringFormat::FilePath => "FilePathField",
            },
            ValidatorKind::Uuid => "UUIDField",
            ValidatorKind::FilePath(_) => "FilePathField",
            ValidatorKind::Integer(_) => "IntegerField",
            ValidatorKind::Float(_) => "FloatField",
            ValidatorKind::Decimal(_) => "DecimalField",
            ValidatorKind::Date(_) => "DateField",
            ValidatorKind::Time(_) => "TimeField",
            ValidatorKind::DateTime(_) => "DateTimeField",
            ValidatorKind::Duration => "DurationField",
            ValidatorKind::Choice(_) => "ChoiceField",
            ValidatorKind::List { .. } => "ListField",
            ValidatorKind::Nested(nested) => match nested.kind() {
                NestedKind::Schema => "Serializer",
                NestedKind::Model => "ModelField",
            },
            ValidatorKind::PassThrough => "Field",
        }
    }

    /// Whether a missing value is an error
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether `null` is accepted
    pub fn allow_null(&self) -> bool {
        self.allow_null
    }

    /// Fallback for missing values
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Ordered `(value, display)` choices (choice and file path kinds)
    pub fn choices(&self) -> Option<Vec<(Value, String)>> {
        match &self.kind {
            ValidatorKind::Choice(choices) => Some(choices.clone()),
            ValidatorKind::FilePath(paths) => Some(
                paths
                    .iter()
                    .map(|p| (Value::String(p.clone()), p.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Element validator (list kind only)
    pub fn child(&self) -> Option<&Validator> {
        match &self.kind {
            ValidatorKind::List { child, .. } => child.as_deref(),
            _ => None,
        }
    }

    /// Validate a raw value; `None` means the value was missing
    pub fn run_validation(
        &self,
        raw: Option<Value>,
        ctx: &ValidatorContext,
    ) -> ValidationResult<Value> {
        let value = match raw {
            Some(value) => value,
            None => {
                return match &self.default {
                    Some(default) => Ok(default.clone()),
                    None if self.required => Err(ValidationError::missing_error().into()),
                    None => Ok(Value::Null),
                }
            }
        };

        if value.is_null() {
            return if self.allow_null {
                Ok(Value::Null)
            } else {
                Err(ValidationError::null_error().into())
            };
        }

        self.to_internal_value(value, ctx)
    }

    fn to_internal_value(&self, value: Value, ctx: &ValidatorContext) -> ValidationResult<Value> {
        match &self.kind {
            ValidatorKind::Boolean => validate_bool(&value),
            ValidatorKind::Char(constraints) => validate_string(&value, constraints),
            ValidatorKind::Regex(constraints, pattern) => {
                validate_string(&value, constraints).and_then(|s| validate_regex(s, pattern))
            }
            ValidatorKind::Format(constraints, format) => {
                validate_string(&value, constraints).and_then(|s| validate_format(s, *format))
            }
            ValidatorKind::Uuid => validate_uuid(&value),
            ValidatorKind::FilePath(paths) => validate_file_path(&value, paths),
            ValidatorKind::Integer(constraints) => validate_int64(&value, constraints),
            ValidatorKind::Float(constraints) => validate_float64(&value, constraints),
            ValidatorKind::Decimal(constraints) => validate_decimal(&value, constraints),
            ValidatorKind::Date(constraints) => validate_date(&value, constraints),
            ValidatorKind::Time(constraints) => validate_time(&value, constraints),
            ValidatorKind::DateTime(constraints) => validate_datetime(&value, constraints),
            ValidatorKind::Duration => validate_duration(&value),
            ValidatorKind::Choice(choices) => validate_choice(&value, choices),
            ValidatorKind::List { child, constraints } => {
                validate_list(value, child.as_deref(), constraints, ctx)
            }
            ValidatorKind::Nested(nested) => validate_nested(&value, nested, ctx),
            ValidatorKind::PassThrough => Ok(value),
        }
    }
}

fn fail<T>(error: ValidationError) -> ValidationResult<T> {
    Err(error.into())
}

// ============================================================================
// Booleans and Strings
// ============================================================================

fn validate_bool(value: &Value) -> ValidationResult<Value> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            if TRUE_VALUES.contains(&lowered.as_str()) {
                Some(true)
            } else if FALSE_VALUES.contains(&lowered.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    };
    match parsed {
        Some(b) => Ok(Value::Bool(b)),
        None => fail(ValidationError::type_error("Must be a valid boolean.")),
    }
}

fn validate_string(value: &Value, constraints: &StringConstraints) -> ValidationResult<Value> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Int(_) | Value::Float(_) | Value::Decimal(_) => value.to_display_string(),
        _ => return fail(ValidationError::type_error("Not a valid string.")),
    };
    let s = if constraints.trim_whitespace {
        s.trim().to_string()
    } else {
        s
    };

    if s.is_empty() {
        return if constraints.allow_blank {
            Ok(Value::String(s))
        } else {
            fail(ValidationError::value_error("This field may not be blank."))
        };
    }

    let mut errors = ValidationErrors::new();
    let len = s.chars().count();
    if let Some(max) = constraints.max_length {
        if len > max {
            errors.add(ValidationError::value_error(format!(
                "Ensure this field has no more than {} characters.",
                max
            )));
        }
    }
    if let Some(min) = constraints.min_length {
        if len < min {
            errors.add(ValidationError::value_error(format!(
                "Ensure this field has at least {} characters.",
                min
            )));
        }
    }
    errors.into_result().map(|_| Value::String(s))
}

fn validate_regex(value: Value, pattern: &Regex) -> ValidationResult<Value> {
    let matched = value
        .as_str()
        .map_or(false, |s| s.is_empty() || pattern.is_match(s));
    if matched {
        Ok(value)
    } else {
        fail(ValidationError::format_error(
            "This value does not match the required pattern.",
        ))
    }
}

fn validate_format(value: Value, format: StringFormat) -> ValidationResult<Value> {
    let s = value.as_str().unwrap_or_default();
    if s.is_empty() {
        return Ok(value);
    }
    let (valid, message) = match format {
        StringFormat::Email => (formats::validate_email(s), "Enter a valid email address."),
        StringFormat::Slug => (
            formats::validate_slug(s),
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
        ),
        StringFormat::Url => (formats::validate_url(s), "Enter a valid URL."),
        StringFormat::Ipv4 => (formats::validate_ipv4(s), "Enter a valid IPv4 address."),
        StringFormat::Ipv6 => (formats::validate_ipv6(s), "Enter a valid IPv6 address."),
        StringFormat::Ip => (formats::validate_ip(s), "Enter a valid IPv4 or IPv6 address."),
        StringFormat::Uuid => return validate_uuid(&value),
        StringFormat::FilePath => (true, ""),
    };
    if valid {
        Ok(value)
    } else {
        fail(ValidationError::format_error(message))
    }
}

fn validate_uuid(value: &Value) -> ValidationResult<Value> {
    let parsed = match value {
        Value::Uuid(u) => Some(*u),
        Value::String(s) => Uuid::parse_str(s.trim()).ok(),
        Value::Int(i) if *i >= 0 => Some(Uuid::from_u128(*i as u128)),
        _ => None,
    };
    match parsed {
        Some(u) => Ok(Value::Uuid(u)),
        None => fail(ValidationError::format_error("Must be a valid UUID.")),
    }
}

fn validate_file_path(value: &Value, paths: &[String]) -> ValidationResult<Value> {
    let input = value.to_display_string();
    if paths.iter().any(|p| *p == input) {
        Ok(Value::String(input))
    } else {
        fail(invalid_choice(&input))
    }
}

// ============================================================================
// Numbers
// ============================================================================

fn validate_int64(value: &Value, constraints: &NumericConstraints<i64>) -> ValidationResult<Value> {
    let parsed = match value {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => float_to_i64(*f),
        Value::Decimal(d) if d.fract().is_zero() => i64::try_from(*d).ok(),
        Value::String(s) => parse_int_str(s.trim()),
        _ => None,
    };
    let Some(n) = parsed else {
        return fail(ValidationError::type_error("A valid integer is required."));
    };
    validate_numeric_constraints(n, constraints)?;
    Ok(Value::Int(n))
}

/// Whole floats inside the `i64` range; `i64::MAX as f64` is 2^63, out of range
fn float_to_i64(f: f64) -> Option<i64> {
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Integers, allowing a zero fractional part (`"3.0"`)
fn parse_int_str(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let (whole, fraction) = s.split_once('.')?;
    if fraction.chars().all(|c| c == '0') {
        whole.parse().ok()
    } else {
        None
    }
}

fn validate_float64(value: &Value, constraints: &NumericConstraints<f64>) -> ValidationResult<Value> {
    let parsed = match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Decimal(d) => f64::try_from(*d).ok(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(n) = parsed.filter(|n| n.is_finite()) else {
        return fail(ValidationError::type_error("A valid number is required."));
    };
    validate_numeric_constraints(n, constraints)?;
    Ok(Value::Float(n))
}

fn validate_numeric_constraints<T>(value: T, constraints: &NumericConstraints<T>) -> ValidationResult<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    let mut errors = ValidationErrors::new();

    if let Some(max) = constraints.maximum {
        if value > max {
            errors.add(ValidationError::value_error(format!(
                "Ensure this value is less than or equal to {}.",
                max
            )));
        }
    }

    if let Some(min) = constraints.minimum {
        if value < min {
            errors.add(ValidationError::value_error(format!(
                "Ensure this value is greater than or equal to {}.",
                min
            )));
        }
    }

    errors.into_result()
}

fn validate_decimal(value: &Value, constraints: &DecimalConstraints) -> ValidationResult<Value> {
    let parsed = match value {
        Value::Decimal(d) => Some(*d),
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::Float(f) => Decimal::from_str(&f.to_string()).ok(),
        Value::String(s) => parse_decimal_str(s.trim(), constraints.localize),
        _ => None,
    };
    let Some(mut d) = parsed else {
        return fail(ValidationError::type_error("A valid number is required."));
    };

    if let (Some(places), Some(rounding)) = (constraints.decimal_places, constraints.rounding) {
        d = d.round_dp_with_strategy(places, rounding.strategy());
    }
    validate_precision(d, constraints)?;

    if let Some(places) = constraints.decimal_places {
        let strategy = constraints.rounding.unwrap_or(Rounding::HalfEven).strategy();
        d = d.round_dp_with_strategy(places, strategy);
        d.rescale(places);
    }
    validate_numeric_constraints(d, &constraints.range)?;

    if constraints.coerce_to_string {
        Ok(Value::String(d.to_string()))
    } else {
        Ok(Value::Decimal(d))
    }
}

fn parse_decimal_str(s: &str, localize: bool) -> Option<Decimal> {
    let s = if localize { s.replace(',', ".") } else { s.to_string() };
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

/// Digit-count checks on the unquantized value
fn validate_precision(d: Decimal, constraints: &DecimalConstraints) -> ValidationResult<()> {
    let digits = d.mantissa().unsigned_abs().to_string().len() as u32;
    let scale = d.scale();
    let (total_digits, whole_digits, decimal_places) = if scale == 0 {
        (digits, digits, 0)
    } else if digits > scale {
        (digits, digits - scale, scale)
    } else {
        (scale, 0, scale)
    };

    if let Some(max_digits) = constraints.max_digits {
        if total_digits > max_digits {
            return fail(ValidationError::value_error(format!(
                "Ensure that there are no more than {} digits in total.",
                max_digits
            )));
        }
    }
    if let Some(max_places) = constraints.decimal_places {
        if decimal_places > max_places {
            return fail(ValidationError::value_error(format!(
                "Ensure that there are no more than {} decimal places.",
                max_places
            )));
        }
    }
    if let (Some(max_digits), Some(max_places)) = (constraints.max_digits, constraints.decimal_places) {
        let max_whole = max_digits.saturating_sub(max_places);
        if whole_digits > max_whole {
            return fail(ValidationError::value_error(format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_whole
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Dates and Times
// ============================================================================

fn validate_date(value: &Value, constraints: &TemporalConstraints) -> ValidationResult<Value> {
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::DateTime(_) => fail(ValidationError::type_error(
            "Expected a date but got a datetime.",
        )),
        Value::String(s) => match temporal::parse_date(s, &constraints.input_formats) {
            Some(d) => Ok(Value::Date(d)),
            None => fail(wrong_format("Date", &constraints.input_formats, ISO_DATE)),
        },
        _ => fail(wrong_format("Date", &constraints.input_formats, ISO_DATE)),
    }
}

fn validate_time(value: &Value, constraints: &TemporalConstraints) -> ValidationResult<Value> {
    match value {
        Value::Time(t) => Ok(Value::Time(*t)),
        Value::String(s) => match temporal::parse_time(s, &constraints.input_formats) {
            Some(t) => Ok(Value::Time(t)),
            None => fail(wrong_format("Time", &constraints.input_formats, ISO_TIME)),
        },
        _ => fail(wrong_format("Time", &constraints.input_formats, ISO_TIME)),
    }
}

fn validate_datetime(value: &Value, constraints: &TemporalConstraints) -> ValidationResult<Value> {
    let tz = constraints.default_timezone.unwrap_or_else(|| Utc.fix());
    match value {
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        Value::Date(_) => fail(ValidationError::type_error(
            "Expected a datetime but got a date.",
        )),
        Value::String(s) => match temporal::parse_datetime(s, &constraints.input_formats, tz) {
            Some(dt) => Ok(Value::DateTime(dt)),
            None => fail(wrong_format("Datetime", &constraints.input_formats, ISO_DATETIME)),
        },
        _ => fail(wrong_format("Datetime", &constraints.input_formats, ISO_DATETIME)),
    }
}

fn validate_duration(value: &Value) -> ValidationResult<Value> {
    let parsed = match value {
        Value::Duration(d) => Some(*d),
        Value::String(_) | Value::Int(_) | Value::Float(_) => {
            temporal::parse_duration(&value.to_display_string())
        }
        _ => None,
    };
    match parsed {
        Some(d) => Ok(Value::Duration(d)),
        None => fail(ValidationError::format_error(format!(
            "Duration has wrong format. Use one of these formats instead: {}.",
            DURATION_FORMAT
        ))),
    }
}

fn wrong_format(label: &str, formats: &[String], iso: &str) -> ValidationError {
    ValidationError::format_error(format!(
        "{} has wrong format. Use one of these formats instead: {}.",
        label,
        temporal::describe_formats(formats, iso)
    ))
}

// ============================================================================
// Choices, Lists and Nested Objects
// ============================================================================

fn invalid_choice(input: &str) -> ValidationError {
    ValidationError::new(
        format!("\"{}\" is not a valid choice.", input),
        ErrorType::InvalidChoice,
    )
}

fn validate_choice(value: &Value, choices: &[(Value, String)]) -> ValidationResult<Value> {
    if let Some((choice, _)) = choices.iter().find(|(choice, _)| choice == value) {
        return Ok(choice.clone());
    }
    let input = value.to_display_string();
    match choices
        .iter()
        .find(|(choice, _)| choice.to_display_string() == input)
    {
        Some((choice, _)) => Ok(choice.clone()),
        None => fail(invalid_choice(&input)),
    }
}

fn validate_list(
    value: Value,
    child: Option<&Validator>,
    constraints: &ListConstraints,
    ctx: &ValidatorContext,
) -> ValidationResult<Value> {
    let items = match value {
        Value::List(items) => items,
        other => {
            return fail(ValidationError::type_error(format!(
                "Expected a list of items but got type \"{}\".",
                other.type_name()
            )))
        }
    };

    if items.is_empty() && !constraints.allow_empty {
        return fail(ValidationError::value_error("This list may not be empty."));
    }

    let mut errors = ValidationErrors::new();
    if let Some(min) = constraints.min_items {
        if items.len() < min {
            errors.add(ValidationError::value_error(format!(
                "Ensure this field has at least {} elements.",
                min
            )));
        }
    }
    if let Some(max) = constraints.max_items {
        if items.len() > max {
            errors.add(ValidationError::value_error(format!(
                "Ensure this field has no more than {} elements.",
                max
            )));
        }
    }

    let Some(child) = child else {
        return errors.into_result().map(|_| Value::List(items));
    };

    let mut validated = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let segment = format!("[{}]", index);
        match child.run_validation(Some(item), &ctx.child(segment.as_str())) {
            Ok(v) => validated.push(v),
            Err(e) => errors.merge(e.nested_under(&segment)),
        }
    }
    errors.into_result().map(|_| Value::List(validated))
}

fn validate_nested(value: &Value, nested: &NestedType, ctx: &ValidatorContext) -> ValidationResult<Value> {
    match value {
        Value::Object(_) => nested.validate(value, ctx),
        Value::List(items) if nested.kind() == NestedKind::Schema => nested.validate_many(items, ctx),
        other => fail(ValidationError::type_error(format!(
            "Invalid data. Expected a dictionary, but got {}.",
            other.type_name()
        ))),
    }
}
