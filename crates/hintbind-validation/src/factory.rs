//! Validator factory
//!
//! Maps a resolved [`TypeDescriptor`] plus the field's [`FieldOptions`] to a
//! concrete [`Validator`]. Lists recurse on their element descriptor with the
//! child options; descriptors with no matching kind get a pass-through
//! validator.

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use crate::constraints::{
    DecimalConstraints, ListConstraints, NumericConstraints, StringConstraints, StringFormat,
    TemporalConstraints,
};
use crate::formats;
use crate::options::FieldOptions;
use crate::resolver::{BaseKind, TypeDescriptor};
use crate::validators::{Validator, ValidatorKind};

/// Build the validator for `descriptor` configured by `options`
///
/// A configured default makes the validator optional; `allow_null` follows
/// the descriptor's optionality.
///
/// # Example
/// ```
/// use hintbind_validation::factory::build;
/// use hintbind_validation::hint::TypeHint;
/// use hintbind_validation::options::FieldOptions;
/// use hintbind_validation::resolver::resolve;
///
/// let validator = build(&resolve(&TypeHint::parse("Optional[int]")), &FieldOptions::new());
/// assert!(validator.allow_null());
/// assert!(validator.is_required());
/// ```
pub fn build(descriptor: &TypeDescriptor, options: &FieldOptions) -> Validator {
    let kind = build_kind(descriptor, options);
    if matches!(kind, ValidatorKind::PassThrough) {
        return match &options.default {
            Some(default) => Validator::pass_through().with_default(default.clone()),
            None => Validator::pass_through(),
        };
    }

    let validator = Validator::new(kind).nullable(descriptor.is_optional);
    match &options.default {
        Some(default) => validator.with_default(default.clone()),
        None => validator,
    }
}

fn build_kind(descriptor: &TypeDescriptor, options: &FieldOptions) -> ValidatorKind {
    match descriptor.base_kind {
        BaseKind::Bool => ValidatorKind::Boolean,
        BaseKind::String => string_kind(options),
        BaseKind::Integer => ValidatorKind::Integer(NumericConstraints {
            minimum: options.min_value.map(|d| clamp_to_i64(d.ceil())),
            maximum: options.max_value.map(|d| clamp_to_i64(d.floor())),
        }),
        BaseKind::Float => ValidatorKind::Float(NumericConstraints {
            minimum: options.min_value.and_then(|d| d.to_f64()),
            maximum: options.max_value.and_then(|d| d.to_f64()),
        }),
        BaseKind::Decimal => ValidatorKind::Decimal(decimal_constraints(options)),
        BaseKind::Date => ValidatorKind::Date(temporal_constraints(options)),
        BaseKind::Time => ValidatorKind::Time(temporal_constraints(options)),
        BaseKind::DateTime => ValidatorKind::DateTime(temporal_constraints(options)),
        BaseKind::Duration => ValidatorKind::Duration,
        BaseKind::Uuid => ValidatorKind::Uuid,
        BaseKind::Enum => ValidatorKind::Choice(
            descriptor
                .enum_values
                .iter()
                .map(|v| (v.clone(), v.to_display_string()))
                .collect(),
        ),
        BaseKind::List => ValidatorKind::List {
            child: descriptor
                .element
                .as_deref()
                .map(|element| Box::new(build(element, &options.child_or_default()))),
            constraints: ListConstraints {
                min_items: options.min_length,
                max_items: options.max_length,
                allow_empty: options.allow_empty,
            },
        },
        BaseKind::NestedObject => match &descriptor.nested_type {
            Some(nested) => ValidatorKind::Nested(nested.clone()),
            None => ValidatorKind::PassThrough,
        },
        BaseKind::Unknown => ValidatorKind::PassThrough,
    }
}

/// Integer bound, saturating at the `i64` limits
fn clamp_to_i64(bound: Decimal) -> i64 {
    bound.to_i64().unwrap_or(if bound.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn string_kind(options: &FieldOptions) -> ValidatorKind {
    let constraints = StringConstraints {
        min_length: options.min_length,
        max_length: options.max_length,
        trim_whitespace: options.trim_whitespace,
        allow_blank: options.allow_blank,
    };

    if let Some(pattern) = &options.regex {
        match Regex::new(pattern) {
            Ok(re) => return ValidatorKind::Regex(constraints, re),
            Err(e) => warn!(pattern = %pattern, error = %e, "Invalid regex option, validating as plain string"),
        }
    }

    match options.format {
        Some(StringFormat::Uuid) => ValidatorKind::Uuid,
        Some(StringFormat::FilePath) => {
            ValidatorKind::FilePath(formats::file_path_choices(&options.file_path))
        }
        Some(format) => ValidatorKind::Format(constraints, format),
        None => ValidatorKind::Char(constraints),
    }
}

fn decimal_constraints(options: &FieldOptions) -> DecimalConstraints {
    DecimalConstraints {
        range: NumericConstraints::<Decimal> {
            minimum: options.min_value,
            maximum: options.max_value,
        },
        max_digits: options.max_digits,
        decimal_places: options.decimal_places,
        rounding: options.rounding,
        coerce_to_string: options.coerce_to_string,
        localize: options.localize,
    }
}

fn temporal_constraints(options: &FieldOptions) -> TemporalConstraints {
    TemporalConstraints {
        input_formats: options.input_formats.clone(),
        default_timezone: options.default_timezone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidatorContext;
    use crate::hint::TypeHint;
    use crate::resolver::resolve;
    use crate::types::Value;

    fn build_hint(text: &str, options: FieldOptions) -> Validator {
        build(&resolve(&TypeHint::parse(text)), &options)
    }

    fn run(validator: &Validator, raw: Value) -> Result<Value, Vec<String>> {
        validator
            .run_validation(Some(raw), &ValidatorContext::new())
            .map_err(|e| e.messages().into_iter().map(String::from).collect())
    }

    #[test]
    fn test_kind_mapping() {
        let cases = [
            ("bool", "BooleanField"),
            ("str", "CharField"),
            ("int", "IntegerField"),
            ("float", "FloatField"),
            ("Decimal", "DecimalField"),
            ("date", "DateField"),
            ("time", "TimeField"),
            ("datetime", "DateTimeField"),
            ("timedelta", "DurationField"),
            ("UUID", "UUIDField"),
            ("Literal['a']", "ChoiceField"),
            ("List[int]", "ListField"),
            ("Any", "Field"),
        ];
        for (hint, kind) in cases {
            assert_eq!(build_hint(hint, FieldOptions::new()).kind_name(), kind, "{}", hint);
        }
    }

    #[test]
    fn test_regex_wins_over_format() {
        let v = build_hint(
            "str",
            FieldOptions::new().regex("^a+$").format(StringFormat::Email),
        );
        assert_eq!(v.kind_name(), "RegexField");
    }

    #[test]
    fn test_string_formats() {
        let v = build_hint("str", FieldOptions::new().format(StringFormat::Email));
        assert_eq!(v.kind_name(), "EmailField");
        assert!(run(&v, Value::str("robert@hotmail.com")).is_ok());

        let v = build_hint("str", FieldOptions::new().format(StringFormat::Uuid));
        assert_eq!(v.kind_name(), "UUIDField");
    }

    #[test]
    fn test_integer_bounds_from_options() {
        let v = build_hint("int", FieldOptions::new().min_value(1).max_value(10));
        assert!(run(&v, Value::Int(10)).is_ok());
        assert_eq!(
            run(&v, Value::Int(11)).unwrap_err(),
            vec!["Ensure this value is less than or equal to 10."]
        );
    }

    #[test]
    fn test_out_of_range_integer_bounds_saturate() {
        let v = build_hint("int", FieldOptions::new().min_value(u64::MAX));
        assert_eq!(
            run(&v, Value::Int(5)).unwrap_err(),
            vec!["Ensure this value is greater than or equal to 9223372036854775807."]
        );

        let v = build_hint("int", FieldOptions::new().max_value(-Decimal::from(u64::MAX)));
        assert_eq!(
            run(&v, Value::Int(5)).unwrap_err(),
            vec!["Ensure this value is less than or equal to -9223372036854775808."]
        );
    }

    #[test]
    fn test_default_makes_optional() {
        let v = build_hint("int", FieldOptions::new().default_value(5i64));
        assert!(!v.is_required());
        assert_eq!(
            v.run_validation(None, &ValidatorContext::new()).unwrap(),
            Value::Int(5)
        );

        let v = build_hint("int", FieldOptions::new());
        assert!(v.is_required());
    }

    #[test]
    fn test_allow_null_follows_optionality() {
        assert!(build_hint("Optional[str]", FieldOptions::new()).allow_null());
        assert!(!build_hint("str", FieldOptions::new()).allow_null());
    }

    #[test]
    fn test_optional_literal() {
        let v = build_hint(r#"Optional[Literal["cat", "dog"]]"#, FieldOptions::new());
        assert!(v.allow_null());
        assert_eq!(run(&v, Value::Null).unwrap(), Value::Null);
        assert_eq!(run(&v, Value::str("cat")).unwrap(), Value::str("cat"));
        let keys: Vec<Value> = v.choices().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Value::str("cat"), Value::str("dog")]);
    }

    #[test]
    fn test_list_child_options() {
        let v = build_hint(
            "List[str]",
            FieldOptions::new()
                .max_length(2)
                .child(FieldOptions::new().max_length(3)),
        );
        assert!(run(&v, Value::from(vec!["abc"])).is_ok());
        assert_eq!(
            run(&v, Value::from(vec!["abcd"])).unwrap_err(),
            vec!["Ensure this field has no more than 3 characters."]
        );
        assert_eq!(
            run(&v, Value::from(vec!["a", "b", "c"])).unwrap_err(),
            vec!["Ensure this field has no more than 2 elements."]
        );
    }

    #[test]
    fn test_list_of_optional_items() {
        let v = build_hint("List[Optional[int]]", FieldOptions::new());
        assert!(!v.allow_null());
        assert!(v.child().unwrap().allow_null());
        assert_eq!(
            run(&v, Value::List(vec![Value::Int(1), Value::Null])).unwrap(),
            Value::List(vec![Value::Int(1), Value::Null])
        );
    }

    #[test]
    fn test_unknown_is_pass_through() {
        let v = build_hint("Union[int, str]", FieldOptions::new());
        assert_eq!(v.kind_name(), "Field");
        assert!(!v.is_required());
        assert_eq!(run(&v, Value::str("anything")).unwrap(), Value::str("anything"));
    }
}
