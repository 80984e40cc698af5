//! Basic Validation Example
//!
//! Resolves a handful of textual hints, builds their validators and runs
//! them on raw input, then synthesizes a schema type from annotations.
//!
//! Run with:
//! ```bash
//! cargo run -p hintbind-validation --example basic_validation
//! ```

use hintbind_validation::{
    build, resolve, FieldOptions, Schema, StringFormat, TypeHint, ValidationResult, Value,
    ValidatorContext,
};

fn result_str(result: &ValidationResult<Value>) -> String {
    match result {
        Ok(value) => format!("ok -> {}", value.to_display_string()),
        Err(errors) => format!("error -> {:?}", errors.messages()),
    }
}

// ============================================================================
// Hint Resolution
// ============================================================================

fn resolve_hints() {
    println!("1. Hint Resolution");
    println!("------------------");

    for text in [
        "int",
        "Optional[str]",
        "List[Optional[int]]",
        "Literal['cat', 'dog']",
        "Union[int, str]",
    ] {
        let descriptor = resolve(&TypeHint::parse(text));
        println!(
            "  {:<24} kind={:<8} optional={}",
            text,
            descriptor.base_kind.as_str(),
            descriptor.is_optional
        );
    }
    println!();
}

// ============================================================================
// Coercion
// ============================================================================

fn coerce_values() {
    println!("2. Coercion");
    println!("-----------");

    let ctx = ValidatorContext::new();
    let cases: [(&str, FieldOptions, Value); 6] = [
        ("int", FieldOptions::new().min_value(0).max_value(150), Value::str("42")),
        ("int", FieldOptions::new().min_value(0).max_value(150), Value::str("151")),
        ("bool", FieldOptions::new(), Value::str("yes")),
        ("str", FieldOptions::new().format(StringFormat::Email), Value::str("user@")),
        ("UUID", FieldOptions::new(), Value::str("550e8400-e29b-41d4-a716-446655440000")),
        ("List[int]", FieldOptions::new(), Value::from(vec!["1", "2", "x"])),
    ];

    for (hint, options, raw) in cases {
        let validator = build(&resolve(&TypeHint::parse(hint)), &options);
        let shown = raw.to_display_string();
        let result = validator.run_validation(Some(raw), &ctx);
        println!("  {:<10} {:<40} {}", hint, shown, result_str(&result));
    }
    println!();
}

// ============================================================================
// Schema Types
// ============================================================================

fn synthesize_schema() {
    println!("3. Schema Types");
    println!("---------------");

    let user = Schema::builder("User")
        .annotate("name", TypeHint::Str)
        .annotate_with_options(
            "email",
            TypeHint::Str,
            FieldOptions::new().format(StringFormat::Email),
        )
        .annotate_with_default("age", TypeHint::optional(TypeHint::Int), Value::Null)
        .build();

    for field in user.fields() {
        println!("  {:<6} {}", field.name, field.validator.kind_name());
    }

    let mut instance = user.instance(Value::object([
        ("name", Value::str("Alice")),
        ("email", Value::str("alice@example.com")),
    ]));
    println!("  valid: {}", instance.is_valid());
    if let Ok(data) = instance.as_dict() {
        println!("  data:  {}", data.to_display_string());
    }

    let mut invalid = user.instance(Value::object([("email", Value::str("nope"))]));
    println!("  valid: {}", invalid.is_valid());
    println!("  errors: {}", invalid.errors().to_detail());
    println!();
}

fn main() {
    println!("=== hintbind-validation: Basic Validation ===\n");
    resolve_hints();
    coerce_values();
    synthesize_schema();
}
