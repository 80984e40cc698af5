//! Resolution, factory and schema tests

use hintbind_validation::{
    build, resolve, BaseKind, EnumType, FieldOptions, HintScope, NestedType, Schema, SchemaRegistry,
    TypeHint, Value, ValidatorContext,
};
use serde::{Deserialize, Serialize};

fn run(hint: &TypeHint, raw: Option<Value>) -> Result<Value, Vec<String>> {
    build(&resolve(hint), &FieldOptions::new())
        .run_validation(raw, &ValidatorContext::new())
        .map_err(|e| e.messages().into_iter().map(String::from).collect())
}

fn all_scalar_hints() -> Vec<TypeHint> {
    vec![
        TypeHint::Bool,
        TypeHint::Str,
        TypeHint::Int,
        TypeHint::Float,
        TypeHint::Decimal,
        TypeHint::Date,
        TypeHint::Time,
        TypeHint::DateTime,
        TypeHint::Duration,
        TypeHint::Uuid,
        TypeHint::list(),
        TypeHint::list_of(TypeHint::Int),
        TypeHint::literal(["a", "b"]),
        TypeHint::Any,
    ]
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_optional_has_same_kind_as_inner() {
    for hint in all_scalar_hints() {
        let plain = resolve(&hint);
        let optional = resolve(&TypeHint::optional(hint.clone()));
        assert!(optional.is_optional, "{:?}", hint);
        assert!(!plain.is_optional, "{:?}", hint);
        assert_eq!(optional.base_kind, plain.base_kind, "{:?}", hint);
        assert_eq!(optional.enum_values, plain.enum_values, "{:?}", hint);
    }
}

#[test]
fn test_resolution_is_idempotent() {
    let scope = HintScope::new().with_enum(EnumType::new("Color", [("RED", 1i64), ("BLUE", 2)]));
    for text in [
        "Optional[List[Optional[int]]]",
        "Literal['x', 'y']",
        "Union[None, datetime.datetime]",
        "Color",
        "Widget",
    ] {
        let hint = TypeHint::parse_in(text, &scope);
        assert_eq!(resolve(&hint), resolve(&hint), "{}", text);
    }
}

#[test]
fn test_enum_values_follow_declaration_order() {
    let status = EnumType::new(
        "Status",
        [("DRAFT", "draft"), ("PUBLISHED", "published"), ("ARCHIVED", "archived")],
    );
    let descriptor = resolve(&TypeHint::Enum(status.clone()));
    assert_eq!(descriptor.base_kind, BaseKind::Enum);
    assert_eq!(descriptor.enum_values, status.values());

    let descriptor = resolve(&TypeHint::parse("Literal[3, 1, 2]"));
    assert_eq!(
        descriptor.enum_values,
        vec![Value::Int(3), Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn test_textual_hints() {
    let d = resolve(&TypeHint::parse("Optional[List[int]]"));
    assert!(d.is_optional);
    assert_eq!(d.base_kind, BaseKind::List);
    assert_eq!(d.element.unwrap().base_kind, BaseKind::Integer);

    let d = resolve(&TypeHint::parse("int | str"));
    assert_eq!(d.base_kind, BaseKind::Unknown);
}

// ============================================================================
// Validators
// ============================================================================

#[test]
fn test_uuid_round_trip() {
    let raw = "de305d54-75b4-431b-adb2-eb6b9e546013";
    let value = run(&TypeHint::Uuid, Some(Value::str(raw))).unwrap();
    assert!(matches!(value, Value::Uuid(_)));
    assert_eq!(value.to_display_string(), raw);
}

#[test]
fn test_valid_values_round_trip() {
    let cases = [
        (TypeHint::Bool, Value::Bool(true)),
        (TypeHint::Str, Value::str("hello")),
        (TypeHint::Int, Value::Int(42)),
        (TypeHint::Float, Value::Float(2.5)),
        (TypeHint::literal(["cat", "dog"]), Value::str("dog")),
        (TypeHint::list_of(TypeHint::Str), Value::from(vec!["a", "b"])),
    ];
    for (hint, value) in cases {
        assert_eq!(run(&hint, Some(value.clone())).unwrap(), value, "{:?}", hint);
    }
}

#[test]
fn test_validated_output_revalidates_unchanged() {
    for (hint, raw) in [
        (TypeHint::Date, "2021-01-01"),
        (TypeHint::Time, "20:19"),
        (TypeHint::DateTime, "2013-01-29T12:34:56.000000Z"),
        (TypeHint::Duration, "3 5555:45"),
        (TypeHint::Decimal, "12.75"),
    ] {
        let first = run(&hint, Some(Value::str(raw))).unwrap();
        let second = run(&hint, Some(first.clone())).unwrap();
        assert_eq!(first, second, "{:?}", hint);
    }
}

#[test]
fn test_optional_literal() {
    let hint = TypeHint::parse(r#"Optional[Literal["cat", "dog"]]"#);
    let validator = build(&resolve(&hint), &FieldOptions::new());
    assert!(validator.allow_null());

    let choices: Vec<Value> = validator
        .choices()
        .unwrap()
        .into_iter()
        .map(|(value, _)| value)
        .collect();
    assert_eq!(choices, vec![Value::str("cat"), Value::str("dog")]);

    assert_eq!(run(&hint, Some(Value::Null)).unwrap(), Value::Null);
    assert_eq!(run(&hint, Some(Value::str("cat"))).unwrap(), Value::str("cat"));
    assert_eq!(
        run(&hint, Some(Value::str("cow"))).unwrap_err(),
        vec!["\"cow\" is not a valid choice."]
    );
}

#[test]
fn test_missing_required_value() {
    assert_eq!(
        run(&TypeHint::Str, None).unwrap_err(),
        vec!["This field is required."]
    );
}

#[test]
fn test_explicit_none_default() {
    let validator = build(
        &resolve(&TypeHint::optional(TypeHint::Str)),
        &FieldOptions::new().default_none(),
    );
    assert!(!validator.is_required());
    assert_eq!(
        validator
            .run_validation(None, &ValidatorContext::new())
            .unwrap(),
        Value::Null
    );
}

// ============================================================================
// Nested Objects
// ============================================================================

#[test]
fn test_nested_schema_attribute_access() {
    let author = Schema::builder("Author").annotate("name", TypeHint::Str).build();

    let mut instance = author.instance(Value::object([("name", Value::str("JK Rowling"))]));
    assert!(instance.get("name").is_err());
    assert!(instance.is_valid());
    assert_eq!(instance.get("name").unwrap(), &Value::str("JK Rowling"));
}

#[test]
fn test_nested_schema_field() {
    let author = Schema::builder("NestedAuthor")
        .annotate("name", TypeHint::Str)
        .build();
    let book = Schema::builder("NestedBook")
        .annotate("title", TypeHint::Str)
        .annotate("author", author.hint())
        .annotate_with_default("co_authors", TypeHint::list_of(author.hint()), Value::List(vec![]))
        .build();

    let mut instance = book.instance(Value::object([
        ("title", Value::str("Philosopher's Stone")),
        ("author", Value::object([("name", Value::str("JK Rowling"))])),
    ]));
    assert!(instance.is_valid());
    let validated_author = instance.get("author").unwrap();
    assert_eq!(validated_author.attr("name").unwrap(), &Value::str("JK Rowling"));

    let mut invalid = book.instance(Value::object([
        ("title", Value::str("x")),
        ("author", Value::object([("name", Value::str("A"))])),
        ("co_authors", Value::List(vec![Value::object([("nick", Value::str("B"))])])),
    ]));
    assert!(!invalid.is_valid());
    assert_eq!(invalid.errors().errors[0].field, "co_authors[0].name");
}

#[test]
fn test_nested_schema_many_payload() {
    let author = Schema::builder("ManyAuthor").annotate("name", TypeHint::Str).build();
    let validator = build(&resolve(&author.hint()), &FieldOptions::new());
    let value = validator
        .run_validation(
            Some(Value::List(vec![
                Value::object([("name", Value::str("A"))]),
                Value::object([("name", Value::str("B"))]),
            ])),
            &ValidatorContext::new(),
        )
        .unwrap();
    assert_eq!(value.as_list().unwrap().len(), 2);
}

#[derive(Debug, Serialize, Deserialize)]
struct Publisher {
    name: String,
    founded: i32,
}

#[test]
fn test_external_model_field() {
    let hint = TypeHint::Nested(NestedType::model::<Publisher>("Publisher"));
    let value = run(
        &hint,
        Some(Value::object([
            ("name", Value::str("Bloomsbury")),
            ("founded", Value::Int(1986)),
        ])),
    )
    .unwrap();
    assert_eq!(value.attr("founded").unwrap(), &Value::Int(1986));

    let errors = build(&resolve(&hint), &FieldOptions::new())
        .run_validation(
            Some(Value::object([("name", Value::str("Bloomsbury"))])),
            &ValidatorContext::new(),
        )
        .unwrap_err();
    assert_eq!(errors.errors[0].field, "founded");
}

#[test]
fn test_registered_schema_is_visible_to_parser() {
    Schema::builder("RegisteredAddress")
        .annotate("city", TypeHint::Str)
        .register();
    assert!(SchemaRegistry::global().get("RegisteredAddress").is_some());

    let d = resolve(&TypeHint::parse("Optional[RegisteredAddress]"));
    assert!(d.is_optional);
    assert_eq!(d.base_kind, BaseKind::NestedObject);
}
