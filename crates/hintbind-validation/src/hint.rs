//! Type hints
//!
//! `TypeHint` is the explicit form of a field or parameter annotation. Hints
//! are either built directly or parsed from their textual form:
//!
//! ```
//! use hintbind_validation::hint::TypeHint;
//!
//! let hint = TypeHint::parse("Optional[List[int]]");
//! assert_eq!(
//!     hint,
//!     TypeHint::optional(TypeHint::list_of(TypeHint::Int)),
//! );
//! ```
//!
//! Named enumeration and schema types are looked up in a [`HintScope`];
//! names nobody registered parse to `TypeHint::Named` and later resolve to
//! the unknown kind.

use std::collections::HashMap;

use crate::nested::NestedType;
use crate::schema::SchemaRegistry;
use crate::types::Value;

// ============================================================================
// Enumeration Types
// ============================================================================

/// Enumeration type with ordered members
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    name: String,
    members: Vec<(String, Value)>,
}

impl EnumType {
    /// Declare an enumeration from `(member name, member value)` pairs
    pub fn new<N, I, V>(name: impl Into<String>, members: I) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (N, V)>,
    {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in declaration order
    pub fn members(&self) -> &[(String, Value)] {
        &self.members
    }

    /// Member values in declaration order
    pub fn values(&self) -> Vec<Value> {
        self.members.iter().map(|(_, v)| v.clone()).collect()
    }
}

// ============================================================================
// Type Hints
// ============================================================================

/// A field or parameter annotation
#[derive(Debug, Clone, PartialEq)]
pub enum TypeHint {
    /// `bool`
    Bool,
    /// `str`
    Str,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `Decimal`
    Decimal,
    /// `datetime.date`
    Date,
    /// `datetime.time`
    Time,
    /// `datetime.datetime`
    DateTime,
    /// `datetime.timedelta`
    Duration,
    /// `uuid.UUID`
    Uuid,
    /// The null type
    NoneType,
    /// `Optional[X]`, shorthand for `Union[X, None]`
    Optional(Box<TypeHint>),
    /// `Union[A, B, ...]`
    Union(Vec<TypeHint>),
    /// `list` / `List[X]`
    List(Option<Box<TypeHint>>),
    /// `Literal[...]`
    Literal(Vec<Value>),
    /// Enumeration type
    Enum(EnumType),
    /// Schema or model type
    Nested(NestedType),
    /// The request-context type
    Request,
    /// `dict` / `Dict[K, V]`
    Dict,
    /// `Any`
    Any,
    /// A name nothing is registered under
    Named(String),
}

impl TypeHint {
    /// `Optional[hint]`
    pub fn optional(hint: TypeHint) -> Self {
        Self::Optional(Box::new(hint))
    }

    /// `List[hint]`
    pub fn list_of(hint: TypeHint) -> Self {
        Self::List(Some(Box::new(hint)))
    }

    /// Untyped `list`
    pub fn list() -> Self {
        Self::List(None)
    }

    /// `Literal[values...]`
    pub fn literal<V, I>(values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    /// Parse a textual annotation using the global schema registry only
    pub fn parse(text: &str) -> Self {
        Self::parse_in(text, &HintScope::default())
    }

    /// Parse a textual annotation, resolving names through `scope`
    ///
    /// Never fails: malformed text becomes `TypeHint::Named` with the input.
    pub fn parse_in(text: &str, scope: &HintScope) -> Self {
        let mut parser = Parser {
            src: text.as_bytes(),
            text,
            pos: 0,
            scope,
        };
        match parser.parse_union() {
            Some(hint) if parser.at_end() => hint,
            _ => Self::Named(text.trim().to_string()),
        }
    }
}

impl From<NestedType> for TypeHint {
    fn from(nested: NestedType) -> Self {
        Self::Nested(nested)
    }
}

impl From<EnumType> for TypeHint {
    fn from(enum_type: EnumType) -> Self {
        Self::Enum(enum_type)
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Names visible to the hint parser
///
/// Local registrations shadow the process-wide [`SchemaRegistry`].
#[derive(Debug, Clone, Default)]
pub struct HintScope {
    names: HashMap<String, TypeHint>,
}

impl HintScope {
    /// Empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enumeration under its own name
    pub fn with_enum(mut self, enum_type: EnumType) -> Self {
        self.names
            .insert(enum_type.name().to_string(), TypeHint::Enum(enum_type));
        self
    }

    /// Register a schema or model under its own name
    pub fn with_nested(mut self, nested: NestedType) -> Self {
        self.names
            .insert(nested.name().to_string(), TypeHint::Nested(nested));
        self
    }

    /// Register an arbitrary alias
    pub fn with_alias(mut self, name: impl Into<String>, hint: TypeHint) -> Self {
        self.names.insert(name.into(), hint);
        self
    }

    /// Look up a name
    pub fn lookup(&self, name: &str) -> Option<TypeHint> {
        self.names.get(name).cloned().or_else(|| {
            SchemaRegistry::global()
                .get(name)
                .map(|schema| TypeHint::Nested(NestedType::Schema(schema)))
        })
    }
}

// ============================================================================
// Parser
// ============================================================================

enum Arg {
    Hint(TypeHint),
    Literal(Value),
}

struct Parser<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
    scope: &'a HintScope,
}

impl<'a> Parser<'a> {
    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.src.len()
            && (self.src[self.pos].is_ascii_alphanumeric()
                || self.src[self.pos] == b'_'
                || self.src[self.pos] == b'.')
        {
            self.pos += 1;
        }
        (self.pos > start).then(|| &self.text[start..self.pos])
    }

    /// `hint ('|' hint)*`
    fn parse_union(&mut self) -> Option<TypeHint> {
        let mut members = vec![self.parse_hint()?];
        while self.eat(b'|') {
            members.push(self.parse_hint()?);
        }
        Some(match members.len() {
            1 => members.remove(0),
            _ => TypeHint::Union(members),
        })
    }

    /// `name ('[' args ']')?`
    fn parse_hint(&mut self) -> Option<TypeHint> {
        let name = self.ident()?;
        let name = name.strip_prefix("typing.").unwrap_or(name);
        if self.eat(b'[') {
            let args = self.parse_args()?;
            if !self.eat(b']') {
                return None;
            }
            self.generic(name, args)
        } else {
            Some(self.simple(name))
        }
    }

    fn parse_args(&mut self) -> Option<Vec<Arg>> {
        let mut args = vec![self.parse_arg()?];
        while self.eat(b',') {
            args.push(self.parse_arg()?);
        }
        Some(args)
    }

    fn parse_arg(&mut self) -> Option<Arg> {
        match self.peek()? {
            quote @ (b'"' | b'\'') => {
                self.pos += 1;
                let start = self.pos;
                while self.pos < self.src.len() && self.src[self.pos] != quote {
                    self.pos += 1;
                }
                if self.pos >= self.src.len() {
                    return None;
                }
                let literal = self.text[start..self.pos].to_string();
                self.pos += 1;
                Some(Arg::Literal(Value::String(literal)))
            }
            b'-' | b'0'..=b'9' => {
                let start = self.pos;
                self.pos += 1;
                while self.pos < self.src.len()
                    && (self.src[self.pos].is_ascii_digit() || self.src[self.pos] == b'.')
                {
                    self.pos += 1;
                }
                let number = &self.text[start..self.pos];
                number
                    .parse::<i64>()
                    .map(Value::Int)
                    .or_else(|_| number.parse::<f64>().map(Value::Float))
                    .ok()
                    .map(Arg::Literal)
            }
            _ => {
                let checkpoint = self.pos;
                match self.ident() {
                    Some("True") => return Some(Arg::Literal(Value::Bool(true))),
                    Some("False") => return Some(Arg::Literal(Value::Bool(false))),
                    _ => self.pos = checkpoint,
                }
                self.parse_union().map(Arg::Hint)
            }
        }
    }

    fn generic(&self, name: &str, args: Vec<Arg>) -> Option<TypeHint> {
        let hints = || -> Option<Vec<TypeHint>> {
            args.iter()
                .map(|arg| match arg {
                    Arg::Hint(hint) => Some(hint.clone()),
                    Arg::Literal(_) => None,
                })
                .collect()
        };

        match name {
            "Optional" => {
                let mut hints = hints()?;
                (hints.len() == 1).then(|| TypeHint::optional(hints.remove(0)))
            }
            "Union" => {
                let mut hints = hints()?;
                Some(match hints.len() {
                    1 => hints.remove(0),
                    _ => TypeHint::Union(hints),
                })
            }
            "List" | "list" => {
                let mut hints = hints()?;
                (hints.len() == 1).then(|| TypeHint::list_of(hints.remove(0)))
            }
            "Literal" => args
                .iter()
                .map(|arg| match arg {
                    Arg::Literal(value) => Some(value.clone()),
                    Arg::Hint(TypeHint::NoneType) => Some(Value::Null),
                    Arg::Hint(_) => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(TypeHint::Literal),
            "Dict" | "dict" => Some(TypeHint::Dict),
            _ => None,
        }
    }

    fn simple(&self, name: &str) -> TypeHint {
        match name {
            "bool" => TypeHint::Bool,
            "str" => TypeHint::Str,
            "int" => TypeHint::Int,
            "float" => TypeHint::Float,
            "Decimal" | "decimal.Decimal" => TypeHint::Decimal,
            "date" | "datetime.date" => TypeHint::Date,
            "time" | "datetime.time" => TypeHint::Time,
            "datetime" | "datetime.datetime" => TypeHint::DateTime,
            "timedelta" | "datetime.timedelta" => TypeHint::Duration,
            "UUID" | "uuid.UUID" => TypeHint::Uuid,
            "None" | "NoneType" => TypeHint::NoneType,
            "List" | "list" => TypeHint::List(None),
            "Dict" | "dict" => TypeHint::Dict,
            "Any" => TypeHint::Any,
            "Request" | "HttpRequest" => TypeHint::Request,
            other => self
                .scope
                .lookup(other)
                .unwrap_or_else(|| TypeHint::Named(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(TypeHint::parse("int"), TypeHint::Int);
        assert_eq!(TypeHint::parse(" str "), TypeHint::Str);
        assert_eq!(TypeHint::parse("datetime.date"), TypeHint::Date);
        assert_eq!(TypeHint::parse("uuid.UUID"), TypeHint::Uuid);
        assert_eq!(TypeHint::parse("timedelta"), TypeHint::Duration);
        assert_eq!(TypeHint::parse("Decimal"), TypeHint::Decimal);
    }

    #[test]
    fn test_parse_optional_forms() {
        let expected = TypeHint::optional(TypeHint::Int);
        assert_eq!(TypeHint::parse("Optional[int]"), expected);
        assert_eq!(TypeHint::parse("typing.Optional[int]"), expected);
        assert_eq!(
            TypeHint::parse("Union[int, None]"),
            TypeHint::Union(vec![TypeHint::Int, TypeHint::NoneType])
        );
        assert_eq!(
            TypeHint::parse("int | None"),
            TypeHint::Union(vec![TypeHint::Int, TypeHint::NoneType])
        );
    }

    #[test]
    fn test_parse_lists() {
        assert_eq!(TypeHint::parse("list"), TypeHint::list());
        assert_eq!(TypeHint::parse("List[int]"), TypeHint::list_of(TypeHint::Int));
        assert_eq!(
            TypeHint::parse("List[Optional[str]]"),
            TypeHint::list_of(TypeHint::optional(TypeHint::Str))
        );
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(
            TypeHint::parse(r#"Literal["cat", 'dog']"#),
            TypeHint::literal(["cat", "dog"])
        );
        assert_eq!(
            TypeHint::parse("Literal[1, -2, True, None]"),
            TypeHint::Literal(vec![
                Value::Int(1),
                Value::Int(-2),
                Value::Bool(true),
                Value::Null
            ])
        );
    }

    #[test]
    fn test_scope_lookup() {
        let color = EnumType::new("Color", [("RED", "red"), ("BLUE", "blue")]);
        let scope = HintScope::new().with_enum(color.clone());
        assert_eq!(
            TypeHint::parse_in("Optional[Color]", &scope),
            TypeHint::optional(TypeHint::Enum(color))
        );
    }

    #[test]
    fn test_unknown_names_and_garbage() {
        assert_eq!(TypeHint::parse("Widget"), TypeHint::Named("Widget".into()));
        assert_eq!(TypeHint::parse("List[int"), TypeHint::Named("List[int".into()));
        assert_eq!(TypeHint::parse(""), TypeHint::Named(String::new()));
    }

    #[test]
    fn test_enum_values_keep_order() {
        let size = EnumType::new("Size", [("S", 1i64), ("M", 2), ("L", 3)]);
        assert_eq!(size.values(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(size.members()[0].0, "S");
    }
}
