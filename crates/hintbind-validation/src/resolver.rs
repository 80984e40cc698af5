//! Type hint resolution
//!
//! `resolve` normalizes a [`TypeHint`] into a [`TypeDescriptor`]: whether the
//! hint is optional, which base kind it names, the allowed values of enums
//! and literals, the element descriptor of lists and the handle of nested
//! types. Resolution is pure and never fails; hints it cannot classify
//! resolve to [`BaseKind::Unknown`].

use crate::hint::TypeHint;
use crate::nested::NestedType;
use crate::types::Value;

/// Kind a hint resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Bool,
    String,
    Integer,
    Float,
    Decimal,
    Date,
    Time,
    DateTime,
    Duration,
    Uuid,
    Enum,
    List,
    NestedObject,
    Unknown,
}

impl BaseKind {
    /// Lowercase kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
            Self::Uuid => "uuid",
            Self::Enum => "enum",
            Self::List => "list",
            Self::NestedObject => "nested_object",
            Self::Unknown => "unknown",
        }
    }
}

/// Normalized classification of a hint
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Hint was a two-member union with the null type
    pub is_optional: bool,
    /// Classified kind of the (unwrapped) hint
    pub base_kind: BaseKind,
    /// Allowed values, in declaration order (enum kind only)
    pub enum_values: Vec<Value>,
    /// Element descriptor (list kind only; `None` for untyped lists)
    pub element: Option<Box<TypeDescriptor>>,
    /// Nested type handle (nested_object kind only)
    pub nested_type: Option<NestedType>,
}

/// Structural view of a descriptor
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// Scalar or enum kind (including unknown)
    Scalar(BaseKind),
    /// List, with its element descriptor when typed
    List(Option<&'a TypeDescriptor>),
    /// Schema or model
    Nested(&'a NestedType),
}

impl TypeDescriptor {
    /// Descriptor of a plain scalar kind
    pub fn scalar(base_kind: BaseKind) -> Self {
        Self {
            is_optional: false,
            base_kind,
            enum_values: Vec::new(),
            element: None,
            nested_type: None,
        }
    }

    /// Descriptor of an enumeration over `values`
    pub fn enumeration(values: Vec<Value>) -> Self {
        Self {
            enum_values: values,
            ..Self::scalar(BaseKind::Enum)
        }
    }

    /// Descriptor of a list
    pub fn list(element: Option<TypeDescriptor>) -> Self {
        Self {
            element: element.map(Box::new),
            ..Self::scalar(BaseKind::List)
        }
    }

    /// Descriptor of a nested type
    pub fn nested(nested: NestedType) -> Self {
        Self {
            nested_type: Some(nested),
            ..Self::scalar(BaseKind::NestedObject)
        }
    }

    /// Mark optional
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Structural view
    pub fn shape(&self) -> Shape<'_> {
        match (self.base_kind, &self.nested_type) {
            (BaseKind::List, _) => Shape::List(self.element.as_deref()),
            (BaseKind::NestedObject, Some(nested)) => Shape::Nested(nested),
            (kind, _) => Shape::Scalar(kind),
        }
    }

    /// True for list kinds
    pub fn is_list(&self) -> bool {
        self.base_kind == BaseKind::List
    }

    /// True for nested object kinds
    pub fn is_nested(&self) -> bool {
        self.nested_type.is_some()
    }
}

/// Resolve a hint into its descriptor
///
/// # Example
/// ```
/// use hintbind_validation::hint::TypeHint;
/// use hintbind_validation::resolver::{resolve, BaseKind};
///
/// let descriptor = resolve(&TypeHint::parse("Optional[int]"));
/// assert!(descriptor.is_optional);
/// assert_eq!(descriptor.base_kind, BaseKind::Integer);
/// ```
pub fn resolve(hint: &TypeHint) -> TypeDescriptor {
    match strip_optional(hint) {
        Some(inner) => classify(inner).optional(),
        None => classify(hint),
    }
}

/// The non-null member of an optional hint
fn strip_optional(hint: &TypeHint) -> Option<&TypeHint> {
    match hint {
        TypeHint::Optional(inner) => Some(inner),
        TypeHint::Union(members) if members.len() == 2 => match (&members[0], &members[1]) {
            (TypeHint::NoneType, TypeHint::NoneType) => None,
            (TypeHint::NoneType, other) | (other, TypeHint::NoneType) => Some(other),
            _ => None,
        },
        _ => None,
    }
}

fn classify(hint: &TypeHint) -> TypeDescriptor {
    match hint {
        TypeHint::Bool => TypeDescriptor::scalar(BaseKind::Bool),
        TypeHint::Str => TypeDescriptor::scalar(BaseKind::String),
        TypeHint::Int => TypeDescriptor::scalar(BaseKind::Integer),
        TypeHint::Float => TypeDescriptor::scalar(BaseKind::Float),
        TypeHint::Decimal => TypeDescriptor::scalar(BaseKind::Decimal),
        TypeHint::Date => TypeDescriptor::scalar(BaseKind::Date),
        TypeHint::Time => TypeDescriptor::scalar(BaseKind::Time),
        TypeHint::DateTime => TypeDescriptor::scalar(BaseKind::DateTime),
        TypeHint::Duration => TypeDescriptor::scalar(BaseKind::Duration),
        TypeHint::Uuid => TypeDescriptor::scalar(BaseKind::Uuid),
        TypeHint::Literal(values) => TypeDescriptor::enumeration(values.clone()),
        TypeHint::Enum(enum_type) => TypeDescriptor::enumeration(enum_type.values()),
        TypeHint::List(element) => TypeDescriptor::list(element.as_deref().map(resolve)),
        TypeHint::Nested(nested) => TypeDescriptor::nested(nested.clone()),
        TypeHint::Union(members) if members.len() == 1 => classify(&members[0]),
        TypeHint::Optional(_)
        | TypeHint::Union(_)
        | TypeHint::NoneType
        | TypeHint::Request
        | TypeHint::Dict
        | TypeHint::Any
        | TypeHint::Named(_) => TypeDescriptor::scalar(BaseKind::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hint::EnumType;

    #[test]
    fn test_scalars() {
        assert_eq!(resolve(&TypeHint::Int).base_kind, BaseKind::Integer);
        assert_eq!(resolve(&TypeHint::Uuid).base_kind, BaseKind::Uuid);
        assert!(!resolve(&TypeHint::Str).is_optional);
    }

    #[test]
    fn test_optional_in_either_position() {
        let left = resolve(&TypeHint::Union(vec![TypeHint::NoneType, TypeHint::Date]));
        let right = resolve(&TypeHint::Union(vec![TypeHint::Date, TypeHint::NoneType]));
        assert_eq!(left, right);
        assert!(left.is_optional);
        assert_eq!(left.base_kind, BaseKind::Date);
    }

    #[test]
    fn test_other_unions_are_unknown() {
        let d = resolve(&TypeHint::Union(vec![TypeHint::Int, TypeHint::Str]));
        assert_eq!(d.base_kind, BaseKind::Unknown);
        assert!(!d.is_optional);

        let d = resolve(&TypeHint::Union(vec![
            TypeHint::Int,
            TypeHint::Str,
            TypeHint::NoneType,
        ]));
        assert_eq!(d.base_kind, BaseKind::Unknown);
        assert!(!d.is_optional);
    }

    #[test]
    fn test_only_one_optional_layer_is_stripped() {
        let d = resolve(&TypeHint::optional(TypeHint::optional(TypeHint::Int)));
        assert!(d.is_optional);
        assert_eq!(d.base_kind, BaseKind::Unknown);
    }

    #[test]
    fn test_list_element_keeps_optionality() {
        let d = resolve(&TypeHint::list_of(TypeHint::optional(TypeHint::Int)));
        assert_eq!(d.base_kind, BaseKind::List);
        let element = d.element.as_deref().unwrap();
        assert!(element.is_optional);
        assert_eq!(element.base_kind, BaseKind::Integer);
    }

    #[test]
    fn test_list_of_optional_lists() {
        let d = resolve(&TypeHint::list_of(TypeHint::optional(TypeHint::list_of(
            TypeHint::Str,
        ))));
        let element = d.element.as_deref().unwrap();
        assert!(element.is_optional);
        assert_eq!(element.base_kind, BaseKind::List);
        assert_eq!(
            element.element.as_deref().map(|e| e.base_kind),
            Some(BaseKind::String)
        );
    }

    #[test]
    fn test_untyped_list() {
        let d = resolve(&TypeHint::list());
        assert_eq!(d.base_kind, BaseKind::List);
        assert!(d.element.is_none());
        assert!(matches!(d.shape(), Shape::List(None)));
    }

    #[test]
    fn test_enum_and_literal_values() {
        let color = EnumType::new("Color", [("RED", "red"), ("GREEN", "green")]);
        let d = resolve(&TypeHint::Enum(color));
        assert_eq!(d.enum_values, vec![Value::str("red"), Value::str("green")]);

        let d = resolve(&TypeHint::literal([3i64, 1, 2]));
        assert_eq!(d.enum_values, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_unknown_hints() {
        for hint in [TypeHint::Any, TypeHint::Dict, TypeHint::Request, TypeHint::NoneType] {
            assert_eq!(resolve(&hint).base_kind, BaseKind::Unknown);
        }
        assert_eq!(
            resolve(&TypeHint::Named("Widget".into())).base_kind,
            BaseKind::Unknown
        );
    }
}
