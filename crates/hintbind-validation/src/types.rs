//! Core value type
//!
//! `Value` is the dynamic value that flows through extraction and validation.
//! Raw inputs arrive as strings, JSON payloads or attribute maps; validated
//! outputs carry the coerced scalar types (decimal, dates, UUIDs...).

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::AttributeError;

// ============================================================================
// Value Enum - Runtime values to be validated
// ============================================================================

/// Runtime value that can be validated
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// Fixed-point decimal
    Decimal(Decimal),
    /// Calendar date
    Date(NaiveDate),
    /// Wall-clock time
    Time(NaiveTime),
    /// Timezone-aware datetime
    DateTime(DateTime<FixedOffset>),
    /// Elapsed duration
    Duration(Duration),
    /// UUID
    Uuid(Uuid),
    /// List/Array of values
    List(Vec<Value>),
    /// Object/Dictionary (key-value pairs, insertion ordered)
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "str",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::Duration(_) => "timedelta",
            Self::Uuid(_) => "uuid",
            Self::List(_) => "list",
            Self::Object(_) => "dict",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Shorthand for `Value::String`
    pub fn str(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Build an object from `(key, value)` pairs
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a key on an object value
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Walk a dotted key path (`"author.address.city"`) through nested objects
    ///
    /// Only objects are traversed; list indices are not keys.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |current, segment| current.get(segment))
    }

    /// Attribute-style access on validated nested data
    pub fn attr(&self, name: &str) -> Result<&Value, AttributeError> {
        self.get(name)
            .ok_or_else(|| AttributeError::NoSuchField(name.to_string()))
    }

    /// Borrow the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list payload
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Textual form used for choice matching and display
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::Decimal(d) => d.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            Self::DateTime(dt) => dt.to_rfc3339(),
            Self::Duration(d) => crate::temporal::format_duration(*d),
            Self::Uuid(u) => u.hyphenated().to_string(),
            Self::List(_) | Self::Object(_) => serde_json::Value::from(self.clone()).to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
            other => serde_json::Value::String(other.to_display_string()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Int(42).type_name(), "int");
        assert_eq!(Value::Float(3.5).type_name(), "float");
        assert_eq!(Value::str("test").type_name(), "str");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Object(vec![]).type_name(), "dict");
    }

    #[test]
    fn test_value_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(false).is_null());
        assert!(!Value::Int(0).is_null());
    }

    #[test]
    fn test_get_path_walks_objects() {
        let payload = Value::object([(
            "author",
            Value::object([("name", Value::str("JK Rowling"))]),
        )]);

        assert_eq!(payload.get_path("author.name"), Some(&Value::str("JK Rowling")));
        assert_eq!(payload.get_path("author.missing"), None);
        assert_eq!(payload.get_path("author.name.first"), None);
    }

    #[test]
    fn test_get_path_does_not_index_lists() {
        let payload = Value::object([("items", Value::from(vec![1i64, 2]))]);
        assert_eq!(payload.get_path("items.0"), None);
    }

    #[test]
    fn test_attr_missing_field() {
        let payload = Value::object([("name", Value::str("x"))]);
        assert!(payload.attr("name").is_ok());
        assert_eq!(
            payload.attr("age"),
            Err(AttributeError::NoSuchField("age".to_string()))
        );
    }

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let json = serde_json::json!({"a": [1, 2.5, "x", null, true]});
        let value = Value::from(json.clone());
        assert_eq!(serde_json::Value::from(value), json);
    }

    #[test]
    fn test_typed_values_render_as_strings() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(
            serde_json::Value::from(Value::Date(date)),
            serde_json::json!("2021-01-01")
        );
        let id = Uuid::parse_str("de305d54-75b4-431b-adb2-eb6b9e546013").unwrap();
        assert_eq!(
            Value::Uuid(id).to_display_string(),
            "de305d54-75b4-431b-adb2-eb6b9e546013"
        );
    }
}
