//! Primitive JSON kinds used by payload shapes and the `type` operator

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of a JSON value as seen by payload shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// JSON `null`
    Null,
    /// JSON boolean
    Boolean,
    /// Any JSON number
    Number,
    /// JSON number without a fractional part that fits in an `i64`
    Integer,
    /// JSON string
    String,
    /// JSON array
    Array,
    /// JSON object
    Object,
}

impl ValueKind {
    /// Kind of the given value. Numbers report `Integer` when they are
    /// integral and fit in an `i64`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Check if a value is acceptable where this kind is expected
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, ValueKind::of(value)) {
            (ValueKind::Number, ValueKind::Integer) => true,
            (expected, actual) => *expected == actual,
        }
    }

    /// Name reported by the `type` operator (integers are plain numbers there)
    pub fn json_name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number | ValueKind::Integer => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_kind() {
        assert_eq!(ValueKind::of(&json!(3)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(3.5)), ValueKind::Number);
        assert!(ValueKind::Number.accepts(&json!(3)));
        assert!(!ValueKind::Integer.accepts(&json!(3.5)));
    }

    #[test]
    fn test_integer_kind_fits_i64() {
        assert_eq!(ValueKind::of(&json!(i64::MIN)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(i64::MAX)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(u64::MAX)), ValueKind::Number);
        assert!(!ValueKind::Integer.accepts(&json!(u64::MAX)));
    }

    #[test]
    fn test_json_name() {
        assert_eq!(ValueKind::of(&json!(1)).json_name(), "number");
        assert_eq!(ValueKind::of(&json!({})).json_name(), "object");
        assert_eq!(ValueKind::of(&json!(null)).json_name(), "null");
    }
}
