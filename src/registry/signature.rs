//! Payload shapes declared by operators and checked by the validator

use crate::model::ValueKind;
use std::fmt;

/// Declared shape of an operator payload
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape {
    /// Any JSON value, not evaluated
    Any,
    /// A nested remapper
    Remapper,
    /// A literal of the given kind
    Literal(ValueKind),
    /// One of a fixed set of strings
    Keyword(&'static [&'static str]),
    /// `null` or the inner shape
    Optional(Box<PayloadShape>),
    /// Any of the listed shapes
    OneOf(Vec<PayloadShape>),
    /// An array whose elements all match the inner shape
    List(Box<PayloadShape>),
    /// A fixed-length array; the first `required` items must be present
    Tuple {
        /// Item shapes in order
        items: Vec<PayloadShape>,
        /// Number of leading items that must be present
        required: usize,
    },
    /// An object with declared fields only
    Record(Vec<FieldInfo>),
    /// An object with arbitrary keys whose values match the inner shape
    Map(Box<PayloadShape>),
}

/// Field information for record payloads
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Field name
    pub name: &'static str,
    /// Field shape
    pub shape: PayloadShape,
    /// Whether this field may be omitted
    pub optional: bool,
}

impl FieldInfo {
    /// Create a required field
    pub fn required(name: &'static str, shape: PayloadShape) -> Self {
        Self {
            name,
            shape,
            optional: false,
        }
    }

    /// Create an optional field
    pub fn optional(name: &'static str, shape: PayloadShape) -> Self {
        Self {
            name,
            shape,
            optional: true,
        }
    }
}

impl PayloadShape {
    /// String literal
    pub fn string() -> Self {
        PayloadShape::Literal(ValueKind::String)
    }

    /// Integer literal
    pub fn integer() -> Self {
        PayloadShape::Literal(ValueKind::Integer)
    }

    /// Number literal
    pub fn number() -> Self {
        PayloadShape::Literal(ValueKind::Number)
    }

    /// `null` only
    pub fn null() -> Self {
        PayloadShape::Literal(ValueKind::Null)
    }

    /// `null` or `inner`
    pub fn optional(inner: PayloadShape) -> Self {
        PayloadShape::Optional(Box::new(inner))
    }

    /// Array of `inner`
    pub fn list(inner: PayloadShape) -> Self {
        PayloadShape::List(Box::new(inner))
    }

    /// Object of arbitrary keys to `inner`
    pub fn map(inner: PayloadShape) -> Self {
        PayloadShape::Map(Box::new(inner))
    }

    /// Fixed-length array where every item is required
    pub fn tuple(items: Vec<PayloadShape>) -> Self {
        let required = items.len();
        PayloadShape::Tuple { items, required }
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadShape::Any => write!(f, "any value"),
            PayloadShape::Remapper => write!(f, "remapper"),
            PayloadShape::Literal(kind) => write!(f, "{kind}"),
            PayloadShape::Keyword(words) => {
                let quoted: Vec<String> = words.iter().map(|w| format!("\"{w}\"")).collect();
                write!(f, "{}", quoted.join(" | "))
            }
            PayloadShape::Optional(inner) => write!(f, "{inner} or null"),
            PayloadShape::OneOf(shapes) => {
                let names: Vec<String> = shapes.iter().map(ToString::to_string).collect();
                write!(f, "{}", names.join(" or "))
            }
            PayloadShape::List(inner) => write!(f, "array of {inner}"),
            PayloadShape::Tuple { items, required } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                    if i >= *required {
                        write!(f, "?")?;
                    }
                }
                write!(f, "]")
            }
            PayloadShape::Record(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field.name)?;
                    if field.optional {
                        write!(f, "?")?;
                    }
                }
                write!(f, "}}")
            }
            PayloadShape::Map(inner) => write!(f, "object of {inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_display() {
        let shape = PayloadShape::Record(vec![
            FieldInfo::required("condition", PayloadShape::Remapper),
            FieldInfo::optional("else", PayloadShape::Remapper),
        ]);
        assert_eq!(shape.to_string(), "{condition, else?}");

        let tuple = PayloadShape::Tuple {
            items: vec![PayloadShape::integer(), PayloadShape::integer()],
            required: 1,
        };
        assert_eq!(tuple.to_string(), "[integer, integer?]");

        assert_eq!(
            PayloadShape::Keyword(&["lower", "upper"]).to_string(),
            "\"lower\" | \"upper\""
        );
        assert_eq!(
            PayloadShape::optional(PayloadShape::string()).to_string(),
            "string or null"
        );
    }
}
