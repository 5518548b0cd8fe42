//! Classification of raw JSON into remapper forms

use serde_json::Value;

/// A single `{ operator: payload }` step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<'a> {
    /// Operator name (the only key of the step object)
    pub name: &'a str,
    /// Operator-specific payload
    pub payload: &'a Value,
}

/// The three forms a remapper can take, plus the malformed object case
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Remapper<'a> {
    /// Evaluates to itself
    Literal(&'a Value),
    /// Steps piped left to right
    Sequence(&'a [Value]),
    /// A single operator application
    Step(Step<'a>),
    /// An object that does not have exactly one key
    MalformedStep {
        /// Number of keys found on the object
        keys: usize,
    },
}

impl<'a> Remapper<'a> {
    /// Classify a JSON value.
    ///
    /// Objects are always steps. Arrays are sequences only when they are
    /// non-empty and every element is an object; any other array is a literal.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => {
                if map.len() != 1 {
                    return Remapper::MalformedStep { keys: map.len() };
                }
                match map.iter().next() {
                    Some((name, payload)) => Remapper::Step(Step { name, payload }),
                    None => Remapper::MalformedStep { keys: 0 },
                }
            }
            Value::Array(items) if is_sequence(items) => Remapper::Sequence(items),
            other => Remapper::Literal(other),
        }
    }
}

/// Whether an array is a sequence of steps
pub fn is_sequence(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}

/// Whether an array mixes step objects with literal values
pub fn is_mixed_sequence(items: &[Value]) -> bool {
    let objects = items.iter().filter(|item| item.is_object()).count();
    objects > 0 && objects < items.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_step() {
        let value = json!({ "prop": "a.b" });
        match Remapper::classify(&value) {
            Remapper::Step(step) => {
                assert_eq!(step.name, "prop");
                assert_eq!(step.payload, &json!("a.b"));
            }
            other => panic!("expected step, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_arrays() {
        let steps = json!([{ "prop": "a" }, { "prop": "b" }]);
        assert!(matches!(Remapper::classify(&steps), Remapper::Sequence(s) if s.len() == 2));

        let literal = json!([1, 2, 3]);
        assert!(matches!(Remapper::classify(&literal), Remapper::Literal(_)));

        let empty = json!([]);
        assert!(matches!(Remapper::classify(&empty), Remapper::Literal(_)));

        let mixed = json!([{ "prop": "a" }, 3]);
        assert!(matches!(Remapper::classify(&mixed), Remapper::Literal(_)));
        assert!(is_mixed_sequence(mixed.as_array().unwrap()));
    }

    #[test]
    fn test_classify_malformed_objects() {
        assert_eq!(
            Remapper::classify(&json!({})),
            Remapper::MalformedStep { keys: 0 }
        );
        assert_eq!(
            Remapper::classify(&json!({ "a": 1, "b": 2 })),
            Remapper::MalformedStep { keys: 2 }
        );
    }
}
