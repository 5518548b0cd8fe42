//! Helpers on top of `serde_json::Value` shared by the operators

use super::number::Numeric;
use super::types::ValueKind;
use rustc_hash::FxHasher;
use serde_json::Value;
use std::hash::{Hash, Hasher};

/// Extension methods for remapper values
pub trait ValueExt {
    /// Truthiness used by `if`, `match`, `and`, `or`, `not` and the array predicates.
    ///
    /// `null`, `false`, `0`, `""` and `[]` are false; everything else is true.
    fn is_truthy(&self) -> bool;

    /// Name of the JSON type (`null`, `boolean`, `number`, `string`, `array`, `object`)
    fn type_name(&self) -> &'static str;

    /// Text used when a value is interpolated into a string.
    ///
    /// `null` becomes the empty string, strings are inserted as-is and
    /// everything else is rendered as JSON.
    fn to_display_string(&self) -> String;

    /// Structural equality where numbers compare by value (`1 == 1.0`)
    /// and object member order is ignored.
    fn deep_eq(&self, other: &Value) -> bool;

    /// Hash consistent with [`deep_eq`](ValueExt::deep_eq): values that are
    /// deep-equal hash the same.
    fn deep_hash(&self) -> u64;

    /// Null-safe traversal by path segments.
    ///
    /// A segment selects an object member by name or an array element by its
    /// decimal position. Returns `None` as soon as a segment cannot be resolved.
    fn lookup<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value>;
}

impl ValueExt for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(_) => true,
        }
    }

    fn type_name(&self) -> &'static str {
        ValueKind::of(self).json_name()
    }

    fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn deep_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(_), Value::Number(_)) => {
                match (Numeric::from_value(self), Numeric::from_value(other)) {
                    (Some(a), Some(b)) => a.numeric_eq(&b),
                    _ => false,
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.deep_eq(y)))
            }
            (a, b) => a == b,
        }
    }

    fn deep_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hash_value(self, &mut hasher);
        hasher.finish()
    }

    fn lookup<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        let mut node = self;
        for segment in segments {
            let segment = segment.as_ref();
            node = match node {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

/// Split a dotted path (`"a.b.0"`) into its segments. The empty path has no segments.
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// Resolve a dotted path against a value, yielding `null` for anything missing
pub fn resolve_path(value: &Value, path: &str) -> Value {
    value
        .lookup(&split_path(path))
        .cloned()
        .unwrap_or(Value::Null)
}

fn hash_value(value: &Value, state: &mut FxHasher) {
    match value {
        Value::Null => state.write_u8(0),
        Value::Bool(b) => {
            state.write_u8(1);
            b.hash(state);
        }
        Value::Number(n) => {
            state.write_u8(2);
            // Numbers hash by value so that `1` and `1.0` collide; `-0.0` folds into `0.0`.
            let f = n.as_f64().unwrap_or_default();
            state.write_u64(if f == 0.0 { 0 } else { f.to_bits() });
        }
        Value::String(s) => {
            state.write_u8(3);
            s.hash(state);
        }
        Value::Array(items) => {
            state.write_u8(4);
            state.write_usize(items.len());
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            state.write_u8(5);
            state.write_usize(map.len());
            // Member order is ignored, so entries are combined commutatively.
            let members = map.iter().fold(0u64, |acc, (key, member)| {
                let mut entry = FxHasher::default();
                key.hash(&mut entry);
                hash_value(member, &mut entry);
                acc.wrapping_add(entry.finish())
            });
            state.write_u64(members);
        }
    }
}
