//! Utility operators

use super::{expect_array, expect_integer, expect_keyword, invalid_payload, soft_null};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::{JsonPointer, ValueExt};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::PayloadShape;
use crate::validator::RemapperValidator;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// `type`: JSON type name of the current value
pub struct TypeOperator;

impl RemapperOperator for TypeOperator {
    fn name(&self) -> &str {
        "type"
    }
    fn human_friendly_name(&self) -> &str {
        "Type"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::null);
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        _payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        Ok(Value::String(input.type_name().to_string()))
    }
}

/// `defined`: whether the current value is not null
pub struct DefinedOperator;

impl RemapperOperator for DefinedOperator {
    fn name(&self) -> &str {
        "defined"
    }
    fn human_friendly_name(&self) -> &str {
        "Defined"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::null);
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        _payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        Ok(Value::Bool(!input.is_null()))
    }
}

/// `len`: length of a string, array or object
pub struct LenOperator;

impl RemapperOperator for LenOperator {
    fn name(&self) -> &str {
        "len"
    }
    fn human_friendly_name(&self) -> &str {
        "Length"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::null);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Number of characters of a string, elements of an array or keys of an object. Other values yield null."
    }
    fn evaluate(
        &self,
        input: &Value,
        _payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        Ok(match input {
            Value::String(text) => text.chars().count().into(),
            Value::Array(items) => items.len().into(),
            Value::Object(map) => map.len().into(),
            _ => soft_null(self.name(), "input has no length"),
        })
    }
}

/// Resolve a possibly negative position against `len`, clamped to `0..=len`
fn clamp_position(position: i64, len: usize) -> usize {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if position < 0 {
        len_i.saturating_add(position)
    } else {
        position
    };
    usize::try_from(resolved.clamp(0, len_i)).unwrap_or(len)
}

/// `slice`: a range of characters or elements
pub struct SliceOperator;

impl RemapperOperator for SliceOperator {
    fn name(&self) -> &str {
        "slice"
    }
    fn human_friendly_name(&self) -> &str {
        "Slice"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Tuple {
            items: vec![PayloadShape::integer(), PayloadShape::integer()],
            required: 1,
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Characters of a string or elements of an array from start up to, not including, end. Negative positions count from the end."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let (start, end) = match expect_array(self.name(), payload)? {
            [start] => (expect_integer(self.name(), start)?, None),
            [start, end] => (
                expect_integer(self.name(), start)?,
                Some(expect_integer(self.name(), end)?),
            ),
            _ => return Err(invalid_payload(self.name(), "expected [start, end?]")),
        };
        let range = |len: usize| {
            let from = clamp_position(start, len);
            let to = end.map_or(len, |end| clamp_position(end, len));
            from..to.max(from)
        };

        Ok(match input {
            Value::String(text) => {
                let chars: Vec<char> = text.chars().collect();
                Value::String(chars[range(chars.len())].iter().collect())
            }
            Value::Array(items) => Value::Array(items[range(items.len())].to_vec()),
            _ => soft_null(self.name(), "input is not a string or array"),
        })
    }
}

fn strip_nulls(value: &Value, depth: usize) -> Value {
    if depth == 0 {
        return value.clone();
    }
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v, depth - 1)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| strip_nulls(v, depth - 1)).collect()),
        other => other.clone(),
    }
}

/// `null.strip`: removes null object properties
pub struct NullStripOperator;

impl RemapperOperator for NullStripOperator {
    fn name(&self) -> &str {
        "null.strip"
    }
    fn human_friendly_name(&self) -> &str {
        "Strip Nulls"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::optional(PayloadShape::integer()));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Remove properties whose value is null, recursively or down to the given depth."
    }
    fn validate_shape(&self, payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
        validator.check_shape(self.shape(), payload, path, self.name());
        validator.check_integer_range(Some(payload), 0..=i64::MAX, path, self.name());
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let depth = match payload {
            Value::Null => usize::MAX,
            other => usize::try_from(expect_integer(self.name(), other)?)
                .map_err(|_| invalid_payload(self.name(), "depth must not be negative"))?,
        };
        Ok(strip_nulls(input, depth))
    }
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// `log`: logs the current value and returns it unchanged
pub struct LogOperator;

impl RemapperOperator for LogOperator {
    fn name(&self) -> &str {
        "log"
    }
    fn human_friendly_name(&self) -> &str {
        "Log"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::optional(PayloadShape::Keyword(LOG_LEVELS)));
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let level = match payload {
            Value::Null => log::Level::Info,
            other => match expect_keyword(self.name(), other, LOG_LEVELS)? {
                "error" => log::Level::Error,
                "warn" => log::Level::Warn,
                "debug" => log::Level::Debug,
                "trace" => log::Level::Trace,
                _ => log::Level::Info,
            },
        };
        log::log!(target: "remapper", level, "{input} (depth {})", context.depth());
        Ok(input.clone())
    }
}

/// Register the utility operators
pub fn register_utility_operators(registry: &mut OperatorRegistry) {
    registry.register(TypeOperator);
    registry.register(DefinedOperator);
    registry.register(LenOperator);
    registry.register(SliceOperator);
    registry.register(NullStripOperator);
    registry.register(LogOperator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::remap;
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), "null")]
    #[case(json!(true), "boolean")]
    #[case(json!(1.5), "number")]
    #[case(json!(2), "number")]
    #[case(json!("s"), "string")]
    #[case(json!([]), "array")]
    #[case(json!({}), "object")]
    fn test_type(#[case] input: Value, #[case] expected: &str) {
        assert_eq!(remap(json!({ "type": null }), input), json!(expected));
    }

    #[test]
    fn test_defined_and_len() {
        assert_eq!(remap(json!({ "defined": null }), json!(0)), json!(true));
        assert_eq!(remap(json!({ "defined": null }), json!(null)), json!(false));
        assert_eq!(remap(json!({ "len": null }), json!("héllo")), json!(5));
        assert_eq!(remap(json!({ "len": null }), json!([1, 2])), json!(2));
        assert_eq!(remap(json!({ "len": null }), json!({ "a": 1 })), json!(1));
        assert_eq!(remap(json!({ "len": null }), json!(3)), json!(null));
    }

    #[rstest]
    #[case(json!([1, 3]), json!("héllo"), json!("él"))]
    #[case(json!([-3]), json!("héllo"), json!("llo"))]
    #[case(json!([2, 100]), json!([1, 2, 3]), json!([3]))]
    #[case(json!([2, 1]), json!([1, 2, 3]), json!([]))]
    #[case(json!([0, -1]), json!([1, 2, 3]), json!([1, 2]))]
    #[case(json!([0]), json!(5), json!(null))]
    fn test_slice(#[case] payload: Value, #[case] input: Value, #[case] expected: Value) {
        assert_eq!(remap(json!({ "slice": payload }), input), expected);
    }

    #[test]
    fn test_null_strip() {
        let input = json!({ "a": null, "b": { "c": null, "d": 1 }, "e": [{ "f": null }] });
        assert_eq!(
            remap(json!({ "null.strip": null }), input.clone()),
            json!({ "b": { "d": 1 }, "e": [{}] })
        );
        assert_eq!(
            remap(json!({ "null.strip": 1 }), input),
            json!({ "b": { "c": null, "d": 1 }, "e": [{ "f": null }] })
        );
    }

    #[test]
    fn test_log_passes_through() {
        assert_eq!(remap(json!({ "log": "debug" }), json!({ "a": 1 })), json!({ "a": 1 }));
        assert_eq!(remap(json!({ "log": null }), json!(1)), json!(1));
    }
}
