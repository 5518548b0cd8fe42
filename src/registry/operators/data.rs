//! Data access operators

use super::{expect_array, invalid_payload};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::{ValueExt, split_path};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::PayloadShape;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::LazyLock;

fn path_shape() -> PayloadShape {
    let segment = PayloadShape::OneOf(vec![PayloadShape::string(), PayloadShape::integer()]);
    PayloadShape::OneOf(vec![
        PayloadShape::string(),
        PayloadShape::integer(),
        PayloadShape::list(segment),
    ])
}

/// Turn a path payload into lookup segments
fn path_segments<'p>(operator: &str, payload: &'p Value) -> EvaluationResult<Vec<Cow<'p, str>>> {
    match payload {
        Value::String(path) => Ok(split_path(path).into_iter().map(Cow::Borrowed).collect()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Ok(vec![Cow::Owned(n.to_string())]),
        Value::Array(_) => expect_array(operator, payload)?
            .iter()
            .map(|segment| match segment {
                Value::String(s) => Ok(Cow::Borrowed(s.as_str())),
                Value::Number(n) if n.is_u64() || n.is_i64() => Ok(Cow::Owned(n.to_string())),
                other => Err(invalid_payload(
                    operator,
                    format!("path segments must be strings or integers, found {}", other.type_name()),
                )),
            })
            .collect(),
        other => Err(invalid_payload(
            operator,
            format!("expected a path, found {}", other.type_name()),
        )),
    }
}

/// `prop`: null-safe traversal of the current value
pub struct PropOperator;

impl RemapperOperator for PropOperator {
    fn name(&self) -> &str {
        "prop"
    }
    fn human_friendly_name(&self) -> &str {
        "Property"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(path_shape);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Read a dotted path (\"a.b.0\"), a single key or index, or a list of segments from the current value. Missing segments yield null."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let segments = path_segments(self.name(), payload)?;
        Ok(input.lookup(&segments).cloned().unwrap_or(Value::Null))
    }
}

/// `root`: reads the original top-level input
pub struct RootOperator;

impl RemapperOperator for RootOperator {
    fn name(&self) -> &str {
        "root"
    }
    fn human_friendly_name(&self) -> &str {
        "Root"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::optional(path_shape()));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Return the root input, or a path into it."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        if payload.is_null() {
            return Ok(context.root().clone());
        }
        let segments = path_segments(self.name(), payload)?;
        Ok(context.root().lookup(&segments).cloned().unwrap_or(Value::Null))
    }
}

/// `static`: returns its payload without evaluating it
pub struct StaticOperator;

impl RemapperOperator for StaticOperator {
    fn name(&self) -> &str {
        "static"
    }
    fn human_friendly_name(&self) -> &str {
        "Static"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Any);
        &SHAPE
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        Ok(payload.clone())
    }
}

/// Register the data access operators
pub fn register_data_operators(registry: &mut OperatorRegistry) {
    registry.register(PropOperator);
    registry.register(RootOperator);
    registry.register(StaticOperator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{remap, try_remap};
    use crate::evaluator::EvaluationError;
    use serde_json::json;

    #[test]
    fn test_prop_paths() {
        let input = json!({ "a": { "b": 5, "list": [{ "c": 1 }, { "c": 2 }] } });
        assert_eq!(remap(json!({ "prop": "a.b" }), input.clone()), json!(5));
        assert_eq!(remap(json!({ "prop": "a.x" }), input.clone()), json!(null));
        assert_eq!(remap(json!({ "prop": "a.list.1.c" }), input.clone()), json!(2));
        assert_eq!(remap(json!({ "prop": ["a", "list", 0, "c"] }), input.clone()), json!(1));
        assert_eq!(remap(json!({ "prop": "a.b.c" }), input), json!(null));
    }

    #[test]
    fn test_prop_on_array_and_dotted_keys() {
        assert_eq!(remap(json!({ "prop": 1 }), json!(["x", "y"])), json!("y"));
        assert_eq!(
            remap(json!({ "prop": ["a.b"] }), json!({ "a.b": "dotted" })),
            json!("dotted")
        );
        assert_eq!(remap(json!({ "prop": "" }), json!({ "a": 1 })), json!({ "a": 1 }));
    }

    #[test]
    fn test_prop_invalid_payload() {
        let error = try_remap(json!({ "prop": true }), json!({})).unwrap_err();
        assert!(matches!(error, EvaluationError::InvalidPayload { .. }));
    }

    #[test]
    fn test_root_inside_map() {
        let remapper = json!([
            { "prop": "items" },
            { "array.map": { "object.from": {
                "item": { "prop": "name" },
                "owner": { "root": "owner" }
            } } }
        ]);
        let input = json!({ "owner": "Ann", "items": [{ "name": "a" }, { "name": "b" }] });
        assert_eq!(
            remap(remapper, input),
            json!([{ "item": "a", "owner": "Ann" }, { "item": "b", "owner": "Ann" }])
        );
        assert_eq!(remap(json!({ "root": null }), json!([1])), json!([1]));
    }

    #[test]
    fn test_static_is_not_evaluated() {
        let payload = json!({ "prop": "a" });
        assert_eq!(remap(json!({ "static": payload.clone() }), json!({ "a": 1 })), payload);
    }
}
