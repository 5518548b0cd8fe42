//! Object construction operators

use super::{expect_array, expect_object, invalid_payload};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::PayloadShape;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Evaluate every property remapper against the context's current value
pub(crate) fn evaluate_properties(
    operator: &str,
    payload: &Value,
    context: &EvaluationContext<'_>,
) -> EvaluationResult<Map<String, Value>> {
    let properties = expect_object(operator, payload)?;
    let mut result = Map::with_capacity(properties.len());
    for (key, remapper) in properties {
        result.insert(key.clone(), context.evaluate(remapper)?);
    }
    Ok(result)
}

/// `object.from`: builds a new object from property remappers
pub struct ObjectFromOperator;

impl RemapperOperator for ObjectFromOperator {
    fn name(&self) -> &str {
        "object.from"
    }
    fn human_friendly_name(&self) -> &str {
        "Object From"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::map(PayloadShape::Remapper));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Create an object whose values are the results of the given remappers, in payload key order."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        evaluate_properties(self.name(), payload, context).map(Value::Object)
    }
}

/// `object.assign`: merges property remappers into the current object
pub struct ObjectAssignOperator;

impl RemapperOperator for ObjectAssignOperator {
    fn name(&self) -> &str {
        "object.assign"
    }
    fn human_friendly_name(&self) -> &str {
        "Object Assign"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::map(PayloadShape::Remapper));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Copy the current object and set the given properties on it. A non-object input starts from an empty object."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let assigned = evaluate_properties(self.name(), payload, context)?;
        let mut result = input.as_object().cloned().unwrap_or_default();
        result.extend(assigned);
        Ok(Value::Object(result))
    }
}

fn omit_path(target: &mut Map<String, Value>, path: &[&str]) {
    match path {
        [] => {}
        [key] => {
            target.shift_remove(*key);
        }
        [key, rest @ ..] => {
            if let Some(Value::Object(child)) = target.get_mut(*key) {
                omit_path(child, rest);
            }
        }
    }
}

/// `object.omit`: removes keys or nested paths from the current object
pub struct ObjectOmitOperator;

impl RemapperOperator for ObjectOmitOperator {
    fn name(&self) -> &str {
        "object.omit"
    }
    fn human_friendly_name(&self) -> &str {
        "Object Omit"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| {
            PayloadShape::list(PayloadShape::OneOf(vec![
                PayloadShape::string(),
                PayloadShape::list(PayloadShape::string()),
            ]))
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Remove keys from the current object. A list entry removes a nested path."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let entries = expect_array(self.name(), payload)?;
        let Some(object) = input.as_object() else {
            return Ok(input.clone());
        };

        let mut result = object.clone();
        for entry in entries {
            match entry {
                Value::String(key) => omit_path(&mut result, &[key.as_str()]),
                Value::Array(segments) => {
                    let path: Option<Vec<&str>> = segments.iter().map(Value::as_str).collect();
                    let path = path.ok_or_else(|| {
                        invalid_payload(self.name(), "nested paths must be lists of strings")
                    })?;
                    omit_path(&mut result, &path);
                }
                _ => return Err(invalid_payload(self.name(), "expected keys or key paths")),
            }
        }
        Ok(Value::Object(result))
    }
}

/// Register the object operators
pub fn register_object_operators(registry: &mut OperatorRegistry) {
    registry.register(ObjectFromOperator);
    registry.register(ObjectAssignOperator);
    registry.register(ObjectOmitOperator);
}
