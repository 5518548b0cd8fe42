//! Array operators
//!
//! The iterating operators evaluate their sub-remapper once per element,
//! with the element as the current value and its position readable through
//! the `array` operator. Non-array input is treated as empty.

use super::expect_array;
use crate::evaluator::{EvaluationContext, EvaluationResult, ItemPosition};
use crate::model::ValueExt;
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::PayloadShape;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::LazyLock;

fn items(input: &Value) -> &[Value] {
    input.as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Evaluate `remapper` for each element, in order
fn for_each_item<F>(
    input: &Value,
    remapper: &Value,
    context: &EvaluationContext<'_>,
    mut visit: F,
) -> EvaluationResult<()>
where
    F: FnMut(&Value, Value) -> bool,
{
    let elements = items(input);
    let length = elements.len();
    for (index, element) in elements.iter().enumerate() {
        let result = context.evaluate_item(remapper, element, ItemPosition { index, length })?;
        if !visit(element, result) {
            break;
        }
    }
    Ok(())
}

/// `array.map`: transforms every element
pub struct ArrayMapOperator;

impl RemapperOperator for ArrayMapOperator {
    fn name(&self) -> &str {
        "array.map"
    }
    fn human_friendly_name(&self) -> &str {
        "Array Map"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Remapper);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Evaluate the remapper for every element of the current array. Non-array input yields []."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let mut result = Vec::with_capacity(items(input).len());
        for_each_item(input, payload, context, |_, mapped| {
            result.push(mapped);
            true
        })?;
        Ok(Value::Array(result))
    }
}

/// `array.filter`: keeps elements whose predicate is truthy
pub struct ArrayFilterOperator;

impl RemapperOperator for ArrayFilterOperator {
    fn name(&self) -> &str {
        "array.filter"
    }
    fn human_friendly_name(&self) -> &str {
        "Array Filter"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Remapper);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Keep the elements for which the remapper result is truthy."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let mut result = Vec::new();
        for_each_item(input, payload, context, |element, keep| {
            if keep.is_truthy() {
                result.push(element.clone());
            }
            true
        })?;
        Ok(Value::Array(result))
    }
}

/// `array.find`: first element whose predicate is truthy
pub struct ArrayFindOperator;

impl RemapperOperator for ArrayFindOperator {
    fn name(&self) -> &str {
        "array.find"
    }
    fn human_friendly_name(&self) -> &str {
        "Array Find"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Remapper);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Return the first element for which the remapper result is truthy, or null."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let mut found = Value::Null;
        for_each_item(input, payload, context, |element, matched| {
            if matched.is_truthy() {
                found = element.clone();
                return false;
            }
            true
        })?;
        Ok(found)
    }
}

/// `array.from`: builds an array from remappers
pub struct ArrayFromOperator;

impl RemapperOperator for ArrayFromOperator {
    fn name(&self) -> &str {
        "array.from"
    }
    fn human_friendly_name(&self) -> &str {
        "Array From"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::list(PayloadShape::Remapper));
        &SHAPE
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        expect_array(self.name(), payload)?
            .iter()
            .map(|remapper| context.evaluate(remapper))
            .collect::<EvaluationResult<Vec<_>>>()
            .map(Value::Array)
    }
}

/// `array.append`: appends remapper results to the current array
pub struct ArrayAppendOperator;

impl RemapperOperator for ArrayAppendOperator {
    fn name(&self) -> &str {
        "array.append"
    }
    fn human_friendly_name(&self) -> &str {
        "Array Append"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::list(PayloadShape::Remapper));
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let remappers = expect_array(self.name(), payload)?;
        let mut result = items(input).to_vec();
        result.reserve(remappers.len());
        for remapper in remappers {
            result.push(context.evaluate(remapper)?);
        }
        Ok(Value::Array(result))
    }
}

// Keys bucketed by `deep_hash`; `deep_eq` settles collisions.
#[derive(Default)]
struct SeenValues {
    buckets: FxHashMap<u64, Vec<Value>>,
}

impl SeenValues {
    /// Returns `false` when an equal key was already seen
    fn insert(&mut self, key: Value) -> bool {
        let bucket = self.buckets.entry(key.deep_hash()).or_default();
        if bucket.iter().any(|other| other.deep_eq(&key)) {
            return false;
        }
        bucket.push(key);
        true
    }
}

/// `array.unique`: removes duplicate elements
pub struct ArrayUniqueOperator;

impl RemapperOperator for ArrayUniqueOperator {
    fn name(&self) -> &str {
        "array.unique"
    }
    fn human_friendly_name(&self) -> &str {
        "Array Unique"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Remapper);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Remove duplicates, keeping first occurrences. With a null payload elements are compared whole; otherwise by the remapper result."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let mut seen = SeenValues::default();
        let mut result = Vec::new();

        if payload.is_null() {
            for element in items(input) {
                if seen.insert(element.clone()) {
                    result.push(element.clone());
                }
            }
        } else {
            for_each_item(input, payload, context, |element, key| {
                if seen.insert(key) {
                    result.push(element.clone());
                }
                true
            })?;
        }
        Ok(Value::Array(result))
    }
}

fn flatten_into(items: &[Value], levels: usize, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Array(inner) if levels > 0 => flatten_into(inner, levels - 1, out),
            other => out.push(other.clone()),
        }
    }
}

/// `array.flatten`: flattens nested arrays
pub struct ArrayFlattenOperator;

impl RemapperOperator for ArrayFlattenOperator {
    fn name(&self) -> &str {
        "array.flatten"
    }
    fn human_friendly_name(&self) -> &str {
        "Array Flatten"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::optional(PayloadShape::integer()));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Flatten nested arrays completely, or by the given number of levels."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let levels = match payload {
            Value::Null => usize::MAX,
            other => usize::try_from(super::expect_integer(self.name(), other)?).unwrap_or(0),
        };
        let mut result = Vec::new();
        flatten_into(items(input), levels, &mut result);
        Ok(Value::Array(result))
    }
}

/// Register the array operators
pub fn register_array_operators(registry: &mut OperatorRegistry) {
    registry.register(ArrayMapOperator);
    registry.register(ArrayFilterOperator);
    registry.register(ArrayFindOperator);
    registry.register(ArrayFromOperator);
    registry.register(ArrayAppendOperator);
    registry.register(ArrayUniqueOperator);
    registry.register(ArrayFlattenOperator);
}
