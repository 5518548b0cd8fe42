//! History operators
//!
//! Every step of a sequence after the first pushes the value it replaces
//! onto the history. Entry 0 is the most recent one.

use super::object::evaluate_properties;
use super::{expect_integer, expect_object, required_field};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::{FieldInfo, PayloadShape};
use serde_json::{Map, Value};
use std::sync::LazyLock;

// Integral indices outside `usize` are out of range like any other.
fn history_index(operator: &str, payload: &Value) -> EvaluationResult<Option<usize>> {
    if let Some(index) = payload.as_u64() {
        return Ok(usize::try_from(index).ok());
    }
    Ok(usize::try_from(expect_integer(operator, payload)?).ok())
}

fn history_entry(context: &EvaluationContext<'_>, index: Option<usize>) -> Value {
    match index.and_then(|index| context.history().get(index)) {
        Some(entry) => entry.clone(),
        None => {
            log::debug!("history entry {index:?} is out of range");
            Value::Null
        }
    }
}

fn indexed_props_shape() -> PayloadShape {
    PayloadShape::Record(vec![
        FieldInfo::required("index", PayloadShape::integer()),
        FieldInfo::required("props", PayloadShape::map(PayloadShape::Remapper)),
    ])
}

/// Evaluate `props` against the history entry named by `index`
fn evaluate_history_props(
    operator: &str,
    payload: &Value,
    context: &EvaluationContext<'_>,
) -> EvaluationResult<Map<String, Value>> {
    let fields = expect_object(operator, payload)?;
    let index = history_index(operator, required_field(operator, fields, "index")?)?;
    let props = required_field(operator, fields, "props")?;
    let entry = history_entry(context, index);
    evaluate_properties(operator, props, &context.with_current(&entry))
}

/// `history`: reads an earlier value of the sequence
pub struct HistoryOperator;

impl RemapperOperator for HistoryOperator {
    fn name(&self) -> &str {
        "history"
    }
    fn human_friendly_name(&self) -> &str {
        "History"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::integer);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Return the Nth most recent previous value; 0 is the input of the previous step. Out of range yields null."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let index = history_index(self.name(), payload)?;
        Ok(history_entry(context, index))
    }
}

/// `from.history`: builds an object from a history entry
pub struct FromHistoryOperator;

impl RemapperOperator for FromHistoryOperator {
    fn name(&self) -> &str {
        "from.history"
    }
    fn human_friendly_name(&self) -> &str {
        "From History"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(indexed_props_shape);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Like object.from, with the property remappers evaluated against a history entry."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        evaluate_history_props(self.name(), payload, context).map(Value::Object)
    }
}

/// `assign.history`: merges properties of a history entry into the current object
pub struct AssignHistoryOperator;

impl RemapperOperator for AssignHistoryOperator {
    fn name(&self) -> &str {
        "assign.history"
    }
    fn human_friendly_name(&self) -> &str {
        "Assign History"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(indexed_props_shape);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Like object.assign, with the property remappers evaluated against a history entry."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let assigned = evaluate_history_props(self.name(), payload, context)?;
        let mut result = input.as_object().cloned().unwrap_or_default();
        result.extend(assigned);
        Ok(Value::Object(result))
    }
}

/// Register the history operators
pub fn register_history_operators(registry: &mut OperatorRegistry) {
    registry.register(HistoryOperator);
    registry.register(FromHistoryOperator);
    registry.register(AssignHistoryOperator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{remap, try_remap};
    use crate::evaluator::{EvaluationConfig, EvaluationError, RemapperEngine};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_history_outside_sequence_is_null() {
        assert_eq!(remap(json!({ "history": 0 }), json!({ "a": 1 })), json!(null));
    }

    #[rstest]
    #[case(json!(-1))]
    #[case(json!(i64::MIN))]
    #[case(json!(u64::MAX))]
    fn test_history_index_out_of_range(#[case] index: serde_json::Value) {
        let remapper = json!([{ "prop": "a" }, { "history": index.clone() }]);
        assert_eq!(remap(remapper, json!({ "a": 1.5 })), json!(null));

        let remapper = json!([
            { "prop": "a" },
            { "from.history": { "index": index, "props": { "x": { "static": 1 } } } }
        ]);
        assert_eq!(remap(remapper, json!({ "a": 1.5 })), json!({ "x": 1 }));
    }

    #[test]
    fn test_history_fractional_index() {
        assert!(matches!(
            try_remap(json!({ "history": 0.5 }), json!(null)),
            Err(EvaluationError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_from_and_assign_history() {
        let input = json!({ "title": "Post", "author": { "name": "Ann" } });
        let remapper = json!([
            { "prop": "author" },
            { "assign.history": { "index": 0, "props": { "title": { "prop": "title" } } } },
            { "from.history": { "index": 1, "props": { "who": { "prop": "author.name" } } } }
        ]);
        assert_eq!(remap(remapper, input), json!({ "who": "Ann" }));

        let remapper = json!([
            { "prop": "author" },
            { "assign.history": { "index": 0, "props": { "title": { "prop": "title" } } } }
        ]);
        assert_eq!(
            remap(remapper, json!({ "title": "Post", "author": { "name": "Ann" } })),
            json!({ "name": "Ann", "title": "Post" })
        );
    }

    #[test]
    fn test_history_limit() {
        let engine = RemapperEngine::standard().with_config(EvaluationConfig::new(64, 1));
        let remapper = json!([
            { "static": 1 },
            { "static": 2 },
            { "static": 3 },
            { "array.from": [{ "history": 0 }, { "history": 1 }] }
        ]);
        assert_eq!(engine.remap(&remapper, &json!(0)).unwrap(), json!([2, null]));
    }
}
