//! Equality and ordering operators

use super::{expect_array, invalid_payload};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::{Numeric, ValueExt};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::PayloadShape;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// `equals`: all operand results are deeply equal
pub struct EqualsOperator;

impl RemapperOperator for EqualsOperator {
    fn name(&self) -> &str {
        "equals"
    }
    fn human_friendly_name(&self) -> &str {
        "Equals"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::list(PayloadShape::Remapper));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "True when every remapper result is deeply equal to the first. Numbers compare by value."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let operands = expect_array(self.name(), payload)?;
        let Some((first, rest)) = operands.split_first() else {
            return Ok(Value::Bool(true));
        };
        let first = context.evaluate(first)?;
        for operand in rest {
            if !context.evaluate(operand)?.deep_eq(&first) {
                return Ok(Value::Bool(false));
            }
        }
        Ok(Value::Bool(true))
    }
}

/// Compare numbers with numbers and strings with strings
pub(crate) fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => {
            Numeric::from_value(left)?.numeric_cmp(&Numeric::from_value(right)?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Ordering comparison between two remapper results
pub struct OrderingOperator {
    name: &'static str,
    human_friendly_name: &'static str,
    accepts: fn(Ordering) -> bool,
}

impl OrderingOperator {
    /// `gt`
    pub const GT: Self = Self {
        name: "gt",
        human_friendly_name: "Greater Than",
        accepts: Ordering::is_gt,
    };

    /// `gte`
    pub const GTE: Self = Self {
        name: "gte",
        human_friendly_name: "Greater Than Or Equal",
        accepts: Ordering::is_ge,
    };

    /// `lt`
    pub const LT: Self = Self {
        name: "lt",
        human_friendly_name: "Less Than",
        accepts: Ordering::is_lt,
    };

    /// `lte`
    pub const LTE: Self = Self {
        name: "lte",
        human_friendly_name: "Less Than Or Equal",
        accepts: Ordering::is_le,
    };
}

impl RemapperOperator for OrderingOperator {
    fn name(&self) -> &str {
        self.name
    }
    fn human_friendly_name(&self) -> &str {
        self.human_friendly_name
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| {
            PayloadShape::tuple(vec![PayloadShape::Remapper, PayloadShape::Remapper])
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Compare two numbers or two strings. Any other combination is false."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let [left, right] = expect_array(self.name, payload)? else {
            return Err(invalid_payload(self.name, "expected exactly two operands"));
        };
        let left = context.evaluate(left)?;
        let right = context.evaluate(right)?;
        Ok(Value::Bool(compare(&left, &right).is_some_and(self.accepts)))
    }
}

/// Register the comparison operators
pub fn register_comparison_operators(registry: &mut OperatorRegistry) {
    registry.register(EqualsOperator);
    registry.register(OrderingOperator::GT);
    registry.register(OrderingOperator::GTE);
    registry.register(OrderingOperator::LT);
    registry.register(OrderingOperator::LTE);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{remap, try_remap};
    use super::*;
    use crate::evaluator::EvaluationError;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!([1, 1.0]), true)]
    #[case(json!([{ "prop": "a" }, { "prop": "b" }]), true)]
    #[case(json!([{ "prop": "a" }, { "prop": "c" }]), false)]
    #[case(json!(["1", 1]), false)]
    #[case(json!([]), true)]
    fn test_equals(#[case] operands: Value, #[case] expected: bool) {
        let input = json!({ "a": { "x": [1] }, "b": { "x": [1.0] }, "c": { "x": [2] } });
        assert_eq!(remap(json!({ "equals": operands }), input), json!(expected));
    }

    #[rstest]
    #[case("gt", json!(2), json!(1), true)]
    #[case("gt", json!(1), json!(1), false)]
    #[case("gte", json!(1), json!(1.0), true)]
    #[case("lt", json!("a"), json!("b"), true)]
    #[case("lte", json!("b"), json!("a"), false)]
    #[case("lt", json!(1), json!("2"), false)]
    #[case("gt", json!(null), json!(0), false)]
    fn test_ordering(#[case] operator: &str, #[case] left: Value, #[case] right: Value, #[case] expected: bool) {
        assert_eq!(remap(json!({ operator: [left, right] }), json!(null)), json!(expected));
    }

    #[test]
    fn test_ordering_arity() {
        assert!(matches!(
            try_remap(json!({ "gt": [1] }), json!(null)),
            Err(EvaluationError::InvalidPayload { .. })
        ));
    }
}
