//! Conditional and logical operators

use super::{expect_array, expect_object, invalid_payload, required_field};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::ValueExt;
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::{FieldInfo, PayloadShape};
use serde_json::Value;
use std::sync::LazyLock;

/// `if`: evaluates one of two branches
pub struct IfOperator;

impl RemapperOperator for IfOperator {
    fn name(&self) -> &str {
        "if"
    }
    fn human_friendly_name(&self) -> &str {
        "If"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| {
            PayloadShape::Record(vec![
                FieldInfo::required("condition", PayloadShape::Remapper),
                FieldInfo::required("then", PayloadShape::Remapper),
                FieldInfo::optional("else", PayloadShape::Remapper),
            ])
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Evaluate `then` when the condition is truthy, otherwise `else` (null when absent)."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let fields = expect_object(self.name(), payload)?;
        let condition = context.evaluate(required_field(self.name(), fields, "condition")?)?;
        if condition.is_truthy() {
            context.evaluate(required_field(self.name(), fields, "then")?)
        } else {
            match fields.get("else") {
                Some(branch) => context.evaluate(branch),
                None => Ok(Value::Null),
            }
        }
    }
}

/// `match`: first case whose condition is truthy
pub struct MatchOperator;

impl RemapperOperator for MatchOperator {
    fn name(&self) -> &str {
        "match"
    }
    fn human_friendly_name(&self) -> &str {
        "Match"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| {
            PayloadShape::list(PayloadShape::Record(vec![
                FieldInfo::required("case", PayloadShape::Remapper),
                FieldInfo::required("value", PayloadShape::Remapper),
            ]))
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Evaluate the value of the first case whose condition is truthy, or null when none is."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        for arm in expect_array(self.name(), payload)? {
            let arm = arm
                .as_object()
                .ok_or_else(|| invalid_payload(self.name(), "cases must be objects"))?;
            if context.evaluate(required_field(self.name(), arm, "case")?)?.is_truthy() {
                return context.evaluate(required_field(self.name(), arm, "value")?);
            }
        }
        Ok(Value::Null)
    }
}

/// Short-circuiting `and` / `or`
pub struct JunctionOperator {
    name: &'static str,
    human_friendly_name: &'static str,
    // Result when an operand has this truthiness, and the negation when none does
    short_circuit_on: bool,
}

impl JunctionOperator {
    /// `and`: true when every operand is truthy (empty list: true)
    pub const AND: Self = Self {
        name: "and",
        human_friendly_name: "And",
        short_circuit_on: false,
    };

    /// `or`: true when any operand is truthy (empty list: false)
    pub const OR: Self = Self {
        name: "or",
        human_friendly_name: "Or",
        short_circuit_on: true,
    };
}

impl RemapperOperator for JunctionOperator {
    fn name(&self) -> &str {
        self.name
    }
    fn human_friendly_name(&self) -> &str {
        self.human_friendly_name
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
        for operand in expect_array(self.name, payload)? {
            if context.evaluate(operand)?.is_truthy() == self.short_circuit_on {
                return Ok(Value::Bool(self.short_circuit_on));
            }
        }
        Ok(Value::Bool(!self.short_circuit_on))
    }
}

/// `not`: negated truthiness
pub struct NotOperator;

impl RemapperOperator for NotOperator {
    fn name(&self) -> &str {
        "not"
    }
    fn human_friendly_name(&self) -> &str {
        "Not"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Remapper);
        &SHAPE
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        Ok(Value::Bool(!context.evaluate(payload)?.is_truthy()))
    }
}

/// Register the conditional and logical operators
pub fn register_logical_operators(registry: &mut OperatorRegistry) {
    registry.register(IfOperator);
    registry.register(MatchOperator);
    registry.register(JunctionOperator::AND);
    registry.register(JunctionOperator::OR);
    registry.register(NotOperator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::remap;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[test]
    fn test_if_branches() {
        let remapper = json!({ "if": { "condition": { "prop": "ok" }, "then": "yes", "else": "no" } });
        assert_eq!(remap(remapper.clone(), json!({ "ok": true })), json!("yes"));
        assert_eq!(remap(remapper, json!({ "ok": false })), json!("no"));

        let no_else = json!({ "if": { "condition": { "prop": "ok" }, "then": "yes" } });
        assert_eq!(remap(no_else, json!({ "ok": false })), json!(null));
    }

    #[test]
    fn test_if_evaluates_one_branch() {
        // The untaken branch names an unknown operator and would fail if evaluated.
        let remapper = json!({ "if": { "condition": true, "then": 1, "else": { "boom": null } } });
        assert_eq!(remap(remapper, json!(null)), json!(1));
    }

    #[test]
    fn test_match() {
        let remapper = json!({ "match": [
            { "case": { "equals": [{ "prop": "kind" }, "a"] }, "value": "first" },
            { "case": { "prop": "fallback" }, "value": { "prop": "kind" } }
        ] });
        assert_eq!(remap(remapper.clone(), json!({ "kind": "a" })), json!("first"));
        assert_eq!(remap(remapper.clone(), json!({ "kind": "b", "fallback": 1 })), json!("b"));
        assert_eq!(remap(remapper, json!({ "kind": "b" })), json!(null));
    }

    #[rstest]
    #[case(json!({ "and": [] }), json!(true))]
    #[case(json!({ "or": [] }), json!(false))]
    #[case(json!({ "and": [1, "x", { "prop": "t" }] }), json!(true))]
    #[case(json!({ "and": [1, 0, { "boom": null }] }), json!(false))]
    #[case(json!({ "or": [0, "", { "prop": "t" }] }), json!(true))]
    #[case(json!({ "or": [{ "prop": "t" }, { "boom": null }] }), json!(true))]
    #[case(json!({ "not": { "prop": "t" } }), json!(false))]
    #[case(json!({ "not": { "prop": "missing" } }), json!(true))]
    fn test_logic(#[case] remapper: Value, #[case] expected: Value) {
        assert_eq!(remap(remapper, json!({ "t": true })), expected);
    }
}
