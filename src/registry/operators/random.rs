//! Randomness operators
//!
//! All samples come from the context's injected random source.

use super::{expect_array, expect_integer, expect_object, expect_str, invalid_payload, required_field};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::{JsonPointer, Numeric};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::{FieldInfo, PayloadShape};
use crate::validator::RemapperValidator;
use serde_json::Value;
use std::sync::LazyLock;

/// Read a `[low, high]` payload, swapping reversed bounds
fn bounds(operator: &str, payload: &Value) -> EvaluationResult<(Numeric, Numeric)> {
    let [low, high] = expect_array(operator, payload)? else {
        return Err(invalid_payload(operator, "expected [low, high]"));
    };
    let (Some(low), Some(high)) = (Numeric::from_value(low), Numeric::from_value(high)) else {
        return Err(invalid_payload(operator, "bounds must be numbers"));
    };
    if low.as_f64() > high.as_f64() {
        Ok((high, low))
    } else {
        Ok((low, high))
    }
}

/// `random.choice`: one uniformly chosen element of the current array
pub struct RandomChoiceOperator;

impl RemapperOperator for RandomChoiceOperator {
    fn name(&self) -> &str {
        "random.choice"
    }
    fn human_friendly_name(&self) -> &str {
        "Random Choice"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::null);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Pick an element of the current array. Non-array input passes through unchanged; an empty array yields null."
    }
    fn is_deterministic(&self) -> bool {
        false
    }
    fn evaluate(
        &self,
        input: &Value,
        _payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        match input {
            Value::Array(items) if items.is_empty() => Ok(Value::Null),
            Value::Array(items) => {
                let index = context.random().index(items.len());
                Ok(items.get(index).cloned().unwrap_or(Value::Null))
            }
            other => Ok(other.clone()),
        }
    }
}

/// `random.integer`: uniform integer within inclusive bounds
pub struct RandomIntegerOperator;

impl RemapperOperator for RandomIntegerOperator {
    fn name(&self) -> &str {
        "random.integer"
    }
    fn human_friendly_name(&self) -> &str {
        "Random Integer"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::tuple(vec![PayloadShape::integer(), PayloadShape::integer()]));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Integer between low and high, both inclusive. Reversed bounds are swapped."
    }
    fn is_deterministic(&self) -> bool {
        false
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        match bounds(self.name(), payload)? {
            (Numeric::Integer(low), Numeric::Integer(high)) => {
                Ok(Value::from(context.random().integer(low, high)))
            }
            _ => Err(invalid_payload(self.name(), "bounds must be integers")),
        }
    }
}

/// `random.float`: uniform number within inclusive bounds
pub struct RandomFloatOperator;

impl RemapperOperator for RandomFloatOperator {
    fn name(&self) -> &str {
        "random.float"
    }
    fn human_friendly_name(&self) -> &str {
        "Random Float"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::tuple(vec![PayloadShape::number(), PayloadShape::number()]));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Number between low and high, both inclusive. Reversed bounds are swapped."
    }
    fn is_deterministic(&self) -> bool {
        false
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let (low, high) = bounds(self.name(), payload)?;
        let (low, high) = (low.as_f64(), high.as_f64());
        let sample = (low + context.random().unit() * (high - low)).clamp(low, high);
        Ok(Numeric::Float(sample).into_value())
    }
}

/// `random.string`: characters sampled independently from a set
pub struct RandomStringOperator;

impl RemapperOperator for RandomStringOperator {
    fn name(&self) -> &str {
        "random.string"
    }
    fn human_friendly_name(&self) -> &str {
        "Random String"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| {
            PayloadShape::Record(vec![
                FieldInfo::required("choice", PayloadShape::string()),
                FieldInfo::required("length", PayloadShape::integer()),
            ])
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "String of `length` characters, each drawn independently from `choice`."
    }
    fn is_deterministic(&self) -> bool {
        false
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let fields = expect_object(self.name(), payload)?;
        let choice: Vec<char> = expect_str(self.name(), required_field(self.name(), fields, "choice")?)?
            .chars()
            .collect();
        let length = usize::try_from(expect_integer(
            self.name(),
            required_field(self.name(), fields, "length")?,
        )?)
        .map_err(|_| invalid_payload(self.name(), "length must not be negative"))?;
        if choice.is_empty() {
            return Err(invalid_payload(self.name(), "choice must not be empty"));
        }
        let max_length = context.config().max_string_length;
        if length > max_length {
            return Err(invalid_payload(
                self.name(),
                format!("length {length} exceeds the limit of {max_length}"),
            ));
        }

        let random = context.random();
        let result: String = (0..length)
            .map(|_| choice[random.index(choice.len()).min(choice.len() - 1)])
            .collect();
        Ok(Value::String(result))
    }
    fn validate_shape(&self, payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
        validator.check_shape(self.shape(), payload, path, self.name());
        let Some(fields) = payload.as_object() else {
            return;
        };
        if fields.get("choice").and_then(Value::as_str) == Some("") {
            validator.report(
                DiagnosticBuilder::error(DiagnosticCode::InvalidValue)
                    .with_message("'random.string' needs at least one character to choose from")
                    .at(&path.key("choice"))
                    .build(),
            );
        }
        let max_length = i64::try_from(validator.max_string_length()).unwrap_or(i64::MAX);
        validator.check_integer_range(fields.get("length"), 0..=max_length, &path.key("length"), self.name());
    }
}

/// Register the randomness operators
pub fn register_random_operators(registry: &mut OperatorRegistry) {
    registry.register(RandomChoiceOperator);
    registry.register(RandomIntegerOperator);
    registry.register(RandomFloatOperator);
    registry.register(RandomStringOperator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{remap_with, try_remap};
    use crate::diagnostics::DiagnosticCode;
    use crate::evaluator::{
        ContextBuilder, EvaluationConfig, EvaluationError, FastRandSource, RemapperEngine,
        ScriptedRandom,
    };
    use serde_json::json;

    #[test]
    fn test_integer_bounds_swapped() {
        let builder = ContextBuilder::new().with_random(FastRandSource::with_seed(7));
        for _ in 0..500 {
            let value = remap_with(json!({ "random.integer": [10, -10] }), json!(null), &builder);
            let n = value.as_i64().unwrap();
            assert!((-10..=10).contains(&n), "{n} out of range");
        }
    }

    #[test]
    fn test_scripted_samples_hit_both_bounds() {
        let builder = ContextBuilder::new().with_random(ScriptedRandom::new(vec![0.0, 1.0]));
        let low = remap_with(json!({ "random.integer": [3, 5] }), json!(null), &builder);
        let high = remap_with(json!({ "random.integer": [3, 5] }), json!(null), &builder);
        assert_eq!((low, high), (json!(3), json!(5)));

        let low = remap_with(json!({ "random.float": [1.5, 2.5] }), json!(null), &builder);
        let high = remap_with(json!({ "random.float": [1.5, 2.5] }), json!(null), &builder);
        assert_eq!((low, high), (json!(1.5), json!(2.5)));
    }

    #[test]
    fn test_choice() {
        let builder = ContextBuilder::new().with_random(ScriptedRandom::new(vec![0.99]));
        assert_eq!(
            remap_with(json!({ "random.choice": null }), json!(["a", "b", "c"]), &builder),
            json!("c")
        );
        assert_eq!(remap_with(json!({ "random.choice": null }), json!("x"), &builder), json!("x"));
        assert_eq!(remap_with(json!({ "random.choice": null }), json!([]), &builder), json!(null));
    }

    #[test]
    fn test_string() {
        let builder = ContextBuilder::new().with_random(FastRandSource::with_seed(1));
        let value = remap_with(
            json!({ "random.string": { "choice": "ab", "length": 32 } }),
            json!(null),
            &builder,
        );
        let text = value.as_str().unwrap();
        assert_eq!(text.chars().count(), 32);
        assert!(text.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_string_empty_choice() {
        assert!(matches!(
            try_remap(json!({ "random.string": { "choice": "", "length": 1 } }), json!(null)),
            Err(EvaluationError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_string_length_cap() {
        let engine = RemapperEngine::standard()
            .with_config(EvaluationConfig::default().with_max_string_length(8));
        let at_cap = json!({ "random.string": { "choice": "a", "length": 8 } });
        let over_cap = json!({ "random.string": { "choice": "a", "length": 9_000_000_000_000_000_000_i64 } });

        assert!(engine.validate(&at_cap).is_empty());
        assert_eq!(engine.remap(&at_cap, &json!(null)), Ok(json!("aaaaaaaa")));

        let diagnostics = engine.validate(&over_cap);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidValue);
        assert_eq!(diagnostics[0].path.to_string(), "/random.string/length");
        assert!(matches!(
            engine.remap(&over_cap, &json!(null)),
            Err(EvaluationError::InvalidPayload { .. })
        ));
    }
}
