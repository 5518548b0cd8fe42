//! Number operators
//!
//! Arithmetic takes the current value as the left operand and the payload
//! remapper result as the right one. Non-numeric operands yield `null`.

use super::{expect_integer, invalid_payload, soft_null};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::{JsonPointer, Numeric};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::PayloadShape;
use crate::validator::RemapperValidator;
use serde_json::Value;
use std::sync::LazyLock;

/// Binary arithmetic operator
pub struct ArithmeticOperator {
    name: &'static str,
    human_friendly_name: &'static str,
    documentation: &'static str,
    apply: fn(Numeric, Numeric) -> Option<Numeric>,
}

impl ArithmeticOperator {
    /// `number.add`
    pub const ADD: Self = Self {
        name: "number.add",
        human_friendly_name: "Add",
        documentation: "Add the payload result to the current number.",
        apply: |a, b| Some(a.add(b)),
    };

    /// `number.subtract`
    pub const SUBTRACT: Self = Self {
        name: "number.subtract",
        human_friendly_name: "Subtract",
        documentation: "Subtract the payload result from the current number.",
        apply: |a, b| Some(a.subtract(b)),
    };

    /// `number.multiply`
    pub const MULTIPLY: Self = Self {
        name: "number.multiply",
        human_friendly_name: "Multiply",
        documentation: "Multiply the current number by the payload result.",
        apply: |a, b| Some(a.multiply(b)),
    };

    /// `number.divide`
    pub const DIVIDE: Self = Self {
        name: "number.divide",
        human_friendly_name: "Divide",
        documentation: "Divide the current number by the payload result. Division by zero yields null.",
        apply: Numeric::divide,
    };

    /// `number.modulo`
    pub const MODULO: Self = Self {
        name: "number.modulo",
        human_friendly_name: "Modulo",
        documentation: "Remainder of dividing the current number by the payload result. A zero divisor yields null.",
        apply: Numeric::modulo,
    };
}

impl RemapperOperator for ArithmeticOperator {
    fn name(&self) -> &str {
        self.name
    }
    fn human_friendly_name(&self) -> &str {
        self.human_friendly_name
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Remapper);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        self.documentation
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let right = context.evaluate(payload)?;
        let (Some(a), Some(b)) = (Numeric::from_value(input), Numeric::from_value(&right)) else {
            return Ok(soft_null(self.name, "operands are not numbers"));
        };
        Ok(match (self.apply)(a, b) {
            Some(result) => result.into_value(),
            None => soft_null(self.name, "division by zero"),
        })
    }
}

/// Unary rounding operator
pub struct RoundingOperator {
    name: &'static str,
    human_friendly_name: &'static str,
    apply: fn(Numeric) -> Numeric,
}

impl RoundingOperator {
    /// `number.floor`
    pub const FLOOR: Self = Self {
        name: "number.floor",
        human_friendly_name: "Floor",
        apply: Numeric::floor,
    };

    /// `number.ceil`
    pub const CEIL: Self = Self {
        name: "number.ceil",
        human_friendly_name: "Ceiling",
        apply: Numeric::ceil,
    };
}

impl RemapperOperator for RoundingOperator {
    fn name(&self) -> &str {
        self.name
    }
    fn human_friendly_name(&self) -> &str {
        self.human_friendly_name
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
        Ok(match Numeric::from_value(input) {
            Some(n) => (self.apply)(n).into_value(),
            None => soft_null(self.name, "input is not a number"),
        })
    }
}

/// `number.round`: rounds half away from zero
pub struct RoundOperator;

impl RemapperOperator for RoundOperator {
    fn name(&self) -> &str {
        "number.round"
    }
    fn human_friendly_name(&self) -> &str {
        "Round"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::optional(PayloadShape::integer()));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Round to the given number of decimals (default 0), halves away from zero."
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
        let decimals = match payload {
            Value::Null => 0,
            other => match expect_integer(self.name(), other)? {
                n if n < 0 => return Err(invalid_payload(self.name(), "decimals must not be negative")),
                n => u32::try_from(n).unwrap_or(u32::MAX),
            },
        };
        Ok(match Numeric::from_value(input) {
            Some(n) => n.round(decimals).into_value(),
            None => soft_null(self.name(), "input is not a number"),
        })
    }
}

/// `number.parse`: reads a number out of a string
pub struct ParseNumberOperator;

impl RemapperOperator for ParseNumberOperator {
    fn name(&self) -> &str {
        "number.parse"
    }
    fn human_friendly_name(&self) -> &str {
        "Parse Number"
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
        let parsed = match input {
            Value::Number(_) => return Ok(input.clone()),
            Value::String(text) => Numeric::parse(text),
            _ => None,
        };
        Ok(match parsed {
            Some(n) => n.into_value(),
            None => soft_null(self.name(), "input is not numeric"),
        })
    }
}

/// Register the number operators
pub fn register_number_operators(registry: &mut OperatorRegistry) {
    registry.register(ArithmeticOperator::ADD);
    registry.register(ArithmeticOperator::SUBTRACT);
    registry.register(ArithmeticOperator::MULTIPLY);
    registry.register(ArithmeticOperator::DIVIDE);
    registry.register(ArithmeticOperator::MODULO);
    registry.register(RoundOperator);
    registry.register(RoundingOperator::FLOOR);
    registry.register(RoundingOperator::CEIL);
    registry.register(ParseNumberOperator);
}
