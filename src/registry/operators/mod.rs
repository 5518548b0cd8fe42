//! Built-in remapper operators

mod array;
mod comparison;
mod data;
mod date;
mod environment;
mod history;
mod logical;
mod number;
mod object;
mod random;
mod string;
mod utility;

pub use array::*;
pub use comparison::*;
pub use data::*;
pub use date::*;
pub use environment::*;
pub use history::*;
pub use logical::*;
pub use number::*;
pub use object::*;
pub use random::*;
pub use string::*;
pub use utility::*;

use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::registry::operator::OperatorRegistry;
use serde_json::{Map, Value};
use std::fmt;

/// Register all built-in operators
pub fn register_builtin_operators(registry: &mut OperatorRegistry) {
    data::register_data_operators(registry);
    object::register_object_operators(registry);
    array::register_array_operators(registry);
    string::register_string_operators(registry);
    number::register_number_operators(registry);
    date::register_date_operators(registry);
    logical::register_logical_operators(registry);
    comparison::register_comparison_operators(registry);
    history::register_history_operators(registry);
    environment::register_environment_operators(registry);
    random::register_random_operators(registry);
    utility::register_utility_operators(registry);
}

// Payload accessors. A payload that fails these is a hard error: the
// validator would have rejected it.

pub(crate) fn invalid_payload(operator: &str, message: impl fmt::Display) -> EvaluationError {
    EvaluationError::InvalidPayload {
        operator: operator.to_string(),
        message: message.to_string(),
    }
}

pub(crate) fn expect_object<'p>(
    operator: &str,
    payload: &'p Value,
) -> EvaluationResult<&'p Map<String, Value>> {
    payload
        .as_object()
        .ok_or_else(|| invalid_payload(operator, "expected an object"))
}

pub(crate) fn expect_array<'p>(operator: &str, payload: &'p Value) -> EvaluationResult<&'p [Value]> {
    payload
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid_payload(operator, "expected an array"))
}

pub(crate) fn expect_str<'p>(operator: &str, payload: &'p Value) -> EvaluationResult<&'p str> {
    payload
        .as_str()
        .ok_or_else(|| invalid_payload(operator, "expected a string"))
}

pub(crate) fn expect_integer(operator: &str, payload: &Value) -> EvaluationResult<i64> {
    payload
        .as_i64()
        .ok_or_else(|| invalid_payload(operator, "expected an integer"))
}

pub(crate) fn expect_keyword<'p>(
    operator: &str,
    payload: &'p Value,
    words: &[&str],
) -> EvaluationResult<&'p str> {
    let word = expect_str(operator, payload)?;
    if words.contains(&word) {
        Ok(word)
    } else {
        Err(invalid_payload(
            operator,
            format!("expected one of {}, found \"{word}\"", words.join(", ")),
        ))
    }
}

pub(crate) fn required_field<'p>(
    operator: &str,
    fields: &'p Map<String, Value>,
    name: &str,
) -> EvaluationResult<&'p Value> {
    fields
        .get(name)
        .ok_or_else(|| invalid_payload(operator, format!("missing field '{name}'")))
}

/// Soft failure: log at debug level and yield `null`
pub(crate) fn soft_null(operator: &str, reason: impl fmt::Display) -> Value {
    log::debug!("'{operator}' yielded null: {reason}");
    Value::Null
}
