//! Static remapper validation
//!
//! Walks a remapper tree without any runtime data and reports every
//! structural problem as a [`Diagnostic`] tagged with the JSON pointer of
//! the offending node.
//!
//! ```rust
//! use remapper_engine::{RemapperValidator, create_standard_registry};
//! use serde_json::json;
//!
//! let registry = create_standard_registry();
//! let diagnostics = RemapperValidator::new(&registry).validate(&json!({
//!     "object.from": { "name": { "string.case": "title" } }
//! }));
//!
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].path.to_string(), "/object.from/name/string.case");
//! ```

#![warn(missing_docs)]

use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use crate::evaluator::EvaluationConfig;
use crate::model::{JsonPointer, Remapper, ValueKind, is_mixed_sequence};
use crate::registry::{OperatorRegistry, PayloadShape};
use serde_json::Value;
use std::ops::RangeInclusive;

/// Checks remapper trees against an operator registry
#[derive(Debug)]
pub struct RemapperValidator<'r> {
    registry: &'r OperatorRegistry,
    max_depth: usize,
    max_string_length: usize,
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> RemapperValidator<'r> {
    /// Validator over `registry` with the default depth limit
    pub fn new(registry: &'r OperatorRegistry) -> Self {
        let config = EvaluationConfig::default();
        Self {
            registry,
            max_depth: config.max_depth,
            max_string_length: config.max_string_length,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Set the nesting limit; it should match the engine's `max_depth`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Take every limit from an engine configuration
    pub fn with_config(mut self, config: &EvaluationConfig) -> Self {
        self.max_depth = config.max_depth;
        self.max_string_length = config.max_string_length;
        self
    }

    /// Longest string `random.string` may be asked to build
    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }

    /// Validate a whole remapper, returning every problem found
    pub fn validate(mut self, remapper: &Value) -> Vec<Diagnostic> {
        self.visit(remapper, &JsonPointer::root());
        log::debug!("validation found {} problem(s)", self.diagnostics.len());
        self.diagnostics
    }

    /// Record a problem
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn visit(&mut self, remapper: &Value, path: &JsonPointer) {
        let registry = self.registry;
        match Remapper::classify(remapper) {
            Remapper::Literal(Value::Array(items)) if is_mixed_sequence(items) => {
                self.report(
                    DiagnosticBuilder::warning(DiagnosticCode::MixedSequence)
                        .with_message(
                            "Array mixes steps and literal values; it is treated as a literal and its steps never run",
                        )
                        .at(path)
                        .build(),
                );
            }
            Remapper::Literal(_) => {}
            Remapper::Sequence(steps) => {
                for (index, step) in steps.iter().enumerate() {
                    self.visit(step, &path.index(index));
                }
            }
            Remapper::Step(step) => match registry.get(step.name) {
                Some(operator) => operator.validate_shape(step.payload, &path.key(step.name), self),
                None => self.report(DiagnosticBuilder::unknown_operator(step.name).at(path).build()),
            },
            Remapper::MalformedStep { keys } => {
                self.report(DiagnosticBuilder::malformed_step(keys).at(path).build());
            }
        }
    }

    /// Check `value` against `shape`, descending into nested remappers.
    ///
    /// Operators call this from [`validate_shape`](crate::registry::RemapperOperator::validate_shape);
    /// `operator` names the step the payload belongs to.
    pub fn check_shape(&mut self, shape: &PayloadShape, value: &Value, path: &JsonPointer, operator: &str) {
        match shape {
            PayloadShape::Any => {}
            PayloadShape::Remapper => self.nested(value, path),
            PayloadShape::Literal(kind) => {
                if !kind.accepts(value) {
                    self.mismatch(shape, value, path);
                }
            }
            PayloadShape::Keyword(words) => match value.as_str() {
                Some(word) if words.contains(&word) => {}
                Some(word) => self.report(
                    DiagnosticBuilder::error(DiagnosticCode::InvalidValue)
                        .with_message(format!("'{operator}' expects {shape}, found \"{word}\""))
                        .at(path)
                        .build(),
                ),
                None => self.mismatch(shape, value, path),
            },
            PayloadShape::Optional(inner) => {
                if !value.is_null() {
                    self.check_shape(inner, value, path, operator);
                }
            }
            PayloadShape::OneOf(shapes) => match shapes.iter().find(|s| Self::admits(s, value)) {
                Some(matching) => self.check_shape(matching, value, path, operator),
                None => self.mismatch(shape, value, path),
            },
            PayloadShape::List(inner) => match value.as_array() {
                Some(items) => {
                    for (index, item) in items.iter().enumerate() {
                        self.check_shape(inner, item, &path.index(index), operator);
                    }
                }
                None => self.mismatch(shape, value, path),
            },
            PayloadShape::Tuple { items, required } => {
                let Some(values) = value.as_array() else {
                    return self.mismatch(shape, value, path);
                };
                if values.len() < *required || values.len() > items.len() {
                    let expected = if *required == items.len() {
                        format!("{required}")
                    } else {
                        format!("{required} to {}", items.len())
                    };
                    self.report(
                        DiagnosticBuilder::error(DiagnosticCode::InvalidValue)
                            .with_message(format!(
                                "'{operator}' expects {expected} items, found {}",
                                values.len()
                            ))
                            .at(path)
                            .build(),
                    );
                }
                for (index, (item_shape, item)) in items.iter().zip(values).enumerate() {
                    self.check_shape(item_shape, item, &path.index(index), operator);
                }
            }
            PayloadShape::Record(fields) => {
                let Some(object) = value.as_object() else {
                    return self.mismatch(shape, value, path);
                };
                for field in fields {
                    match object.get(field.name) {
                        Some(field_value) => {
                            self.check_shape(&field.shape, field_value, &path.key(field.name), operator)
                        }
                        None if field.optional => {}
                        None => self.report(
                            DiagnosticBuilder::missing_field(operator, field.name)
                                .at(path)
                                .build(),
                        ),
                    }
                }
                for key in object.keys() {
                    if !fields.iter().any(|field| field.name == key) {
                        self.report(
                            DiagnosticBuilder::unknown_field(operator, key)
                                .at(&path.key(key.as_str()))
                                .build(),
                        );
                    }
                }
            }
            PayloadShape::Map(inner) => match value.as_object() {
                Some(object) => {
                    for (key, item) in object {
                        self.check_shape(inner, item, &path.key(key.as_str()), operator);
                    }
                }
                None => self.mismatch(shape, value, path),
            },
        }
    }

    /// Report `value` at `path` when it is an integer outside `range`.
    ///
    /// Non-integers are left to [`check_shape`](Self::check_shape).
    pub fn check_integer_range(
        &mut self,
        value: Option<&Value>,
        range: RangeInclusive<i64>,
        path: &JsonPointer,
        operator: &str,
    ) {
        let Some(n) = value.and_then(Value::as_i64) else {
            return;
        };
        if range.contains(&n) {
            return;
        }
        let expected = if *range.end() == i64::MAX {
            format!("at least {}", range.start())
        } else {
            format!("from {} to {}", range.start(), range.end())
        };
        self.report(
            DiagnosticBuilder::error(DiagnosticCode::InvalidValue)
                .with_message(format!("'{operator}' expects an integer {expected}, found {n}"))
                .at(path)
                .build(),
        );
    }

    // Nested remappers sit one level deeper, matching the evaluator's guard.
    fn nested(&mut self, remapper: &Value, path: &JsonPointer) {
        if self.depth >= self.max_depth {
            self.report(
                DiagnosticBuilder::error(DiagnosticCode::NestingTooDeep)
                    .with_message(format!(
                        "Remapper nests deeper than the maximum of {}",
                        self.max_depth
                    ))
                    .at(path)
                    .build(),
            );
            return;
        }
        self.depth += 1;
        self.visit(remapper, path);
        self.depth -= 1;
    }

    fn mismatch(&mut self, shape: &PayloadShape, value: &Value, path: &JsonPointer) {
        self.report(
            DiagnosticBuilder::type_mismatch(shape.to_string(), ValueKind::of(value).to_string())
                .at(path)
                .build(),
        );
    }

    /// Shallow test used to pick an alternative of a `OneOf`
    fn admits(shape: &PayloadShape, value: &Value) -> bool {
        match shape {
            PayloadShape::Any | PayloadShape::Remapper => true,
            PayloadShape::Literal(kind) => kind.accepts(value),
            PayloadShape::Keyword(words) => value.as_str().is_some_and(|word| words.contains(&word)),
            PayloadShape::Optional(inner) => value.is_null() || Self::admits(inner, value),
            PayloadShape::OneOf(shapes) => shapes.iter().any(|s| Self::admits(s, value)),
            PayloadShape::List(_) | PayloadShape::Tuple { .. } => value.is_array(),
            PayloadShape::Record(_) | PayloadShape::Map(_) => value.is_object(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::create_standard_registry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn validate(remapper: Value) -> Vec<(String, String)> {
        let registry = create_standard_registry();
        RemapperValidator::new(&registry)
            .validate(&remapper)
            .into_iter()
            .map(|d| (d.path.to_string(), d.code_string().to_string()))
            .collect()
    }

    #[test]
    fn test_unknown_operator_at_root() {
        assert_eq!(
            validate(json!({ "unknownOperator": {} })),
            vec![("".to_string(), "unknown_operator".to_string())]
        );
    }

    #[test]
    fn test_valid_tree() {
        let remapper = json!([
            { "prop": "items" },
            { "array.map": { "object.from": {
                "name": [{ "prop": "name" }, { "string.case": "upper" }],
                "label": { "if": { "condition": { "prop": "ok" }, "then": "yes" } },
                "at": { "date.add": { "amount": 1, "unit": "days" } }
            } } },
            { "random.integer": [1000, 0] }
        ]);
        assert_eq!(validate(remapper), vec![]);
    }

    #[test]
    fn test_nested_paths() {
        let remapper = json!([
            { "prop": "a" },
            { "if": { "condition": true, "then": { "nope": null }, "extra": 1 } }
        ]);
        assert_eq!(
            validate(remapper),
            vec![
                ("/1/if/then".to_string(), "unknown_operator".to_string()),
                ("/1/if/extra".to_string(), "unknown_field".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_field_and_type_mismatch() {
        assert_eq!(
            validate(json!({ "date.add": { "amount": "1" } })),
            vec![
                ("/date.add/amount".to_string(), "type_mismatch".to_string()),
                ("/date.add".to_string(), "missing_field".to_string()),
            ]
        );
    }

    #[test]
    fn test_keyword_and_tuple() {
        assert_eq!(
            validate(json!({ "array.from": [{ "string.case": "title" }, { "random.integer": [1] }] })),
            vec![
                ("/array.from/0/string.case".to_string(), "invalid_value".to_string()),
                ("/array.from/1/random.integer".to_string(), "invalid_value".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_and_mixed() {
        assert_eq!(
            validate(json!({ "object.from": { "a": {}, "b": [{ "prop": "x" }, 1] } })),
            vec![
                ("/object.from/a".to_string(), "malformed_step".to_string()),
                ("/object.from/b".to_string(), "mixed_sequence".to_string()),
            ]
        );
    }

    #[test]
    fn test_operator_specific_checks() {
        assert_eq!(
            validate(json!({ "string.replace": { "(": "x" } })),
            vec![("/string.replace/(".to_string(), "invalid_value".to_string())]
        );
        assert_eq!(
            validate(json!({ "string.format": { "values": {} } })),
            vec![("/string.format".to_string(), "missing_field".to_string())]
        );
    }

    #[test]
    fn test_nesting_too_deep() {
        let registry = create_standard_registry();
        let nested = json!({ "array.map": { "array.map": { "array.map": { "prop": "x" } } } });

        assert!(RemapperValidator::new(&registry).with_max_depth(3).validate(&nested).is_empty());

        let diagnostics = RemapperValidator::new(&registry).with_max_depth(2).validate(&nested);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::NestingTooDeep);
        assert_eq!(diagnostics[0].path.to_string(), "/array.map/array.map/array.map");
    }

    #[test]
    fn test_json_pointer_escaping() {
        assert_eq!(
            validate(json!({ "object.from": { "a/b~c": { "nope": 1 } } })),
            vec![("/object.from/a~1b~0c".to_string(), "unknown_operator".to_string())]
        );
    }
}
