//! Operator trait and registry

use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::JsonPointer;
use crate::registry::signature::PayloadShape;
use crate::validator::RemapperValidator;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Trait for implementing remapper operators
pub trait RemapperOperator: Send + Sync {
    /// Get the operator name as it appears as the key of a step
    fn name(&self) -> &str;

    /// Get a human-friendly name for the operator
    fn human_friendly_name(&self) -> &str;

    /// Get the declared payload shape
    fn shape(&self) -> &PayloadShape;

    /// Get operator documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Whether the result depends only on the input, payload and context
    fn is_deterministic(&self) -> bool {
        true
    }

    /// Evaluate the operator against `input` (the context's current value)
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value>;

    /// Check a payload statically, reporting problems to the validator.
    ///
    /// `path` points at the payload. Nested remappers are handed back to the
    /// validator through [`RemapperValidator::check_shape`].
    fn validate_shape(&self, payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
        validator.check_shape(self.shape(), payload, path, self.name());
    }
}

/// Registry for remapper operators
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    operators: FxHashMap<String, Arc<dyn RemapperOperator>>,
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.names())
            .finish()
    }
}

impl OperatorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator, replacing any operator with the same name
    pub fn register<O: RemapperOperator + 'static>(&mut self, operator: O) {
        self.register_shared(Arc::new(operator));
    }

    /// Register an already shared operator
    pub fn register_shared(&mut self, operator: Arc<dyn RemapperOperator>) {
        let name = operator.name().to_string();
        if self.operators.insert(name.clone(), operator).is_some() {
            log::debug!("operator '{name}' replaced");
        }
    }

    /// Get an operator by name
    pub fn get(&self, name: &str) -> Option<&dyn RemapperOperator> {
        self.operators.get(name).map(|operator| operator.as_ref())
    }

    /// Check if an operator exists
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// All operator names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All operators, sorted by name
    pub fn operators(&self) -> Vec<&dyn RemapperOperator> {
        let mut operators: Vec<&dyn RemapperOperator> =
            self.operators.values().map(|operator| operator.as_ref()).collect();
        operators.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        operators
    }

    /// Number of registered operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// A registry holding only the named operators.
    ///
    /// Unknown names are ignored. Operators are shared, not copied.
    pub fn restricted(&self, names: &[&str]) -> Self {
        let operators = names
            .iter()
            .filter_map(|name| {
                self.operators
                    .get(*name)
                    .map(|operator| (name.to_string(), Arc::clone(operator)))
            })
            .collect();
        Self { operators }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::create_standard_registry;
    use std::sync::LazyLock;

    struct EchoOperator;

    impl RemapperOperator for EchoOperator {
        fn name(&self) -> &str {
            "echo"
        }
        fn human_friendly_name(&self) -> &str {
            "Echo"
        }
        fn shape(&self) -> &PayloadShape {
            static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::null());
            &SHAPE
        }
        fn evaluate(
            &self,
            input: &Value,
            _payload: &Value,
            _context: &EvaluationContext<'_>,
        ) -> EvaluationResult<Value> {
            Ok(input.clone())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = OperatorRegistry::new();
        assert!(registry.is_empty());

        registry.register(EchoOperator);
        assert!(registry.contains("echo"));
        assert_eq!(registry.get("echo").map(|op| op.human_friendly_name()), Some("Echo"));
        assert!(registry.get("prop").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_restricted_registry() {
        let standard = create_standard_registry();
        let restricted = standard.restricted(&["prop", "static", "nope"]);

        assert_eq!(restricted.names(), vec!["prop", "static"]);
        assert!(!restricted.contains("date.now"));
        assert!(standard.contains("date.now"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = create_standard_registry();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(registry.operators().len(), registry.len());
    }
}
