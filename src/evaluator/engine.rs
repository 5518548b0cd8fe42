//! # Remapper evaluation engine
//!
//! A recursive tree-walking interpreter over remapper JSON. Each step is
//! dispatched by name through the [`OperatorRegistry`]; operators recurse
//! into their sub-remappers through the [`EvaluationContext`], which carries
//! the depth guard and the history stack.
//!
//! ## Quick Start
//!
//! ```rust
//! use remapper_engine::RemapperEngine;
//! use serde_json::json;
//!
//! let engine = RemapperEngine::standard();
//! let input = json!({ "user": { "name": "Alice" } });
//!
//! let result = engine
//!     .remap(&json!([{ "prop": "user" }, { "prop": "name" }]), &input)
//!     .unwrap();
//! assert_eq!(result, json!("Alice"));
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use remapper_engine::{EvaluationConfig, EvaluationError, RemapperEngine};
//! use serde_json::json;
//!
//! let engine = RemapperEngine::standard().with_config(EvaluationConfig::new(1, 8));
//! let nested = json!({ "array.map": { "array.map": { "prop": "x" } } });
//!
//! let error = engine.remap(&nested, &json!([[{ "x": 1 }]])).unwrap_err();
//! assert_eq!(error, EvaluationError::DepthExceeded { max_depth: 1 });
//! ```

use super::config::EvaluationConfig;
use super::context::{ContextBuilder, EvaluationContext};
use super::error::{EvaluationError, EvaluationResult};
use crate::diagnostics::Diagnostic;
use crate::model::{Remapper, Step};
use crate::registry::{OperatorRegistry, create_standard_registry};
use crate::validator::RemapperValidator;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Remapper evaluation engine.
///
/// Stateless between calls apart from its registry and configuration, both
/// read-only, so one engine can serve any number of threads.
#[derive(Clone)]
pub struct RemapperEngine {
    registry: Arc<OperatorRegistry>,
    config: EvaluationConfig,
}

impl fmt::Debug for RemapperEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemapperEngine")
            .field("operators", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for RemapperEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl RemapperEngine {
    /// Create an engine over a custom registry with the default configuration
    pub fn new(registry: Arc<OperatorRegistry>) -> Self {
        Self {
            registry,
            config: EvaluationConfig::default(),
        }
    }

    /// Create an engine with every built-in operator
    pub fn standard() -> Self {
        Self::new(Arc::new(create_standard_registry()))
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: EvaluationConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the current configuration
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Access the operator registry (read-only)
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Evaluate a remapper against `input` in the context described by `builder`.
    ///
    /// Soft failures inside operators surface as `null` in the result; only
    /// hard failures (unknown operator, malformed step, invalid payload,
    /// depth exceeded) are returned as errors.
    pub fn evaluate(
        &self,
        remapper: &Value,
        input: &Value,
        builder: &ContextBuilder,
    ) -> EvaluationResult<Value> {
        let context = builder.build(self, input);
        self.evaluate_in(remapper, &context).inspect_err(|error| {
            log::warn!("remapper evaluation aborted: {error}");
        })
    }

    /// Evaluate with an anonymous context and default services
    pub fn remap(&self, remapper: &Value, input: &Value) -> EvaluationResult<Value> {
        self.evaluate(remapper, input, &ContextBuilder::new())
    }

    /// Statically check a remapper against this engine's registry
    pub fn validate(&self, remapper: &Value) -> Vec<Diagnostic> {
        RemapperValidator::new(&self.registry)
            .with_config(&self.config)
            .validate(remapper)
    }

    /// Evaluate a remapper in an existing context.
    ///
    /// Operators call this indirectly through [`EvaluationContext::evaluate`]
    /// and friends, which apply the depth guard first.
    pub fn evaluate_in(
        &self,
        remapper: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        match Remapper::classify(remapper) {
            Remapper::Literal(value) => Ok(value.clone()),
            Remapper::Step(step) => self.evaluate_step(step, context),
            Remapper::Sequence(steps) => self.evaluate_sequence(steps, context),
            Remapper::MalformedStep { keys } => Err(EvaluationError::MalformedStep { keys }),
        }
    }

    fn evaluate_step(&self, step: Step<'_>, context: &EvaluationContext<'_>) -> EvaluationResult<Value> {
        let operator = self
            .registry
            .get(step.name)
            .ok_or_else(|| EvaluationError::UnknownOperator {
                name: step.name.to_string(),
            })?;
        log::trace!("evaluating '{}' at depth {}", step.name, context.depth());
        operator.evaluate(context.current(), step.payload, context)
    }

    // Each step sees the previous step's output as `current`, and the value it
    // replaced is pushed onto the history before the step runs.
    fn evaluate_sequence(
        &self,
        steps: &[Value],
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let Some((first, rest)) = steps.split_first() else {
            return Ok(context.current().clone());
        };

        let mut current = self.evaluate_in(first, context)?;
        let mut previous = context.current().clone();
        let mut history = context.history().clone();

        for step in rest {
            history = history.push(previous);
            let next = {
                let step_context = context.with_history(&current, history.clone());
                self.evaluate_in(step, &step_context)?
            };
            previous = std::mem::replace(&mut current, next);
        }

        Ok(current)
    }
}
