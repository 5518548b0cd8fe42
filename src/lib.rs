//! Remapper evaluation engine
//!
//! Remappers are JSON-encoded, side-effect-free transformation programs: a
//! literal, a single `{ "operator": payload }` step, or an array of steps
//! piped left to right. This crate evaluates them against JSON input and
//! checks them statically before they run.
//!
//! ```rust
//! use remapper_engine::{ContextBuilder, RemapperEngine, UserInfo};
//! use serde_json::json;
//!
//! let engine = RemapperEngine::standard();
//! let remapper = json!({ "object.from": {
//!     "title": [{ "prop": "title" }, { "string.case": "upper" }],
//!     "by": { "user": "name" }
//! } });
//!
//! assert!(engine.validate(&remapper).is_empty());
//!
//! let context = ContextBuilder::new().with_user(UserInfo::new("1").with_name("Ann"));
//! let result = engine.evaluate(&remapper, &json!({ "title": "hello" }), &context).unwrap();
//! assert_eq!(result, json!({ "title": "HELLO", "by": "Ann" }));
//! ```

pub mod diagnostics;
pub mod evaluator;
pub mod model;
pub mod registry;
pub mod validator;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticFormatter, Format, Severity};
pub use evaluator::{
    Clock, ContextBuilder, EvaluationConfig, EvaluationContext, EvaluationError,
    EvaluationResult, FastRandSource, FixedClock, MessageCatalog, RandomSource, RemapperEngine,
    ScriptedRandom, SystemClock, UserInfo,
};
pub use model::{JsonPointer, Remapper, ValueKind};
pub use registry::{OperatorRegistry, PayloadShape, RemapperOperator, create_standard_registry};
pub use validator::RemapperValidator;

use once_cell::sync::Lazy;
use serde_json::Value;

static STANDARD_ENGINE: Lazy<RemapperEngine> = Lazy::new(RemapperEngine::standard);

/// Evaluate a remapper with the built-in operators and an anonymous context
pub fn remap(remapper: &Value, input: &Value) -> EvaluationResult<Value> {
    STANDARD_ENGINE.remap(remapper, input)
}

/// Validate a remapper against the built-in operators
pub fn validate(remapper: &Value) -> Vec<Diagnostic> {
    STANDARD_ENGINE.validate(remapper)
}
