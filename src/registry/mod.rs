//! Operator registry for remappers
//!
//! Trait-based registry mapping step names to operators. Each operator
//! declares a payload shape used by the validator and an evaluation
//! function used by the engine.

#![warn(missing_docs)]

pub mod operator;
pub mod operators;
pub mod signature;

pub use operator::{OperatorRegistry, RemapperOperator};
pub use signature::{FieldInfo, PayloadShape};

/// Create a registry with every built-in operator
pub fn create_standard_registry() -> OperatorRegistry {
    let mut registry = OperatorRegistry::new();
    operators::register_builtin_operators(&mut registry);
    registry
}
