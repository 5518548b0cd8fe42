//! Remapper evaluator
//!
//! The engine, the immutable evaluation context and its builder, and the
//! services (clock, random source, message catalogue) injected into it.

#![warn(missing_docs)]

mod clock;
mod config;
mod context;
mod engine;
mod error;
mod history;
mod messages;
mod random;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EvaluationConfig;
pub use context::{ContextBuilder, EvaluationContext, ItemPosition, UserInfo};
pub use engine::RemapperEngine;
pub use error::{EvaluationError, EvaluationResult};
pub use history::History;
pub use messages::MessageCatalog;
pub use random::{FastRandSource, RandomSource, ScriptedRandom};
