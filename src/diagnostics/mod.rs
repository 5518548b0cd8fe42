//! Diagnostic system for remapper validation and evaluation errors
//!
//! Produces both human-friendly messages and machine-readable diagnostics
//! that authoring tools use to highlight the offending node.

#![warn(missing_docs)]

pub mod builder;
pub mod diagnostic;
pub mod formatter;

pub use builder::DiagnosticBuilder;
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use formatter::{DiagnosticFormatter, Format};
