//! Builder pattern for constructing diagnostics

use super::diagnostic::{Diagnostic, DiagnosticCode, Severity};
use crate::model::JsonPointer;

/// Builder for constructing diagnostics fluently
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    severity: Severity,
    code: DiagnosticCode,
    message: String,
    path: JsonPointer,
}

impl DiagnosticBuilder {
    /// Create a new error diagnostic builder
    pub fn error(code: DiagnosticCode) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: String::new(),
            path: JsonPointer::root(),
        }
    }

    /// Create a new warning diagnostic builder
    pub fn warning(code: DiagnosticCode) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code)
        }
    }

    /// Set the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the location
    pub fn at(mut self, path: &JsonPointer) -> Self {
        self.path = path.clone();
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic::new(self.severity, self.code, self.message, self.path)
    }

    /// Unknown operator
    pub fn unknown_operator(name: &str) -> Self {
        Self::error(DiagnosticCode::UnknownOperator)
            .with_message(format!("Unknown remapper operator '{name}'"))
    }

    /// Step object with the wrong number of keys
    pub fn malformed_step(keys: usize) -> Self {
        Self::error(DiagnosticCode::MalformedStep).with_message(format!(
            "A remapper step must have exactly one key, found {keys}"
        ))
    }

    /// Payload field missing
    pub fn missing_field(operator: &str, field: &str) -> Self {
        Self::error(DiagnosticCode::MissingField)
            .with_message(format!("'{operator}' requires the field '{field}'"))
    }

    /// Payload field not declared by the operator
    pub fn unknown_field(operator: &str, field: &str) -> Self {
        Self::error(DiagnosticCode::UnknownField)
            .with_message(format!("'{operator}' does not accept the field '{field}'"))
    }

    /// Type mismatch
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self::error(DiagnosticCode::TypeMismatch {
            expected: expected.clone(),
            actual: actual.clone(),
        })
        .with_message(format!("Expected {expected}, found {actual}"))
    }
}
