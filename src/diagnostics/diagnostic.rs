//! Core diagnostic types

use crate::model::JsonPointer;
use serde::Serialize;
use std::fmt;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hint - subtle suggestion for improvement
    Hint,
    /// Warning - the remapper runs but probably not as intended
    Warning,
    /// Error - the remapper must not be published
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Diagnostic codes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// Step names an operator the registry does not know
    UnknownOperator,
    /// Object with zero or several keys where a step was expected
    MalformedStep,
    /// Array mixing step objects and literal values
    MixedSequence,
    /// Required payload field is absent
    MissingField,
    /// Payload carries a field the operator does not declare
    UnknownField,
    /// Payload value has the wrong primitive type
    TypeMismatch {
        /// Expected shape
        expected: String,
        /// Kind found
        actual: String,
    },
    /// Payload value has the right type but an unusable value
    InvalidValue,
    /// Tree nests deeper than the configured maximum
    NestingTooDeep,
    /// Runtime depth guard tripped
    DepthExceeded,
    /// Custom error with a string code
    Custom(String),
}

impl DiagnosticCode {
    /// Short stable identifier
    pub fn as_str(&self) -> &str {
        match self {
            DiagnosticCode::UnknownOperator => "unknown_operator",
            DiagnosticCode::MalformedStep => "malformed_step",
            DiagnosticCode::MixedSequence => "mixed_sequence",
            DiagnosticCode::MissingField => "missing_field",
            DiagnosticCode::UnknownField => "unknown_field",
            DiagnosticCode::TypeMismatch { .. } => "type_mismatch",
            DiagnosticCode::InvalidValue => "invalid_value",
            DiagnosticCode::NestingTooDeep => "nesting_too_deep",
            DiagnosticCode::DepthExceeded => "depth_exceeded",
            DiagnosticCode::Custom(code) => code,
        }
    }
}

/// A problem found in a remapper tree, located by JSON pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the diagnostic
    pub severity: Severity,
    /// Error code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Location of the offending node
    pub path: JsonPointer,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        path: JsonPointer,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            path,
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Code as a string
    pub fn code_string(&self) -> &str {
        self.code.as_str()
    }

    /// The `(path, message)` pair authoring tools highlight
    pub fn location(&self) -> (String, &str) {
        (self.path.to_string(), &self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_root() {
            "<root>".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{}: {} at {}", self.severity, self.message, path)
    }
}
