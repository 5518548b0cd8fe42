// Error types for remapper evaluation

use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Hard failures that abort a whole evaluation call.
///
/// Malformed input data never ends up here: operators turn it into `null`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Step names an operator the registry does not know
    #[error("Unknown remapper operator '{name}'")]
    UnknownOperator {
        /// Operator name
        name: String,
    },

    /// Object with zero or several keys where a step was expected
    #[error("A remapper step must have exactly one key, found {keys}")]
    MalformedStep {
        /// Number of keys on the object
        keys: usize,
    },

    /// Nested evaluation went past the configured depth
    #[error("Maximum remapper depth of {max_depth} exceeded")]
    DepthExceeded {
        /// Configured maximum
        max_depth: usize,
    },

    /// Payload does not match the operator's declared shape
    #[error("Invalid payload for '{operator}': {message}")]
    InvalidPayload {
        /// Operator name
        operator: String,
        /// What is wrong with it
        message: String,
    },
}

impl EvaluationError {
    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EvaluationError::UnknownOperator { name } => {
                DiagnosticBuilder::unknown_operator(name).build()
            }
            EvaluationError::MalformedStep { keys } => {
                DiagnosticBuilder::malformed_step(*keys).build()
            }
            EvaluationError::DepthExceeded { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::DepthExceeded)
                    .with_message(self.to_string())
                    .build()
            }
            EvaluationError::InvalidPayload { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::InvalidValue)
                    .with_message(self.to_string())
                    .build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let error = EvaluationError::DepthExceeded { max_depth: 8 };
        assert_eq!(error.to_string(), "Maximum remapper depth of 8 exceeded");

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, DiagnosticCode::DepthExceeded);
    }

    #[test]
    fn test_unknown_operator_diagnostic() {
        let error = EvaluationError::UnknownOperator {
            name: "nope".to_string(),
        };
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, DiagnosticCode::UnknownOperator);
        assert!(diagnostic.message.contains("nope"));
    }
}
