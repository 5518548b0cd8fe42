//! Evaluation limits shared by the engine and the validator

use serde::{Deserialize, Serialize};

/// Configuration for remapper evaluation and validation
///
/// # Examples
///
/// ```rust
/// use remapper_engine::EvaluationConfig;
///
/// let config = EvaluationConfig {
///     max_depth: 16,
///     ..EvaluationConfig::default()
/// };
/// assert_eq!(config.max_history, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluationConfig {
    /// Maximum nesting of sub-remapper evaluations before a hard error
    pub max_depth: usize,
    /// Number of previous values the history operators can reach
    pub max_history: usize,
    /// Locale used when the caller does not supply one, and the message
    /// catalogue's last fallback
    pub default_locale: String,
    /// Longest string `random.string` may build
    pub max_string_length: usize,
}

impl EvaluationConfig {
    /// Create a configuration with custom limits
    pub fn new(max_depth: usize, max_history: usize) -> Self {
        Self {
            max_depth,
            max_history,
            ..Self::default()
        }
    }

    /// Tight limits for untrusted, user-authored trees
    pub fn sandboxed() -> Self {
        Self::new(16, 8)
    }

    /// Generous limits for trusted, generated trees
    pub fn permissive() -> Self {
        Self::new(256, 128)
    }

    /// Replace the `random.string` length cap
    pub fn with_max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length;
        self
    }

    /// Replace the default locale
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_history: 32,
            default_locale: "en".to_string(),
            max_string_length: 65_536,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EvaluationConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.max_history, 32);
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.max_string_length, 65_536);
    }

    #[test]
    fn test_presets() {
        assert!(EvaluationConfig::sandboxed().max_depth < EvaluationConfig::default().max_depth);
        assert!(EvaluationConfig::permissive().max_depth > EvaluationConfig::default().max_depth);
    }

    #[test]
    fn test_partial_json_config() {
        let config: EvaluationConfig =
            serde_json::from_str(r#"{ "maxDepth": 10, "defaultLocale": "nl" }"#).unwrap();
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.max_history, 32);
        assert_eq!(config.default_locale, "nl");
    }
}
