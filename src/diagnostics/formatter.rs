//! Formatting diagnostics for different output formats

use super::diagnostic::Diagnostic;
#[cfg(feature = "terminal")]
use super::diagnostic::Severity;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
    /// Compact single-line format
    Compact,
}

/// Formatter for diagnostics
pub struct DiagnosticFormatter {
    format: Format,
    show_code: bool,
    #[cfg(feature = "terminal")]
    use_color: bool,
}

impl DiagnosticFormatter {
    /// Create a new formatter
    pub fn new(format: Format) -> Self {
        Self {
            format,
            show_code: true,
            #[cfg(feature = "terminal")]
            use_color: true,
        }
    }

    /// Set whether to show error codes
    pub fn with_code(mut self, show: bool) -> Self {
        self.show_code = show;
        self
    }

    /// Set whether to use color (terminal feature only)
    #[cfg(feature = "terminal")]
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Format a diagnostic
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        match self.format {
            Format::Text => self.format_text(diagnostic),
            Format::Json => serde_json::to_string_pretty(diagnostic)
                .unwrap_or_else(|_| format!("{diagnostic:?}")),
            Format::Compact => self.format_compact(diagnostic),
        }
    }

    /// Format multiple diagnostics
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        match self.format {
            Format::Text => diagnostics
                .iter()
                .map(|d| self.format_text(d))
                .collect::<Vec<_>>()
                .join("\n"),
            Format::Json => serde_json::to_string_pretty(diagnostics)
                .unwrap_or_else(|_| format!("{diagnostics:?}")),
            Format::Compact => diagnostics
                .iter()
                .map(|d| self.format_compact(d))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn format_text(&self, diagnostic: &Diagnostic) -> String {
        let mut result = self.header(diagnostic);

        if self.show_code {
            result.push_str(&format!(" [{}]", diagnostic.code_string()));
        }
        result.push('\n');

        let path = diagnostic.path.to_string();
        let path = if path.is_empty() { "<root>" } else { path.as_str() };
        result.push_str(&format!(" --> {path}\n"));
        result
    }

    #[cfg(feature = "terminal")]
    fn header(&self, diagnostic: &Diagnostic) -> String {
        if !self.use_color {
            return format!("{}: {}", diagnostic.severity, diagnostic.message);
        }
        use colored::Colorize;
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Hint => "hint".green().bold(),
        };
        format!("{}: {}", severity, diagnostic.message.bold())
    }

    #[cfg(not(feature = "terminal"))]
    fn header(&self, diagnostic: &Diagnostic) -> String {
        format!("{}: {}", diagnostic.severity, diagnostic.message)
    }

    fn format_compact(&self, diagnostic: &Diagnostic) -> String {
        let code = if self.show_code {
            format!("[{}] ", diagnostic.code_string())
        } else {
            String::new()
        };

        format!(
            "{}: {}: {}{}",
            diagnostic.path, diagnostic.severity, code, diagnostic.message
        )
    }
}

impl Default for DiagnosticFormatter {
    fn default() -> Self {
        Self::new(Format::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::builder::DiagnosticBuilder;
    use crate::model::JsonPointer;

    #[test]
    fn test_text_format() {
        let diagnostic = DiagnosticBuilder::unknown_operator("foo").build();

        let formatter = DiagnosticFormatter::new(Format::Text).with_code(false);
        #[cfg(feature = "terminal")]
        let formatter = formatter.with_color(false);
        let output = formatter.format(&diagnostic);

        assert!(output.contains("error: Unknown remapper operator 'foo'"));
        assert!(output.contains("--> <root>"));
    }

    #[test]
    fn test_compact_format() {
        let diagnostic = DiagnosticBuilder::missing_field("if", "condition")
            .at(&JsonPointer::root().index(1).key("if"))
            .build();

        let output = DiagnosticFormatter::new(Format::Compact).format(&diagnostic);
        assert_eq!(
            output,
            "/1/if: error: [missing_field] 'if' requires the field 'condition'"
        );
    }

    #[test]
    fn test_json_format() {
        let diagnostics = vec![DiagnosticBuilder::unknown_operator("foo")
            .at(&JsonPointer::root().key("x"))
            .build()];
        let output = DiagnosticFormatter::new(Format::Json).format_all(&diagnostics);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["path"], "/x");
        assert_eq!(parsed[0]["severity"], "error");
        assert_eq!(parsed[0]["code"], "unknown_operator");
    }
}
