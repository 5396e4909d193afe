//! Output formatters for lint results.
//!
//! - **Text**: one `<code>: <summary>` line per violation
//! - **TTY**: the same lines, coloured by severity, with guide links
//! - **JSON**: machine-readable array for CI pipelines

mod json;
mod text;
mod tty;

pub use json::JsonFormatter;
pub use text::TextFormatter;
pub use tty::TtyFormatter;

use crate::lint::LintResult;
use std::io::Write;

/// Output format for lint results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain lines (default)
    #[default]
    Text,
    /// Coloured terminal output
    Tty,
    /// JSON array
    Json,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "tty" | "terminal" | "color" => Some(Self::Tty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get all available format names.
    pub fn all_names() -> &'static [&'static str] {
        &["text", "tty", "json"]
    }
}

/// Trait for formatting lint results.
pub trait Formatter {
    /// Format the lint result and write to the given writer.
    fn format<W: Write>(&self, result: &LintResult, writer: &mut W) -> std::io::Result<()>;

    /// Format the lint result to a string.
    fn format_to_string(&self, result: &LintResult) -> String {
        let mut buf = Vec::new();
        self.format(result, &mut buf).unwrap_or_default();
        String::from_utf8(buf).unwrap_or_default()
    }
}

/// Format a lint result using the specified output format.
pub fn format_result<W: Write>(
    result: &LintResult,
    format: OutputFormat,
    writer: &mut W,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => TextFormatter::new().format(result, writer),
        OutputFormat::Tty => TtyFormatter::new().format(result, writer),
        OutputFormat::Json => JsonFormatter::new().format(result, writer),
    }
}

/// Format a lint result to a string using the specified output format.
pub fn format_result_to_string(result: &LintResult, format: OutputFormat) -> String {
    let mut buf = Vec::new();
    format_result(result, format, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}
