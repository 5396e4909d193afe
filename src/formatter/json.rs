//! JSON formatter for CI pipelines.

use crate::formatter::Formatter;
use crate::lint::LintResult;
use serde::Serialize;
use std::io::Write;

/// JSON output formatter.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty-print the JSON output.
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON formatter with pretty-printing enabled.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// JSON representation of a violation.
#[derive(Debug, Serialize)]
struct JsonViolation<'a> {
    code: u16,
    rendered: String,
    severity: &'static str,
    summary: &'a str,
    url: Option<&'static str>,
    stage: usize,
    step: usize,
}

impl Formatter for JsonFormatter {
    fn format<W: Write>(&self, result: &LintResult, writer: &mut W) -> std::io::Result<()> {
        let violations: Vec<JsonViolation<'_>> = result
            .violations
            .iter()
            .map(|v| JsonViolation {
                code: v.code.value(),
                rendered: v.rendered_code(),
                severity: v.severity.as_str(),
                summary: &v.summary,
                url: v.url,
                stage: v.stage,
                step: v.step,
            })
            .collect();

        let json = if self.pretty {
            serde_json::to_string_pretty(&violations)
        } else {
            serde_json::to_string(&violations)
        }
        .map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)
    }
}
