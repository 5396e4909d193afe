//! Plain text formatter: one `<code>: <summary>` line per violation.

use crate::formatter::Formatter;
use crate::lint::LintResult;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for TextFormatter {
    fn format<W: Write>(&self, result: &LintResult, writer: &mut W) -> std::io::Result<()> {
        for violation in &result.violations {
            writeln!(writer, "{}", violation)?;
        }
        Ok(())
    }
}
