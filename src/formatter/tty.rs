//! TTY formatter.
//!
//! Severity-coloured lines prefixed with the violation's position, followed
//! by a summary of counts. Uses the `colored` crate.

use crate::formatter::Formatter;
use crate::lint::LintResult;
use crate::types::{Severity, Violation};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// TTY (terminal) output formatter with colors.
#[derive(Debug, Clone)]
pub struct TtyFormatter {
    /// Use colors in output.
    pub colors: bool,
    /// Append the best-practices link when a rule has one.
    pub show_urls: bool,
}

impl Default for TtyFormatter {
    fn default() -> Self {
        Self {
            colors: true,
            show_urls: true,
        }
    }
}

impl TtyFormatter {
    /// Create a new TTY formatter with colors enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a TTY formatter without colors.
    pub fn no_color() -> Self {
        Self {
            colors: false,
            ..Self::default()
        }
    }

    fn paint(&self, text: &str, severity: Severity) -> String {
        if !self.colors {
            return text.to_string();
        }
        let painted: ColoredString = match severity {
            Severity::Error => text.red().bold(),
            Severity::Warning => text.yellow().bold(),
            Severity::Info => text.cyan().bold(),
        };
        painted.to_string()
    }

    fn dim(&self, text: &str) -> String {
        if self.colors {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn write_violation<W: Write>(
        &self,
        violation: &Violation,
        writer: &mut W,
    ) -> std::io::Result<()> {
        let position = format!("stage {} step {}", violation.stage, violation.step);
        write!(
            writer,
            "{} {}: {}",
            self.dim(&position),
            self.paint(&violation.rendered_code(), violation.severity),
            violation.summary
        )?;
        match violation.url {
            Some(url) if self.show_urls => writeln!(writer, " {}", self.dim(&format!("({})", url))),
            _ => writeln!(writer),
        }
    }
}

impl Formatter for TtyFormatter {
    fn format<W: Write>(&self, result: &LintResult, writer: &mut W) -> std::io::Result<()> {
        if result.violations.is_empty() {
            return Ok(());
        }

        for violation in &result.violations {
            self.write_violation(violation, writer)?;
        }

        let count = |severity: Severity| {
            result
                .violations
                .iter()
                .filter(|v| v.severity == severity)
                .count()
        };
        let parts: Vec<String> = [
            (Severity::Error, "error"),
            (Severity::Warning, "warning"),
            (Severity::Info, "info"),
        ]
        .into_iter()
        .filter_map(|(severity, noun)| {
            let n = count(severity);
            let plural = if n == 1 || severity == Severity::Info { "" } else { "s" };
            (n > 0).then(|| self.paint(&format!("{} {}{}", n, noun, plural), severity))
        })
        .collect();

        writeln!(writer)?;
        writeln!(writer, "{}", parts.join(", "))
    }
}
