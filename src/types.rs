//! Core linter types:
//! - `Severity` - violation severity levels
//! - `RuleCode` - numeric rule identifiers (e.g. `1204`, shown as `W1204`)
//! - `Violation` - a single reported finding

use std::cmp::Ordering;
use std::fmt;

/// Severity levels for rule violations.
///
/// Ordered from most severe to least severe: `Error > Warning > Info`.
/// The order only matters for reporting and thresholds, never for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// The generated Dockerfile is likely broken
    Error,
    /// Bad practice that should usually be fixed
    Warning,
    /// Suggestions for improvement
    #[default]
    Info,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Upper-case initial used in rendered codes (`E`, `W`, `I`).
    pub fn initial(&self) -> char {
        match self {
            Self::Error => 'E',
            Self::Warning => 'W',
            Self::Info => 'I',
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Error => 2,
            Self::Warning => 1,
            Self::Info => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A numeric rule code.
///
/// The hundreds group the rules by instruction: `1xx` FROM, `3xx` CMD,
/// `8xx` EXPOSE, `12xx` RUN, `15xx` USER, `17xx` WORKDIR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleCode(pub u16);

impl RuleCode {
    /// Parse `1204`, `"1204"`, `"01204"` or a rendered code such as `"W1204"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s.strip_prefix(|c: char| c.is_ascii_alphabetic()).unwrap_or(s);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl From<u16> for RuleCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// A violation found during linting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The rule code that was violated.
    pub code: RuleCode,
    /// The severity of the violation.
    pub severity: Severity,
    /// A human-readable summary.
    pub summary: String,
    /// Link to the relevant best-practices section.
    pub url: Option<&'static str>,
    /// Index of the stage in the image.
    pub stage: usize,
    /// Index of the step in the stage's lint order (build steps, then run steps).
    pub step: usize,
}

impl Violation {
    /// Create a violation at the first step of the first stage.
    pub fn new(code: u16, severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            code: RuleCode(code),
            severity,
            summary: summary.into(),
            url: None,
            stage: 0,
            step: 0,
        }
    }

    pub fn with_url(mut self, url: &'static str) -> Self {
        self.url = Some(url);
        self
    }

    /// Set the position of the offending step.
    pub fn at(mut self, stage: usize, step: usize) -> Self {
        self.stage = stage;
        self.step = step;
        self
    }

    /// Rendered code, e.g. `W0301`.
    pub fn rendered_code(&self) -> String {
        format!("{}{}", self.severity.initial(), self.code)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rendered_code(), self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(
            [Severity::Info, Severity::Error, Severity::Warning].iter().max(),
            Some(&Severity::Error)
        );
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("WARNING"), Some(Severity::Warning));
        assert_eq!(Severity::parse("Info"), Some(Severity::Info));
        assert_eq!(Severity::parse("style"), None);
    }

    #[test]
    fn test_rule_code_parse() {
        assert_eq!(RuleCode::parse("1204"), Some(RuleCode(1204)));
        assert_eq!(RuleCode::parse("W0103"), Some(RuleCode(103)));
        assert_eq!(RuleCode::parse("0801"), Some(RuleCode(801)));
        assert_eq!(RuleCode::parse("DL3008"), None);
        assert_eq!(RuleCode::parse("W"), None);
        assert_eq!(RuleCode::parse(""), None);
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::new(1701, Severity::Warning, "WORKDIR path should be absolute");
        assert_eq!(v.to_string(), "W1701: WORKDIR path should be absolute");
        let v = Violation::new(101, Severity::Error, "Only ARG can go before FROM but found RUN");
        assert_eq!(v.rendered_code(), "E0101");
    }
}
