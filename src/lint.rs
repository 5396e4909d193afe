//! Lint orchestration.
//!
//! [`Image::lint`] yields the raw violation stream. This module applies a
//! [`LintConfig`] on top of it: ignored codes are dropped, severity
//! overrides are applied and anything below the failure threshold is
//! filtered out. Encounter order is kept.

use crate::config::LintConfig;
use crate::image::Image;
use crate::types::{Severity, Violation};

/// Result of linting an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintResult {
    /// Violations found, in stage then step order.
    pub violations: Vec<Violation>,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Error)
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Warning)
    }

    /// Get the maximum severity in the results.
    pub fn max_severity(&self) -> Option<Severity> {
        self.violations.iter().map(|v| v.severity).max()
    }

    /// Check if the results should cause a non-zero exit.
    pub fn should_fail(&self, config: &LintConfig) -> bool {
        if config.no_fail {
            return false;
        }
        self.max_severity()
            .is_some_and(|max| max >= config.failure_threshold)
    }

    /// Exit status for a lint run: the number of violations, capped at 100.
    pub fn exit_code(&self) -> i32 {
        self.violations.len().min(100) as i32
    }
}

/// Lint an image with the given configuration.
pub fn lint(image: &Image, config: &LintConfig) -> LintResult {
    let violations: Vec<Violation> = image
        .lint()
        .filter(|v| {
            let ignored = config.is_ignored(&v.code);
            if ignored {
                log::trace!("ignoring {} at stage {} step {}", v.code, v.stage, v.step);
            }
            !ignored
        })
        .map(|mut v| {
            v.severity = config.effective_severity(&v.code, v.severity);
            v
        })
        .filter(|v| v.severity >= config.failure_threshold)
        .collect();

    log::debug!(
        "linted {} stage(s), {} violation(s) reported",
        image.stages().len(),
        violations.len()
    );
    LintResult { violations }
}
