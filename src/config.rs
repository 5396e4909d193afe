//! Linter configuration.
//!
//! Loaded from YAML or built programmatically:
//!
//! ```yaml
//! ignored: [102, "W0103"]
//! override:
//!   error: [1204]
//! failure-threshold: warning
//! no-fail: false
//! ```
//!
//! Codes may be written as numbers or as rendered codes.

use crate::types::{RuleCode, Severity};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Configuration for the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    /// Rules to drop entirely.
    pub ignored: HashSet<RuleCode>,
    /// Rules reported as errors.
    pub error_rules: HashSet<RuleCode>,
    /// Rules reported as warnings.
    pub warning_rules: HashSet<RuleCode>,
    /// Rules reported as info.
    pub info_rules: HashSet<RuleCode>,
    /// Minimum severity to report.
    pub failure_threshold: Severity,
    /// Never fail, even with violations.
    pub no_fail: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            ignored: HashSet::new(),
            error_rules: HashSet::new(),
            warning_rules: HashSet::new(),
            info_rules: HashSet::new(),
            failure_threshold: Severity::Info,
            no_fail: false,
        }
    }
}

impl LintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml_str(&content)
    }

    /// Load config from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut config = Self::default();
        if value.is_null() {
            return Ok(config);
        }

        if let Some(ignored) = value.get("ignored") {
            config.ignored = parse_codes(ignored, "ignored")?;
        }

        if let Some(overrides) = value.get("override").and_then(|v| v.as_mapping()) {
            if let Some(errors) = overrides.get("error") {
                config.error_rules = parse_codes(errors, "override.error")?;
            }
            if let Some(warnings) = overrides.get("warning") {
                config.warning_rules = parse_codes(warnings, "override.warning")?;
            }
            if let Some(infos) = overrides.get("info") {
                config.info_rules = parse_codes(infos, "override.info")?;
            }
        }

        if let Some(threshold) = value.get("failure-threshold") {
            config.failure_threshold = threshold
                .as_str()
                .and_then(Severity::parse)
                .ok_or_else(|| {
                    ConfigError::Parse(format!("invalid failure-threshold: {:?}", threshold))
                })?;
        }

        if let Some(no_fail) = value.get("no-fail").and_then(|v| v.as_bool()) {
            config.no_fail = no_fail;
        }

        log::debug!(
            "loaded lint config: {} ignored, threshold {}",
            config.ignored.len(),
            config.failure_threshold
        );
        Ok(config)
    }

    /// Check if a rule should be ignored.
    pub fn is_ignored(&self, code: &RuleCode) -> bool {
        self.ignored.contains(code)
    }

    /// Get the effective severity for a rule.
    pub fn effective_severity(&self, code: &RuleCode, default: Severity) -> Severity {
        if self.error_rules.contains(code) {
            return Severity::Error;
        }
        if self.warning_rules.contains(code) {
            return Severity::Warning;
        }
        if self.info_rules.contains(code) {
            return Severity::Info;
        }
        default
    }

    /// Builder method to add an ignored rule.
    pub fn ignore(mut self, code: impl Into<RuleCode>) -> Self {
        self.ignored.insert(code.into());
        self
    }

    /// Builder method to set failure threshold.
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Builder method to report a rule with a different severity.
    pub fn override_severity(mut self, code: impl Into<RuleCode>, severity: Severity) -> Self {
        let code = code.into();
        self.error_rules.remove(&code);
        self.warning_rules.remove(&code);
        self.info_rules.remove(&code);
        match severity {
            Severity::Error => self.error_rules.insert(code),
            Severity::Warning => self.warning_rules.insert(code),
            Severity::Info => self.info_rules.insert(code),
        };
        self
    }
}

fn parse_codes(value: &serde_yaml::Value, key: &str) -> Result<HashSet<RuleCode>, ConfigError> {
    let items = value
        .as_sequence()
        .ok_or_else(|| ConfigError::Parse(format!("`{}` must be a list of rule codes", key)))?;
    items
        .iter()
        .map(|item| {
            let code = match item {
                serde_yaml::Value::Number(n) => n
                    .as_u64()
                    .and_then(|n| u16::try_from(n).ok())
                    .map(RuleCode),
                serde_yaml::Value::String(s) => RuleCode::parse(s),
                _ => None,
            };
            code.ok_or_else(|| {
                ConfigError::Parse(format!("invalid rule code in `{}`: {:?}", key, item))
            })
        })
        .collect()
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
