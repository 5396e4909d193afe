//! WORKDIR: use absolute paths.

use crate::instruction::Step;
use crate::rules::{Context, Rule};
use crate::types::{Severity, Violation};

pub const RELATIVE_WORKDIR: Rule = Rule {
    code: 1701,
    severity: Severity::Warning,
    summary: "WORKDIR path should be absolute",
    url: Some(guide!("#workdir")),
};

pub fn check(step: &Step, _ctx: &Context<'_>) -> Vec<Violation> {
    match step {
        Step::Workdir(path) if !path.starts_with('/') => vec![RELATIVE_WORKDIR.violation()],
        _ => Vec::new(),
    }
}
