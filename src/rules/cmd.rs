//! CMD: only the last one takes effect, and exec form is preferred.

use crate::instruction::Step;
use crate::rules::{Context, Rule};
use crate::types::{Severity, Violation};

pub const SINGLE_CMD: Rule = Rule {
    code: 301,
    severity: Severity::Warning,
    summary: "There should be only one CMD",
    url: None,
};

pub const SHELL_FORM_CMD: Rule = Rule {
    code: 302,
    severity: Severity::Info,
    summary: "Prefer exec form over shell form for CMD",
    url: Some(guide!("#cmd")),
};

pub fn check(step: &Step, ctx: &Context<'_>) -> Vec<Violation> {
    let Step::Cmd(cmd) = step else {
        return Vec::new();
    };
    let mut violations = Vec::new();
    if !ctx.is_last() {
        violations.push(SINGLE_CMD.violation());
    }
    if cmd.shell {
        violations.push(SHELL_FORM_CMD.violation());
    }
    violations
}
