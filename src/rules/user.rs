//! USER: the image should not end up running as root.

use crate::instruction::Step;
use crate::rules::{Context, Rule};
use crate::types::{Severity, Violation};

pub const ROOT_USER: Rule = Rule {
    code: 1501,
    severity: Severity::Warning,
    summary: "Last USER should not be root",
    url: Some(guide!("#user")),
};

pub fn check(step: &Step, ctx: &Context<'_>) -> Vec<Violation> {
    match step {
        Step::User(user) if ctx.is_last() && user.is_root() => vec![ROOT_USER.violation()],
        _ => Vec::new(),
    }
}
