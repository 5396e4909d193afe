//! EXPOSE: port must be a valid TCP/UDP port.

use crate::instruction::Step;
use crate::rules::{Context, Rule};
use crate::types::{Severity, Violation};

pub const PORT_RANGE: Rule = Rule {
    code: 801,
    severity: Severity::Error,
    summary: "The port must be in 0-65535 range",
    url: None,
};

pub fn check(step: &Step, _ctx: &Context<'_>) -> Vec<Violation> {
    match step {
        Step::Expose(port) if !(0 < port.number && port.number < 65535) => {
            vec![PORT_RANGE.violation()]
        }
        _ => Vec::new(),
    }
}
