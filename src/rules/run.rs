//! RUN: commands that do not belong in an image build.

use crate::instruction::Step;
use crate::rules::{Context, Rule};
use crate::shell::{Command, ParsedShell};
use crate::types::{Severity, Violation};

/// Interactive or diagnostic programs that make no sense at build time.
pub const BAD_COMMANDS: &[&str] = &[
    "free", "kill", "mount", "nano", "ps", "service", "shutdown", "ssh", "top", "vi", "vim",
];

pub const BAD_COMMAND: Rule = Rule {
    code: 1201,
    severity: Severity::Info,
    summary: "Do not RUN `{bin}`",
    url: None,
};

pub const SUDO: Rule = Rule {
    code: 1202,
    severity: Severity::Warning,
    summary: "Do not use `sudo`",
    url: Some(guide!("#user")),
};

pub const APT_UPGRADE: Rule = Rule {
    code: 1203,
    severity: Severity::Info,
    summary: "Avoid running `apt-get {subcmd}`",
    url: None,
};

pub const APT_UPDATE_ALONE: Rule = Rule {
    code: 1204,
    severity: Severity::Warning,
    summary: "Combine `apt-get update` with `apt-get install` in a single RUN",
    url: None,
};

pub fn check(step: &Step, _ctx: &Context<'_>) -> Vec<Violation> {
    let Step::Run(run) = step else {
        return Vec::new();
    };
    let shell = ParsedShell::from_run(run);
    let alone = shell.commands.len() == 1;
    let mut violations = Vec::new();

    for command in &shell.commands {
        let unwrapped;
        let mut command: &Command = command;
        if command.name == "sudo" {
            violations.push(SUDO.violation());
            if let Some(inner) = command.unwrap_sudo() {
                unwrapped = inner;
                command = &unwrapped;
            }
        }

        if BAD_COMMANDS.contains(&command.name.as_str()) {
            violations.push(BAD_COMMAND.format(&[("bin", command.name.as_str())]));
        }

        if command.name == "apt" || command.name == "apt-get" {
            match command.subcommand() {
                Some(subcmd @ ("upgrade" | "dist-upgrade")) => {
                    violations.push(APT_UPGRADE.format(&[("subcmd", subcmd)]));
                }
                Some("update") if alone => violations.push(APT_UPDATE_ALONE.violation()),
                _ => {}
            }
        }
    }
    violations
}
