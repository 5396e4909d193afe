//! Shell command extraction from RUN instructions.
//!
//! A RUN command is split into simple commands on `&&`, `||`, `;`, `|` and
//! newlines (outside quotes), and each simple command is split into words
//! with POSIX rules. Rules then look at command names and arguments.

use crate::format::split_words;
use crate::instruction::{Arguments, RunArgs};

/// Parsed shell command information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedShell {
    /// Extracted simple commands, in order.
    pub commands: Vec<Command>,
}

impl ParsedShell {
    /// Parse a shell script.
    pub fn parse(script: &str) -> Self {
        let mut shell = Self::default();
        for segment in split_segments(script) {
            if let Some(command) = Command::from_words(split_words(&segment)) {
                shell.commands.push(command);
            }
        }
        shell
    }

    /// Parse every command of a RUN step.
    ///
    /// Exec form is one command; shell form may hold several.
    pub fn from_run(run: &RunArgs) -> Self {
        let mut shell = match (run.first(), run.is_shell()) {
            (Arguments::Text(text), true) => Self::parse(text),
            (first, _) => Self {
                commands: Command::from_words(first.words()).into_iter().collect(),
            },
        };
        for cmd in run.rest() {
            shell.commands.extend(Self::parse(cmd).commands);
        }
        shell
    }
}

/// A single simple command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name (e.g., "apt-get", "sudo").
    pub name: String,
    /// All arguments including flags.
    pub arguments: Vec<String>,
}

impl Command {
    /// Build a command from its words; `None` when there are none.
    pub fn from_words(words: Vec<String>) -> Option<Self> {
        let mut words = words.into_iter();
        let name = words.next()?;
        Some(Self {
            name,
            arguments: words.collect(),
        })
    }

    /// The command run by `sudo`, if this is a `sudo` invocation with one.
    pub fn unwrap_sudo(&self) -> Option<Command> {
        if self.name != "sudo" {
            return None;
        }
        Self::from_words(self.arguments.clone())
    }

    /// First argument that is not a flag, e.g. `install` in `apt-get -y install`.
    pub fn subcommand(&self) -> Option<&str> {
        self.arguments
            .iter()
            .map(String::as_str)
            .find(|arg| !arg.starts_with('-'))
    }
}

/// Split a script into simple-command segments on control operators,
/// honoring quotes and backslash escapes. Line continuations become spaces.
fn split_segments(script: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(c);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(c);
            }
            '\\' if !in_single => match chars.next() {
                Some('\n') => current.push(' '),
                Some(next) => {
                    current.push(c);
                    current.push(next);
                }
                None => current.push(c),
            },
            _ if in_single || in_double => current.push(c),
            '&' if chars.peek() == Some(&'&') => {
                chars.next();
                segments.push(std::mem::take(&mut current));
            }
            '|' => {
                if chars.peek() == Some(&'|') {
                    chars.next();
                }
                segments.push(std::mem::take(&mut current));
            }
            ';' | '\n' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments.retain(|segment| !segment.trim().is_empty());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        let shell = ParsedShell::parse("apt-get update");
        assert_eq!(shell.commands.len(), 1);
        assert_eq!(shell.commands[0].name, "apt-get");
        assert_eq!(shell.commands[0].arguments, vec!["update"]);
    }

    #[test]
    fn test_parse_chained_commands() {
        let shell = ParsedShell::parse("apt-get update && apt-get install -y nginx; echo done");
        assert_eq!(shell.commands.len(), 3);
        assert_eq!(shell.commands[1].subcommand(), Some("install"));
        assert_eq!(shell.commands[1].arguments, vec!["install", "-y", "nginx"]);
        assert_eq!(shell.commands[2].name, "echo");
    }

    #[test]
    fn test_parse_pipe() {
        let shell = ParsedShell::parse("cat file | grep pattern || true");
        let names: Vec<&str> = shell.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["cat", "grep", "true"]);
    }

    #[test]
    fn test_operators_inside_quotes() {
        let shell = ParsedShell::parse("sh -c 'make && make install' ; echo \"a|b\"");
        assert_eq!(shell.commands.len(), 2);
        assert_eq!(shell.commands[0].arguments, vec!["-c", "make && make install"]);
        assert_eq!(shell.commands[1].arguments, vec!["a|b"]);
    }

    #[test]
    fn test_line_continuation() {
        let shell = ParsedShell::parse("apt-get install -y \\\n    curl \\\n    git");
        assert_eq!(shell.commands.len(), 1);
        assert_eq!(shell.commands[0].arguments, vec!["install", "-y", "curl", "git"]);
    }

    #[test]
    fn test_sudo() {
        let shell = ParsedShell::parse("sudo apt-get -y upgrade");
        let inner = shell.commands[0].unwrap_sudo().unwrap();
        assert_eq!(inner.name, "apt-get");
        assert_eq!(inner.subcommand(), Some("upgrade"));
        assert!(ParsedShell::parse("sudo").commands[0].unwrap_sudo().is_none());
    }

    #[test]
    fn test_from_run() {
        let run = RunArgs::chain(["dpkg -i /root/hugo.deb", "hugo -t theme"]).unwrap();
        let shell = ParsedShell::from_run(&run);
        assert_eq!(shell.commands.len(), 2);
        assert_eq!(shell.commands[1].name, "hugo");

        let exec = RunArgs::exec(["apt-get", "update"]).unwrap();
        let shell = ParsedShell::from_run(&exec);
        assert_eq!(shell.commands.len(), 1);
        assert_eq!(shell.commands[0].subcommand(), Some("update"));
    }
}
