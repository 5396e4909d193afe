//! Formatting utilities shared by instruction renderers.
//!
//! Instruction arguments have two canonical forms:
//! - shell form, a single string handed to the shell as-is;
//! - exec form, a JSON array of arguments executed without a shell.

use crate::error::{DockedError, Result};
use crate::instruction::Arguments;
use crate::instruction::reference::StageRef;

/// Render a command in shell or exec form.
///
/// In shell form a text command passes through unchanged and a list is
/// shell-quoted and joined with spaces. In exec form a text command is split
/// with POSIX word rules and emitted, like a list, as a JSON array.
pub fn format_command(cmd: &Arguments, shell: bool) -> String {
    match (cmd, shell) {
        (Arguments::Text(text), true) => text.clone(),
        (Arguments::List(items), true) => shell_words::join(items),
        (Arguments::Text(text), false) => json_array(&split_words(text)),
        (Arguments::List(items), false) => json_array(items),
    }
}

/// Join path-like values with spaces, or emit a JSON array if any value
/// contains a space.
pub fn join_paths<S: AsRef<str>>(values: &[S]) -> String {
    if values.iter().any(|v| v.as_ref().contains(' ')) {
        json_array(values)
    } else {
        values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolve a stage reference to the name used in `--from=`.
///
/// `reference` names the place the reference was made and ends up in the
/// error when the stage is unnamed or gone.
pub fn resolve_stage_name(stage: &StageRef, reference: &str) -> Result<String> {
    match stage {
        StageRef::Name(name) if name.is_empty() => Err(DockedError::MissingName {
            reference: reference.to_string(),
        }),
        StageRef::Name(name) => Ok(name.clone()),
        StageRef::Image(image) => Ok(image.to_string()),
        StageRef::Stage(weak) => {
            let stage = weak.upgrade().ok_or_else(|| DockedError::DanglingStage {
                reference: reference.to_string(),
            })?;
            stage
                .name()
                .map(str::to_string)
                .ok_or_else(|| DockedError::MissingName {
                    reference: reference.to_string(),
                })
        }
    }
}

/// JSON array literal with `", "` separators: `["a", "b"]`.
pub fn json_array<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| serde_json::Value::String(item.as_ref().to_string()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Split a command line into words, falling back to whitespace splitting
/// when the quoting is unbalanced.
pub fn split_words(text: &str) -> Vec<String> {
    match shell_words::split(text) {
        Ok(words) => words,
        Err(err) => {
            log::warn!(
                "cannot split `{}` with shell rules ({}), splitting on whitespace",
                text,
                err
            );
            text.split_whitespace().map(str::to_string).collect()
        }
    }
}

/// Double-quote a LABEL/ENV value when it is empty or contains a space.
///
/// Embedded newlines are escaped as `\n` inside the quotes.
pub fn quote_value(value: &str) -> String {
    if value.is_empty() || value.contains(' ') {
        format!("\"{}\"", value.replace('\n', "\\n"))
    } else {
        value.to_string()
    }
}
