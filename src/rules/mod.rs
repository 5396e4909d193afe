//! Rule engine for linting stages.
//!
//! Each stage is walked once in lint order (build steps, then run steps).
//! A pre-pass records where every step kind first and last occurs, so rules
//! can ask positional questions in constant time. Every step is dispatched
//! through a static table from [`StepKind`] to the checks for that kind.
//!
//! - `from` - base image and FROM placement
//! - `run` - commands executed by RUN
//! - `cmd` - CMD count and form
//! - `expose` - port range
//! - `user` - final user
//! - `workdir` - relative paths

/// URL of a section of Docker's Dockerfile best-practices guide.
macro_rules! guide {
    ($anchor:literal) => {
        concat!(
            "https://docs.docker.com/develop/develop-images/dockerfile_best-practices/",
            $anchor
        )
    };
}

pub mod cmd;
pub mod expose;
pub mod from;
pub mod run;
pub mod user;
pub mod workdir;

use crate::instruction::{Step, StepKind};
use crate::stage::Stage;
use crate::types::{Severity, Violation};
use std::collections::HashMap;

/// Best-practices guide the rule URLs point into.
pub const DOCKER_GUIDE: &str = guide!("");

/// A rule check: inspects one step in its context.
pub type Check = fn(&Step, &Context<'_>) -> Vec<Violation>;

/// A catalogue entry: code, default severity and summary template.
///
/// Templates use `{name}` placeholders filled in by [`Rule::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub code: u16,
    pub severity: Severity,
    pub summary: &'static str,
    pub url: Option<&'static str>,
}

impl Rule {
    /// A violation of this rule with the summary used as-is.
    pub fn violation(&self) -> Violation {
        self.format(&[])
    }

    /// A violation of this rule with placeholders substituted.
    pub fn format(&self, args: &[(&str, &str)]) -> Violation {
        let summary = args.iter().fold(self.summary.to_string(), |summary, (key, value)| {
            summary.replace(&format!("{{{}}}", key), value)
        });
        let violation = Violation::new(self.code, self.severity, summary);
        match self.url {
            Some(url) => violation.with_url(url),
            None => violation,
        }
    }
}

/// Every rule, ordered by code.
pub fn catalogue() -> Vec<&'static Rule> {
    vec![
        &from::ONLY_ARG_BEFORE_FROM,
        &from::MISSING_TAG,
        &from::LATEST_TAG,
        &from::EMPTY_IMAGE_NAME,
        &cmd::SINGLE_CMD,
        &cmd::SHELL_FORM_CMD,
        &expose::PORT_RANGE,
        &run::BAD_COMMAND,
        &run::SUDO,
        &run::APT_UPGRADE,
        &run::APT_UPDATE_ALONE,
        &user::ROOT_USER,
        &workdir::RELATIVE_WORKDIR,
    ]
}

/// Step kinds of a stage with the first and last index of each kind.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    kinds: Vec<StepKind>,
    spans: HashMap<StepKind, (usize, usize)>,
}

impl Layout {
    pub fn new(kinds: Vec<StepKind>) -> Self {
        let mut spans = HashMap::new();
        for (index, kind) in kinds.iter().enumerate() {
            spans
                .entry(*kind)
                .and_modify(|span: &mut (usize, usize)| span.1 = index)
                .or_insert((index, index));
        }
        Self { kinds, spans }
    }

    /// Context for the step at `index`, `None` past the last step.
    pub fn at(&self, index: usize) -> Option<Context<'_>> {
        (index < self.kinds.len()).then_some(Context {
            layout: self,
            index,
        })
    }
}

/// Position of the current step within its stage. Always in bounds.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    layout: &'a Layout,
    index: usize,
}

impl<'a> Context<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Kind of the current step.
    pub fn kind(&self) -> StepKind {
        self.layout.kinds[self.index]
    }

    /// All step kinds of the stage, in lint order.
    pub fn kinds(&self) -> &'a [StepKind] {
        &self.layout.kinds
    }

    /// Kinds of the steps before the current one.
    pub fn preceding(&self) -> &'a [StepKind] {
        &self.layout.kinds[..self.index]
    }

    /// Check if no earlier step has the same kind.
    pub fn is_first(&self) -> bool {
        self.span().0 == self.index
    }

    /// Check if no later step has the same kind.
    pub fn is_last(&self) -> bool {
        self.span().1 == self.index
    }

    fn span(&self) -> (usize, usize) {
        self.layout
            .spans
            .get(&self.kind())
            .copied()
            .unwrap_or((self.index, self.index))
    }
}

const FROM_CHECKS: &[Check] = &[from::check];
const RUN_CHECKS: &[Check] = &[run::check];
const CMD_CHECKS: &[Check] = &[cmd::check];
const EXPOSE_CHECKS: &[Check] = &[expose::check];
const USER_CHECKS: &[Check] = &[user::check];
const WORKDIR_CHECKS: &[Check] = &[workdir::check];

/// Checks registered for a step kind.
pub fn checks_for(kind: StepKind) -> &'static [Check] {
    match kind {
        StepKind::From => FROM_CHECKS,
        StepKind::Run => RUN_CHECKS,
        StepKind::Cmd => CMD_CHECKS,
        StepKind::Expose => EXPOSE_CHECKS,
        StepKind::User => USER_CHECKS,
        StepKind::Workdir => WORKDIR_CHECKS,
        StepKind::Arg
        | StepKind::Label
        | StepKind::Env
        | StepKind::Download
        | StepKind::Clone
        | StepKind::Extract
        | StepKind::Copy
        | StepKind::Entrypoint
        | StepKind::Volume
        | StepKind::Onbuild
        | StepKind::Stopsignal
        | StepKind::Healthcheck
        | StepKind::Shell => &[],
    }
}

/// Lint one stage, yielding violations in step order.
///
/// `stage_index` is recorded in every violation.
pub fn check_stage(stage_index: usize, stage: &Stage) -> impl Iterator<Item = Violation> + '_ {
    let layout = Layout::new(stage.steps().map(Step::kind).collect());
    log::trace!("linting stage {} with {} step(s)", stage_index, layout.kinds.len());
    stage
        .steps()
        .enumerate()
        .flat_map(move |(index, step)| {
            let Some(ctx) = layout.at(index) else {
                return Vec::new();
            };
            checks_for(step.kind())
                .iter()
                .flat_map(|check| check(step, &ctx))
                .map(|violation| violation.at(stage_index, index))
                .collect::<Vec<_>>()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::reference::BaseImage;

    #[test]
    fn test_context_first_and_last() {
        let layout = Layout::new(vec![
            StepKind::From,
            StepKind::Cmd,
            StepKind::Run,
            StepKind::Cmd,
        ]);
        let first_cmd = layout.at(1).unwrap();
        assert!(first_cmd.is_first());
        assert!(!first_cmd.is_last());
        assert_eq!(first_cmd.preceding(), &[StepKind::From]);

        let last_cmd = layout.at(3).unwrap();
        assert!(!last_cmd.is_first());
        assert!(last_cmd.is_last());

        let run = layout.at(2).unwrap();
        assert!(run.is_first() && run.is_last());
        assert_eq!(run.kinds().len(), 4);

        assert!(layout.at(4).is_none());
        assert!(Layout::default().at(0).is_none());
    }

    #[test]
    fn test_rule_format() {
        let violation = run::BAD_COMMAND.format(&[("bin", "vim")]);
        assert_eq!(violation.to_string(), "I1201: Do not RUN `vim`");
        assert_eq!(violation.url, None);

        let violation = workdir::RELATIVE_WORKDIR.violation();
        assert!(violation.url.is_some_and(|url| url.ends_with("#workdir")));
    }

    #[test]
    fn test_catalogue_codes_are_unique() {
        let rules = catalogue();
        let mut codes: Vec<u16> = rules.iter().map(|r| r.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), rules.len());
    }

    #[test]
    fn test_unchecked_kinds_have_no_rules() {
        assert!(checks_for(StepKind::Copy).is_empty());
        assert_eq!(checks_for(StepKind::Run).len(), 1);
    }

    #[test]
    fn test_check_stage_positions() {
        let stage = Stage::builder()
            .step(Step::base(BaseImage::tagged("alpine", "3.18")))
            .step(Step::workdir("app").unwrap())
            .step(Step::cmd("a"))
            .step(Step::cmd("b"))
            .finish()
            .unwrap();
        let violations: Vec<_> = check_stage(2, &stage).collect();
        let positions: Vec<_> = violations
            .iter()
            .map(|v| (v.rendered_code(), v.stage, v.step))
            .collect();
        assert_eq!(
            positions,
            vec![("W1701".to_string(), 2, 1), ("W0301".to_string(), 2, 2)]
        );
    }
}
