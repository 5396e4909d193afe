//! Build stages.
//!
//! A stage is one FROM-to-FROM section of a Dockerfile: build steps that run
//! while the image is built, run steps that only configure containers, and
//! image labels.

use crate::error::{DockedError, Result};
use crate::format::quote_value;
use crate::instruction::{Step, StepKind, StepRole};
use crate::version::SyntaxVersion;

/// One stage of an image. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stage {
    build: Vec<Step>,
    run: Vec<Step>,
    labels: Vec<(String, String)>,
}

impl Stage {
    /// Create a stage from its two step groups.
    ///
    /// Every step must have the role of the group it is placed in.
    pub fn new(build: Vec<Step>, run: Vec<Step>) -> Result<Self> {
        check_role(&build, StepRole::Build)?;
        check_role(&run, StepRole::Run)?;
        Ok(Self {
            build,
            run,
            labels: Vec::new(),
        })
    }

    pub fn builder() -> StageBuilder {
        StageBuilder::default()
    }

    pub fn build_steps(&self) -> &[Step] {
        &self.build
    }

    pub fn run_steps(&self) -> &[Step] {
        &self.run
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> &[(String, String)] {
        &self.labels
    }

    /// All steps in lint order: build steps, then run steps.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.build.iter().chain(self.run.iter())
    }

    /// Name declared by the first FROM (`AS name`), if any. An empty alias
    /// is no name.
    pub fn name(&self) -> Option<&str> {
        self.build
            .iter()
            .find_map(|step| match step {
                Step::From(from) => Some(from.name.as_deref()),
                _ => None,
            })?
            .filter(|name| !name.is_empty())
    }

    /// Highest minimum version over all steps, baseline when empty.
    pub fn min_version(&self) -> SyntaxVersion {
        SyntaxVersion::max_of(self.steps().map(Step::min_version))
    }

    /// Instructions of this stage in output order.
    ///
    /// Labels follow the FROM line; build steps come before run steps.
    pub fn lines(&self) -> impl Iterator<Item = Result<String>> + '_ {
        let split = self
            .build
            .iter()
            .position(|step| step.kind() == StepKind::From)
            .map_or(0, |index| index + 1);
        let (head, tail) = self.build.split_at(split);
        let labels = self
            .labels
            .iter()
            .map(|(key, value)| Ok(format!("LABEL {}={}", key, quote_value(value))));
        head.iter()
            .map(Step::render)
            .chain(labels)
            .chain(tail.iter().map(Step::render))
            .chain(self.run.iter().map(Step::render))
    }

    /// Render the stage, one instruction per line.
    pub fn render(&self) -> Result<String> {
        Ok(self.lines().collect::<Result<Vec<_>>>()?.join("\n"))
    }
}

fn check_role(steps: &[Step], role: StepRole) -> Result<()> {
    match steps.iter().find(|step| step.role() != role) {
        Some(step) => Err(DockedError::MisplacedStep {
            kind: step.kind().name(),
            role: step.role().as_str(),
        }),
        None => Ok(()),
    }
}

/// Incremental construction of a [`Stage`].
///
/// The first invalid input is remembered and reported by [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct StageBuilder {
    stage: Stage,
    error: Option<DockedError>,
}

impl StageBuilder {
    /// Append a step to the group matching its role.
    pub fn step(mut self, step: impl Into<Step>) -> Self {
        let step = step.into();
        match step.role() {
            StepRole::Build => self.stage.build.push(step),
            StepRole::Run => self.stage.run.push(step),
        }
        self
    }

    /// Append several steps, each to the group matching its role.
    pub fn steps(self, steps: impl IntoIterator<Item = Step>) -> Self {
        steps.into_iter().fold(self, |builder, step| builder.step(step))
    }

    /// Append a step that must be a build step.
    pub fn build_step(self, step: impl Into<Step>) -> Self {
        self.step_with_role(step.into(), StepRole::Build)
    }

    /// Append a step that must be a run step.
    pub fn run_step(self, step: impl Into<Step>) -> Self {
        self.step_with_role(step.into(), StepRole::Run)
    }

    fn step_with_role(mut self, step: Step, role: StepRole) -> Self {
        if step.role() != role {
            self.fail(DockedError::MisplacedStep {
                kind: step.kind().name(),
                role: step.role().as_str(),
            });
            return self;
        }
        self.step(step)
    }

    /// Set a label. Setting an existing key replaces its value in place.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            self.fail(DockedError::EmptyValue { what: "label key" });
            return self;
        }
        match self.stage.labels.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.stage.labels.push((key, value)),
        }
        self
    }

    fn fail(&mut self, error: DockedError) {
        self.error.get_or_insert(error);
    }

    pub fn finish(self) -> Result<Stage> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.stage),
        }
    }
}
