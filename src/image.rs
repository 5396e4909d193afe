//! Images: the complete Dockerfile document.

use crate::error::{DockedError, Result};
use crate::rules;
use crate::stage::Stage;
use crate::types::Violation;
use crate::version::SyntaxVersion;
use std::iter;
use std::sync::Arc;

/// The stable Dockerfile frontend channel.
pub const DEFAULT_CHANNEL: &str = "docker/dockerfile";

/// Escape characters Dockerfile parsers accept.
const ESCAPES: [char; 2] = ['\\', '`'];

/// One or more stages plus the parser directives of the document.
#[derive(Debug, Clone)]
pub struct Image {
    stages: Vec<Arc<Stage>>,
    syntax_channel: String,
    syntax_version: Option<SyntaxVersion>,
    escape: char,
}

impl Image {
    /// Single-stage image with default directives.
    pub fn new(stage: impl Into<Arc<Stage>>) -> Self {
        Self {
            stages: vec![stage.into()],
            syntax_channel: DEFAULT_CHANNEL.to_string(),
            syntax_version: None,
            escape: '\\',
        }
    }

    pub fn builder() -> ImageBuilder {
        ImageBuilder::default()
    }

    pub fn stages(&self) -> &[Arc<Stage>] {
        &self.stages
    }

    pub fn syntax_channel(&self) -> &str {
        &self.syntax_channel
    }

    /// The explicitly requested syntax version, if any.
    pub fn syntax_version(&self) -> Option<SyntaxVersion> {
        self.syntax_version
    }

    pub fn escape(&self) -> char {
        self.escape
    }

    /// Lowest syntax version supporting every stage.
    pub fn min_version(&self) -> SyntaxVersion {
        SyntaxVersion::max_of(self.stages.iter().map(|stage| stage.min_version()))
    }

    /// Value of the `# syntax=` directive: `<channel>:<version>`.
    ///
    /// Uses the explicit version when set, the inferred one otherwise.
    pub fn syntax(&self) -> String {
        let version = self.syntax_version.unwrap_or_else(|| self.min_version());
        format!("{}:{}", self.syntax_channel, version)
    }

    /// Lines of the Dockerfile: directives, then every stage preceded by
    /// a blank line.
    ///
    /// Lazy and restartable. A RUN with chained commands is a single item
    /// spanning several physical lines.
    pub fn lines(&self) -> impl Iterator<Item = Result<String>> + '_ {
        log::debug!(
            "rendering {} stage(s) with syntax {}",
            self.stages.len(),
            self.syntax()
        );
        let directives = [
            Ok(format!("# syntax={}", self.syntax())),
            Ok(format!("# escape={}", self.escape)),
        ];
        directives.into_iter().chain(
            self.stages
                .iter()
                .flat_map(|stage| iter::once(Ok(String::new())).chain(stage.lines())),
        )
    }

    /// Render the whole Dockerfile.
    pub fn render(&self) -> Result<String> {
        Ok(self.lines().collect::<Result<Vec<_>>>()?.join("\n"))
    }

    /// Lint every stage, yielding violations in stage and step order.
    ///
    /// Lazy and restartable; the image is never modified.
    pub fn lint(&self) -> impl Iterator<Item = Violation> + '_ {
        self.stages
            .iter()
            .enumerate()
            .flat_map(|(index, stage)| rules::check_stage(index, stage))
    }
}

/// Builder for multi-stage images and custom directives.
#[derive(Debug, Default)]
pub struct ImageBuilder {
    stages: Vec<Arc<Stage>>,
    syntax_channel: Option<String>,
    syntax_version: Option<SyntaxVersion>,
    escape: Option<char>,
}

impl ImageBuilder {
    /// Append a stage. Pass an `Arc` to keep a handle for `COPY --from`.
    pub fn stage(mut self, stage: impl Into<Arc<Stage>>) -> Self {
        self.stages.push(stage.into());
        self
    }

    pub fn syntax_channel(mut self, channel: impl Into<String>) -> Self {
        self.syntax_channel = Some(channel.into());
        self
    }

    /// Pin the syntax version instead of inferring it.
    pub fn syntax_version(mut self, version: SyntaxVersion) -> Self {
        self.syntax_version = Some(version);
        self
    }

    pub fn escape(mut self, escape: char) -> Self {
        self.escape = Some(escape);
        self
    }

    /// Validate and build the image.
    ///
    /// A non-default channel needs an explicit syntax version.
    pub fn build(self) -> Result<Image> {
        if self.stages.is_empty() {
            return Err(DockedError::NoStages);
        }
        let syntax_channel = self
            .syntax_channel
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
        if syntax_channel != DEFAULT_CHANNEL && self.syntax_version.is_none() {
            return Err(DockedError::MissingSyntaxVersion {
                channel: syntax_channel,
            });
        }
        let escape = self.escape.unwrap_or('\\');
        if !ESCAPES.contains(&escape) {
            return Err(DockedError::InvalidEscape(escape));
        }
        Ok(Image {
            stages: self.stages,
            syntax_channel,
            syntax_version: self.syntax_version,
            escape,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::reference::BaseImage;
    use crate::instruction::{CopyArgs, FromArgs, Step};

    fn alpine() -> Stage {
        Stage::builder()
            .step(Step::base(BaseImage::tagged("alpine", "3.18")))
            .finish()
            .unwrap()
    }

    #[test]
    fn test_directives() {
        let image = Image::new(alpine());
        assert_eq!(image.syntax(), "docker/dockerfile:1.0");
        assert_eq!(
            image.render().unwrap(),
            "# syntax=docker/dockerfile:1.0\n# escape=\\\n\nFROM alpine:3.18"
        );
    }

    #[test]
    fn test_inferred_and_explicit_version() {
        let stage = Stage::builder()
            .step(Step::base(BaseImage::tagged("alpine", "3.18")))
            .step(CopyArgs::new("a", "/a").unwrap().link())
            .finish()
            .unwrap();
        let image = Image::new(stage.clone());
        assert_eq!(image.min_version(), SyntaxVersion::V1_4);
        assert_eq!(image.syntax(), "docker/dockerfile:1.4");

        let pinned = Image::builder()
            .stage(stage)
            .syntax_version(SyntaxVersion::release(1, 5))
            .build()
            .unwrap();
        assert_eq!(pinned.syntax(), "docker/dockerfile:1.5");
    }

    #[test]
    fn test_builder_validation() {
        assert_eq!(Image::builder().build().unwrap_err(), DockedError::NoStages);

        let err = Image::builder()
            .stage(alpine())
            .syntax_channel("docker/dockerfile-upstream")
            .build()
            .unwrap_err();
        assert!(matches!(err, DockedError::MissingSyntaxVersion { .. }));

        let err = Image::builder().stage(alpine()).escape('x').build().unwrap_err();
        assert_eq!(err, DockedError::InvalidEscape('x'));

        let image = Image::builder().stage(alpine()).escape('`').build().unwrap();
        assert!(image.render().unwrap().contains("# escape=`"));
    }

    #[test]
    fn test_copy_from_stage_reference() {
        let build = Arc::new(
            Stage::builder()
                .step(FromArgs::new(BaseImage::tagged("golang", "1.21")).alias("build"))
                .finish()
                .unwrap(),
        );
        let runtime = Stage::builder()
            .step(Step::base(BaseImage::tagged("alpine", "3.18")))
            .step(CopyArgs::new("/out/app", "/app").unwrap().from_stage(&build))
            .finish()
            .unwrap();
        let image = Image::builder().stage(build.clone()).stage(runtime).build().unwrap();
        let lines: Vec<String> = image.lines().collect::<Result<_>>().unwrap();
        assert_eq!(
            lines,
            vec![
                "# syntax=docker/dockerfile:1.0",
                "# escape=\\",
                "",
                "FROM golang:1.21 AS build",
                "",
                "FROM alpine:3.18",
                "COPY --from=build /out/app /app",
            ]
        );
    }

    #[test]
    fn test_unnamed_stage_reference_fails_at_render() {
        let unnamed = Arc::new(alpine());
        let stage = Stage::builder()
            .step(Step::base(BaseImage::tagged("alpine", "3.18")))
            .step(CopyArgs::new("a", "/a").unwrap().from_stage(&unnamed))
            .finish()
            .unwrap();
        let image = Image::builder().stage(unnamed.clone()).stage(stage).build().unwrap();
        let err = image.render().unwrap_err();
        assert_eq!(
            err,
            DockedError::MissingName {
                reference: "COPY --from".to_string()
            }
        );
    }

    #[test]
    fn test_dropped_stage_reference() {
        let gone = Arc::new(alpine());
        let copy = CopyArgs::new("a", "/a").unwrap().from_stage(&gone);
        drop(gone);
        let stage = Stage::builder()
            .step(Step::base(BaseImage::tagged("alpine", "3.18")))
            .step(copy)
            .finish()
            .unwrap();
        let err = Image::new(stage).render().unwrap_err();
        assert!(matches!(err, DockedError::DanglingStage { .. }));
    }
}
