//! FROM: base image placement and pinning.
//!
//! Only ARG may come before the first FROM of a stage, and the base image
//! should be pinned to a tag (other than `latest`) or a digest.

use crate::instruction::{Step, StepKind};
use crate::rules::{Context, Rule};
use crate::types::{Severity, Violation};

pub const ONLY_ARG_BEFORE_FROM: Rule = Rule {
    code: 101,
    severity: Severity::Error,
    summary: "Only ARG can go before FROM but found {step}",
    url: None,
};

pub const MISSING_TAG: Rule = Rule {
    code: 102,
    severity: Severity::Warning,
    summary: "Specify base image tag",
    url: None,
};

pub const LATEST_TAG: Rule = Rule {
    code: 103,
    severity: Severity::Warning,
    summary: "Base image tag should not be `latest`",
    url: None,
};

pub const EMPTY_IMAGE_NAME: Rule = Rule {
    code: 104,
    severity: Severity::Error,
    summary: "Base image name must not be empty",
    url: None,
};

pub fn check(step: &Step, ctx: &Context<'_>) -> Vec<Violation> {
    let Step::From(from) = step else {
        return Vec::new();
    };
    let mut violations = Vec::new();

    // Later FROMs would report the same prefix again.
    if ctx.is_first() {
        violations.extend(
            ctx.preceding()
                .iter()
                .filter(|kind| **kind != StepKind::Arg)
                .map(|kind| ONLY_ARG_BEFORE_FROM.format(&[("step", kind.name())])),
        );
    }

    let image = &from.image;
    if image.name().trim().is_empty() {
        violations.push(EMPTY_IMAGE_NAME.violation());
        return violations;
    }
    if !image.is_scratch() && !image.has_version() {
        violations.push(MISSING_TAG.violation());
    }
    if image.tag() == Some("latest") {
        violations.push(LATEST_TAG.violation());
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::reference::BaseImage;
    use crate::rules::Layout;

    fn check_alone(image: BaseImage) -> Vec<String> {
        let layout = Layout::new(vec![StepKind::From]);
        check(&Step::base(image), &layout.at(0).unwrap())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_missing_tag() {
        assert_eq!(check_alone(BaseImage::new("ubuntu")), vec!["W0102: Specify base image tag"]);
        assert!(check_alone(BaseImage::tagged("ubuntu", "22.04")).is_empty());
        assert!(check_alone(BaseImage::pinned("ubuntu", "sha256:aa")).is_empty());
        assert!(check_alone(BaseImage::new("scratch")).is_empty());
    }

    #[test]
    fn test_latest_tag() {
        assert_eq!(
            check_alone(BaseImage::tagged("ubuntu", "latest")),
            vec!["W0103: Base image tag should not be `latest`"]
        );
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            check_alone(BaseImage::new("")),
            vec!["E0104: Base image name must not be empty"]
        );
    }

    #[test]
    fn test_only_arg_before_from() {
        let layout = Layout::new(vec![
            StepKind::Arg,
            StepKind::Run,
            StepKind::Workdir,
            StepKind::From,
        ]);
        let step = Step::base(BaseImage::tagged("alpine", "3.18"));
        let found: Vec<String> = check(&step, &layout.at(3).unwrap())
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            found,
            vec![
                "E0101: Only ARG can go before FROM but found RUN",
                "E0101: Only ARG can go before FROM but found WORKDIR",
            ]
        );
    }

    #[test]
    fn test_other_steps_ignored() {
        let layout = Layout::new(vec![StepKind::Expose]);
        assert!(check(&Step::expose(80), &layout.at(0).unwrap()).is_empty());
    }
}
