//! Error types for building and rendering Dockerfile models.
//!
//! Two tiers of failure exist:
//! - construction errors, raised by constructors when a combination of options
//!   can never be rendered;
//! - render errors, raised when a cross-stage reference is resolved and the
//!   referenced stage turns out to be unnamed or gone.
//!
//! Lint findings are never errors; see [`crate::types::Violation`].

use thiserror::Error;

/// Errors raised while constructing or rendering a Dockerfile model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DockedError {
    /// `FROM` (or any base image reference) with both a tag and a digest.
    #[error("cannot set both tag and digest for image `{image}`")]
    TagAndDigest {
        /// Image name the reference was built for
        image: String,
    },

    /// Exec-form `RUN` combined with additional chained commands.
    #[error("exec form RUN cannot chain additional commands")]
    ExecFormChain,

    /// `ONBUILD` wrapping another `ONBUILD`.
    #[error("cannot use ONBUILD inside ONBUILD")]
    NestedOnbuild,

    /// A mount option violates the constraints of its mount type.
    #[error("invalid {kind} mount: {reason}")]
    InvalidMount {
        /// Mount type (`bind`, `cache`, ...)
        kind: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A checksum digest that is not a hexadecimal string.
    #[error("invalid checksum digest `{0}`: expected a non-empty hex string")]
    InvalidChecksum(String),

    /// A required value was empty.
    #[error("{what} must not be empty")]
    EmptyValue {
        /// Name of the missing value
        what: &'static str,
    },

    /// A step was placed in the wrong group of a stage.
    #[error("{kind} is a {role} step and cannot be placed there")]
    MisplacedStep {
        /// Instruction keyword
        kind: &'static str,
        /// The role the instruction actually has
        role: &'static str,
    },

    /// An image without stages.
    #[error("an image needs at least one stage")]
    NoStages,

    /// A non-default syntax channel without an explicit version.
    #[error("syntax version is required with non-default syntax channel `{channel}`")]
    MissingSyntaxVersion {
        /// The configured channel
        channel: String,
    },

    /// An escape character other than backslash or backtick.
    #[error("invalid escape character `{0}`: only `\\` and `` ` `` are supported")]
    InvalidEscape(char),

    /// A syntax version token that cannot be parsed.
    #[error("invalid syntax version `{0}`")]
    InvalidVersion(String),

    /// A reference to a stage that has no name.
    #[error("the stage referenced by {reference} must have a name")]
    MissingName {
        /// Where the reference was made (e.g. `COPY --from`)
        reference: String,
    },

    /// A reference to a stage that no longer exists.
    #[error("the stage referenced by {reference} no longer exists")]
    DanglingStage {
        /// Where the reference was made
        reference: String,
    },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, DockedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DockedError::TagAndDigest {
            image: "alpine".to_string(),
        };
        assert_eq!(err.to_string(), "cannot set both tag and digest for image `alpine`");

        let err = DockedError::MissingName {
            reference: "COPY --from".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "the stage referenced by COPY --from must have a name"
        );
    }
}
