//! Value types that point at something outside the current instruction:
//! base images, checksums of remote content, and other stages.

use crate::error::{DockedError, Result};
use crate::stage::Stage;
use std::fmt;
use std::sync::{Arc, Weak};

/// A base image reference such as `python:3.11-alpine` or `alpine@sha256:...`.
///
/// Tag and digest are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseImage {
    name: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl BaseImage {
    /// Image without tag or digest.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            digest: None,
        }
    }

    /// Image pinned to a tag.
    pub fn tagged(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::new(name)
        }
    }

    /// Image pinned to a digest.
    pub fn pinned(name: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            digest: Some(digest.into()),
            ..Self::new(name)
        }
    }

    /// Build an image reference from optional parts.
    ///
    /// Fails with [`DockedError::TagAndDigest`] when both are given.
    pub fn try_new(
        name: impl Into<String>,
        tag: Option<String>,
        digest: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        if tag.is_some() && digest.is_some() {
            return Err(DockedError::TagAndDigest { image: name });
        }
        Ok(Self { name, tag, digest })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Check if this is the empty `scratch` image.
    pub fn is_scratch(&self) -> bool {
        self.name.eq_ignore_ascii_case("scratch")
    }

    /// Check if the reference is pinned by tag or digest.
    pub fn has_version(&self) -> bool {
        self.tag.is_some() || self.digest.is_some()
    }
}

impl fmt::Display for BaseImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        } else if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

/// Hash algorithms accepted by `ADD --checksum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Blake3,
}

impl ChecksumAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }
}

/// Hash of remote content for `ADD --checksum`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum {
    algorithm: ChecksumAlgorithm,
    hex: String,
}

impl Checksum {
    /// SHA-256 checksum from its hex digest.
    pub fn new(hex: impl Into<String>) -> Result<Self> {
        Self::with_algorithm(ChecksumAlgorithm::Sha256, hex)
    }

    /// Checksum with an explicit algorithm.
    pub fn with_algorithm(algorithm: ChecksumAlgorithm, hex: impl Into<String>) -> Result<Self> {
        let hex = hex.into();
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DockedError::InvalidChecksum(hex));
        }
        Ok(Self { algorithm, hex })
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.as_str(), self.hex)
    }
}

/// Where `COPY --from` or a mount's `from` points.
///
/// A stage is held weakly: the image owns its stages, a reference only
/// looks one up when rendered.
#[derive(Debug, Clone)]
pub enum StageRef {
    /// A stage or image by literal name.
    Name(String),
    /// An external image.
    Image(BaseImage),
    /// A stage of the same image.
    Stage(Weak<Stage>),
}

impl PartialEq for StageRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Name(a), Self::Name(b)) => a == b,
            (Self::Image(a), Self::Image(b)) => a == b,
            (Self::Stage(a), Self::Stage(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for StageRef {}

impl From<&str> for StageRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for StageRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<BaseImage> for StageRef {
    fn from(image: BaseImage) -> Self {
        Self::Image(image)
    }
}

impl From<&Arc<Stage>> for StageRef {
    fn from(stage: &Arc<Stage>) -> Self {
        Self::Stage(Arc::downgrade(stage))
    }
}
