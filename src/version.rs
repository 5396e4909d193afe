//! Dockerfile syntax versions.
//!
//! Numbered releases are ordered numerically. The experimental tiers always
//! outrank every release: `1.0 < 1.1 < ... < labs < master-labs`.

use crate::error::{DockedError, Result};
use std::fmt;
use std::str::FromStr;

/// A Dockerfile frontend version (the part after `:` in `# syntax=`).
///
/// The derived ordering relies on variant order: any `Release` is lower than
/// `Labs`, which is lower than `MasterLabs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxVersion {
    /// A numbered release, e.g. `1.4`.
    Release {
        /// Major version
        major: u32,
        /// Minor version
        minor: u32,
    },
    /// The labs channel of the latest release.
    Labs,
    /// The labs channel of the development branch.
    MasterLabs,
}

impl SyntaxVersion {
    /// Baseline: every instruction without extra flags works here.
    pub const BASELINE: Self = Self::release(1, 0);
    /// `RUN --network`.
    pub const V1_1: Self = Self::release(1, 1);
    /// `RUN --mount`.
    pub const V1_2: Self = Self::release(1, 2);
    /// `COPY --link` / `ADD --link`.
    pub const V1_4: Self = Self::release(1, 4);

    /// Create a numbered release version.
    pub const fn release(major: u32, minor: u32) -> Self {
        Self::Release { major, minor }
    }

    /// Check if this is one of the experimental tiers.
    pub fn is_experimental(&self) -> bool {
        matches!(self, Self::Labs | Self::MasterLabs)
    }

    /// Highest version of a sequence, or the baseline when it is empty.
    pub fn max_of(versions: impl IntoIterator<Item = Self>) -> Self {
        versions.into_iter().max().unwrap_or(Self::BASELINE)
    }
}

impl Default for SyntaxVersion {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl fmt::Display for SyntaxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release { major, minor } => write!(f, "{}.{}", major, minor),
            Self::Labs => f.write_str("labs"),
            Self::MasterLabs => f.write_str("master-labs"),
        }
    }
}

impl FromStr for SyntaxVersion {
    type Err = DockedError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DockedError::InvalidVersion(s.to_string());
        match s.trim() {
            "labs" => Ok(Self::Labs),
            "master-labs" => Ok(Self::MasterLabs),
            text => {
                let (major, minor) = match text.split_once('.') {
                    Some((major, minor)) => (major, minor),
                    None => (text, "0"),
                };
                let major = major.parse().map_err(|_| invalid())?;
                let minor = minor.parse().map_err(|_| invalid())?;
                Ok(Self::release(major, minor))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        assert!(SyntaxVersion::BASELINE < SyntaxVersion::V1_1);
        assert!(SyntaxVersion::V1_2 < SyntaxVersion::V1_4);
        assert!(SyntaxVersion::release(1, 10) > SyntaxVersion::V1_4);
        assert!(SyntaxVersion::release(99, 0) < SyntaxVersion::Labs);
        assert!(SyntaxVersion::Labs < SyntaxVersion::MasterLabs);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(SyntaxVersion::BASELINE.to_string(), "1.0");
        assert_eq!(SyntaxVersion::V1_4.to_string(), "1.4");
        assert_eq!(SyntaxVersion::Labs.to_string(), "labs");
        assert_eq!(SyntaxVersion::MasterLabs.to_string(), "master-labs");
    }

    #[test]
    fn test_version_parse() {
        assert_eq!("1.4".parse::<SyntaxVersion>(), Ok(SyntaxVersion::V1_4));
        assert_eq!("1".parse::<SyntaxVersion>(), Ok(SyntaxVersion::BASELINE));
        assert_eq!("labs".parse::<SyntaxVersion>(), Ok(SyntaxVersion::Labs));
        assert_eq!(
            "master-labs".parse::<SyntaxVersion>(),
            Ok(SyntaxVersion::MasterLabs)
        );
        assert!("latest".parse::<SyntaxVersion>().is_err());
        assert!("1.x".parse::<SyntaxVersion>().is_err());
    }

    #[test]
    fn test_max_of() {
        assert_eq!(SyntaxVersion::max_of([]), SyntaxVersion::BASELINE);
        assert_eq!(
            SyntaxVersion::max_of([SyntaxVersion::V1_2, SyntaxVersion::Labs, SyntaxVersion::V1_4]),
            SyntaxVersion::Labs
        );
    }
}
