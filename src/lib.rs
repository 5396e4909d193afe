//! # docked
//!
//! A declarative object model for Dockerfiles. Images are composed from
//! stages, stages from steps, and the whole structure can be:
//!
//! - **rendered** into Dockerfile text carrying the minimal `# syntax=`
//!   version the steps actually need
//! - **linted** for risky or non-idiomatic usage before it ever reaches a
//!   builder
//!
//! ## Example
//!
//! ```rust
//! use docked::{BaseImage, Image, Stage, Step};
//!
//! # fn main() -> docked::Result<()> {
//! let stage = Stage::builder()
//!     .step(Step::base(BaseImage::tagged("busybox", "1.36")))
//!     .step(Step::cmd(["echo", "hello world!"]))
//!     .finish()?;
//! let image = Image::new(stage);
//!
//! assert!(image.render()?.ends_with("CMD [\"echo\", \"hello world!\"]"));
//! assert_eq!(image.lint().count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod config;
pub mod error;
pub mod format;
pub mod formatter;
pub mod image;
pub mod instruction;
pub mod lint;
pub mod rules;
pub mod shell;
pub mod stage;
pub mod types;
pub mod version;

pub use config::{ConfigError, LintConfig};
pub use error::{DockedError, Result};
pub use formatter::{Formatter, OutputFormat, format_result, format_result_to_string};
pub use image::{DEFAULT_CHANNEL, Image, ImageBuilder};
pub use instruction::mount::{
    BindMount, CacheMount, Mount, SecretMount, Sharing, SshMount, TmpfsMount,
};
pub use instruction::reference::{BaseImage, Checksum, ChecksumAlgorithm, StageRef};
pub use instruction::{
    AddCommon, Arguments, BuildArg, CloneArgs, CopyArgs, DownloadArgs, ExtractArgs, FromArgs,
    HealthCheck, Invocation, KeyValue, Network, OnbuildArgs, Port, Protocol, RunArgs, Security,
    Step, StepKind, StepRole, Timespan, UserArgs,
};
pub use lint::{LintResult, lint};
pub use stage::{Stage, StageBuilder};
pub use types::{RuleCode, Severity, Violation};
pub use version::SyntaxVersion;
