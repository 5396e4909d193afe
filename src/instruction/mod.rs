//! Dockerfile instruction model.
//!
//! [`Step`] is the closed set of instructions. Every variant renders itself
//! to one Dockerfile instruction and reports the lowest syntax version that
//! supports the options it was built with. Steps are validated when they are
//! constructed; only cross-stage references can still fail at render time.

pub mod mount;
pub mod reference;

use crate::error::{DockedError, Result};
use crate::format::{format_command, join_paths, quote_value, resolve_stage_name, split_words};
use crate::version::SyntaxVersion;
use mount::Mount;
use reference::{BaseImage, Checksum, StageRef};
use std::fmt;
use std::time::Duration;

/// A command or argument value: a shell string or an argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arguments {
    Text(String),
    List(Vec<String>),
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// The argument words, splitting text with POSIX shell rules.
    pub fn words(&self) -> Vec<String> {
        match self {
            Self::Text(text) => split_words(text),
            Self::List(items) => items.clone(),
        }
    }
}

impl From<&str> for Arguments {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Arguments {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for Arguments {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for Arguments {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Arguments {
    fn from(items: [&str; N]) -> Self {
        Self::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// A command for CMD, ENTRYPOINT or HEALTHCHECK, in exec or shell form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Arguments,
    /// Run through the shell instead of executing directly.
    pub shell: bool,
}

impl Invocation {
    /// Exec form (JSON array).
    pub fn exec(args: impl Into<Arguments>) -> Self {
        Self {
            args: args.into(),
            shell: false,
        }
    }

    /// Shell form.
    pub fn shell(args: impl Into<Arguments>) -> Self {
        Self {
            args: args.into(),
            shell: true,
        }
    }

    fn render(&self) -> String {
        format_command(&self.args, self.shell)
    }
}

impl From<Arguments> for Invocation {
    fn from(args: Arguments) -> Self {
        Self::exec(args)
    }
}

impl From<&str> for Invocation {
    fn from(text: &str) -> Self {
        Self::exec(text)
    }
}

impl From<String> for Invocation {
    fn from(text: String) -> Self {
        Self::exec(text)
    }
}

impl From<Vec<String>> for Invocation {
    fn from(items: Vec<String>) -> Self {
        Self::exec(items)
    }
}

impl From<Vec<&str>> for Invocation {
    fn from(items: Vec<&str>) -> Self {
        Self::exec(items)
    }
}

impl<const N: usize> From<[&str; N]> for Invocation {
    fn from(items: [&str; N]) -> Self {
        Self::exec(items)
    }
}

/// The kind of a step, used for dispatch and positional lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    From,
    Arg,
    Run,
    Cmd,
    Label,
    Expose,
    Env,
    Download,
    Clone,
    Extract,
    Copy,
    Entrypoint,
    Volume,
    User,
    Workdir,
    Onbuild,
    Stopsignal,
    Healthcheck,
    Shell,
}

impl StepKind {
    /// Model name of the step (`DOWNLOAD`, `CLONE`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::From => "FROM",
            Self::Arg => "ARG",
            Self::Run => "RUN",
            Self::Cmd => "CMD",
            Self::Label => "LABEL",
            Self::Expose => "EXPOSE",
            Self::Env => "ENV",
            Self::Download => "DOWNLOAD",
            Self::Clone => "CLONE",
            Self::Extract => "EXTRACT",
            Self::Copy => "COPY",
            Self::Entrypoint => "ENTRYPOINT",
            Self::Volume => "VOLUME",
            Self::User => "USER",
            Self::Workdir => "WORKDIR",
            Self::Onbuild => "ONBUILD",
            Self::Stopsignal => "STOPSIGNAL",
            Self::Healthcheck => "HEALTHCHECK",
            Self::Shell => "SHELL",
        }
    }

    /// The Dockerfile keyword the step renders with.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Download | Self::Clone | Self::Extract => "ADD",
            other => other.name(),
        }
    }

    pub fn role(&self) -> StepRole {
        match self {
            Self::Cmd
            | Self::Label
            | Self::Expose
            | Self::Entrypoint
            | Self::Volume
            | Self::Stopsignal
            | Self::Healthcheck => StepRole::Run,
            _ => StepRole::Build,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a step acts at build time or only configures the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepRole {
    Build,
    Run,
}

impl StepRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Run => "run",
        }
    }
}

/// `FROM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromArgs {
    pub image: BaseImage,
    pub platform: Option<String>,
    /// Stage name (`AS name`).
    pub name: Option<String>,
}

impl FromArgs {
    pub fn new(image: BaseImage) -> Self {
        Self {
            image,
            platform: None,
            name: None,
        }
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// `ARG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArg {
    pub name: String,
    pub default: Option<String>,
}

impl BuildArg {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = non_empty(name.into(), "ARG name")?;
        Ok(Self {
            name,
            default: None,
        })
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// `RUN --network` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Default,
    None,
    Host,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::None => "none",
            Self::Host => "host",
        }
    }
}

/// `RUN --security` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    #[default]
    Sandbox,
    Insecure,
}

impl Security {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Insecure => "insecure",
        }
    }
}

/// `RUN`: one command, or several shell commands chained with `&&`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    first: Arguments,
    rest: Vec<String>,
    shell: bool,
    pub mount: Option<Mount>,
    pub network: Network,
    pub security: Security,
}

impl RunArgs {
    /// Validate and build a RUN.
    ///
    /// Chained commands are only allowed in shell form with a text first
    /// command.
    pub fn try_new(first: Arguments, rest: Vec<String>, shell: bool) -> Result<Self> {
        if first.is_empty() {
            return Err(DockedError::EmptyValue { what: "RUN command" });
        }
        let exec_form = !shell || matches!(first, Arguments::List(_));
        if exec_form && !rest.is_empty() {
            return Err(DockedError::ExecFormChain);
        }
        Ok(Self {
            first,
            rest,
            shell,
            mount: None,
            network: Network::Default,
            security: Security::Sandbox,
        })
    }

    /// A single shell-form command.
    pub fn shell(cmd: impl Into<Arguments>) -> Result<Self> {
        Self::try_new(cmd.into(), Vec::new(), true)
    }

    /// Shell commands chained with `&&`.
    pub fn chain<I, S>(cmds: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cmds = cmds.into_iter().map(Into::into);
        let first = cmds
            .next()
            .ok_or(DockedError::EmptyValue { what: "RUN command" })?;
        Self::try_new(Arguments::Text(first), cmds.collect(), true)
    }

    /// Exec form (JSON array).
    pub fn exec(cmd: impl Into<Arguments>) -> Result<Self> {
        Self::try_new(cmd.into(), Vec::new(), false)
    }

    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mount = Some(mount);
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    pub fn first(&self) -> &Arguments {
        &self.first
    }

    /// Commands chained after the first one.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    pub fn is_shell(&self) -> bool {
        self.shell
    }

    fn render(&self) -> Result<String> {
        let mut result = String::from("RUN");
        if let Some(mount) = &self.mount {
            result.push_str(&format!(" --mount={}", mount.render()?));
        }
        if self.network != Network::Default {
            result.push_str(&format!(" --network={}", self.network.as_str()));
        }
        if self.security != Security::Sandbox {
            result.push_str(&format!(" --security={}", self.security.as_str()));
        }
        result.push(' ');
        match &self.first {
            Arguments::Text(first) if !self.rest.is_empty() => {
                let mut cmds = vec![first.as_str()];
                cmds.extend(self.rest.iter().map(String::as_str));
                result.push_str(&cmds.join(" && \\\n    "));
            }
            first => result.push_str(&format_command(first, self.shell)),
        }
        Ok(result)
    }

    fn min_version(&self) -> SyntaxVersion {
        if self.security != Security::Sandbox {
            SyntaxVersion::Labs
        } else if self.mount.is_some() {
            SyntaxVersion::V1_2
        } else if self.network != Network::Default {
            SyntaxVersion::V1_1
        } else {
            SyntaxVersion::BASELINE
        }
    }
}

/// A key/value pair for LABEL and ENV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Ok(Self {
            key: non_empty(key.into(), "key")?,
            value: value.into(),
        })
    }

    fn render(&self, keyword: &str) -> String {
        format!("{} {}={}", keyword, self.key, quote_value(&self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

/// `EXPOSE`. The number is not range-checked here; the linter reports
/// ports outside the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub number: i64,
    pub protocol: Protocol,
}

impl Port {
    pub fn tcp(number: i64) -> Self {
        Self {
            number,
            protocol: Protocol::Tcp,
        }
    }

    pub fn udp(number: i64) -> Self {
        Self {
            number,
            protocol: Protocol::Udp,
        }
    }
}

/// Options shared by the ADD family and COPY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommon {
    pub sources: Vec<String>,
    pub dst: String,
    pub chown: Option<String>,
    pub link: bool,
}

impl AddCommon {
    fn new(sources: Vec<String>, dst: String) -> Result<Self> {
        if sources.is_empty() || sources.iter().any(String::is_empty) {
            return Err(DockedError::EmptyValue { what: "source" });
        }
        Ok(Self {
            sources,
            dst: non_empty(dst, "destination")?,
            chown: None,
            link: false,
        })
    }

    fn flags(&self) -> String {
        let mut result = String::new();
        if let Some(chown) = &self.chown {
            result.push_str(&format!(" --chown={}", chown));
        }
        if self.link {
            result.push_str(" --link");
        }
        result
    }

    fn paths(&self) -> String {
        let mut parts = self.sources.clone();
        parts.push(self.dst.clone());
        join_paths(&parts)
    }

    fn min_version(&self) -> SyntaxVersion {
        if self.link {
            SyntaxVersion::V1_4
        } else {
            SyntaxVersion::BASELINE
        }
    }
}

macro_rules! add_family {
    ($name:ident) => {
        impl $name {
            /// Set `--chown` (`user`, `user:group` or numeric ids).
            pub fn chown(mut self, owner: impl ToString) -> Self {
                self.common.chown = Some(owner.to_string());
                self
            }

            /// Set `--link`.
            pub fn link(mut self) -> Self {
                self.common.link = true;
                self
            }
        }
    };
}

/// `ADD <url>`: download a remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArgs {
    pub common: AddCommon,
    pub checksum: Option<Checksum>,
}

impl DownloadArgs {
    pub fn new(url: impl Into<String>, dst: impl Into<String>) -> Result<Self> {
        Ok(Self {
            common: AddCommon::new(vec![url.into()], dst.into())?,
            checksum: None,
        })
    }

    pub fn checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

add_family!(DownloadArgs);

/// `ADD <git url>`: clone a git repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneArgs {
    pub common: AddCommon,
    pub keep_git_dir: bool,
}

impl CloneArgs {
    pub fn new(repo: impl Into<String>, dst: impl Into<String>) -> Result<Self> {
        Ok(Self {
            common: AddCommon::new(vec![repo.into()], dst.into())?,
            keep_git_dir: false,
        })
    }

    pub fn keep_git_dir(mut self) -> Self {
        self.keep_git_dir = true;
        self
    }
}

add_family!(CloneArgs);

/// `ADD <archive>`: extract a local archive into the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractArgs {
    pub common: AddCommon,
}

impl ExtractArgs {
    pub fn new(archive: impl Into<String>, dst: impl Into<String>) -> Result<Self> {
        Ok(Self {
            common: AddCommon::new(vec![archive.into()], dst.into())?,
        })
    }
}

add_family!(ExtractArgs);

/// `COPY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyArgs {
    pub common: AddCommon,
    pub from: Option<StageRef>,
}

impl CopyArgs {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Result<Self> {
        Self::many([src.into()], dst)
    }

    /// Copy several sources into `dst`.
    pub fn many<I, S>(sources: I, dst: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources = sources.into_iter().map(Into::into).collect();
        Ok(Self {
            common: AddCommon::new(sources, dst.into())?,
            from: None,
        })
    }

    /// Copy from another stage or image (`--from`).
    pub fn from_stage(mut self, stage: impl Into<StageRef>) -> Self {
        self.from = Some(stage.into());
        self
    }
}

add_family!(CopyArgs);

/// `USER`, by name or numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserArgs {
    pub user: String,
    pub group: Option<String>,
}

impl UserArgs {
    pub fn new(user: impl ToString) -> Result<Self> {
        Ok(Self {
            user: non_empty(user.to_string(), "USER")?,
            group: None,
        })
    }

    pub fn with_group(mut self, group: impl ToString) -> Self {
        self.group = Some(group.to_string());
        self
    }

    /// Check if the user is root, by name or uid.
    pub fn is_root(&self) -> bool {
        self.user == "root" || self.user == "0"
    }
}

/// A HEALTHCHECK duration: a literal such as `5m`, or a [`Duration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timespan {
    Literal(String),
    Duration(Duration),
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Duration(duration) => match duration.subsec_nanos() {
                0 => write!(f, "{}s", duration.as_secs()),
                nanos if nanos % 1_000_000 == 0 => write!(f, "{}ms", duration.as_millis()),
                nanos if nanos % 1_000 == 0 => write!(f, "{}us", duration.as_micros()),
                _ => write!(f, "{}ns", duration.as_nanos()),
            },
        }
    }
}

impl From<&str> for Timespan {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_string())
    }
}

impl From<String> for Timespan {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<Duration> for Timespan {
    fn from(duration: Duration) -> Self {
        Self::Duration(duration)
    }
}

const DEFAULT_INTERVAL: &str = "30s";
const DEFAULT_TIMEOUT: &str = "30s";
const DEFAULT_START_PERIOD: &str = "0s";
const DEFAULT_RETRIES: u32 = 3;

/// `HEALTHCHECK`. Options equal to Docker's defaults are not rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// `None` disables any health check inherited from the base image.
    pub command: Option<Invocation>,
    pub interval: Timespan,
    pub timeout: Timespan,
    pub start_period: Timespan,
    pub retries: u32,
}

impl HealthCheck {
    /// `HEALTHCHECK NONE`.
    pub fn none() -> Self {
        Self {
            command: None,
            interval: Timespan::from(DEFAULT_INTERVAL),
            timeout: Timespan::from(DEFAULT_TIMEOUT),
            start_period: Timespan::from(DEFAULT_START_PERIOD),
            retries: DEFAULT_RETRIES,
        }
    }

    /// Check with a command, exec form unless an [`Invocation::shell`] is given.
    pub fn cmd(command: impl Into<Invocation>) -> Result<Self> {
        let command = command.into();
        if command.args.is_empty() {
            return Err(DockedError::EmptyValue {
                what: "HEALTHCHECK command",
            });
        }
        Ok(Self {
            command: Some(command),
            ..Self::none()
        })
    }

    pub fn interval(mut self, interval: impl Into<Timespan>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn timeout(mut self, timeout: impl Into<Timespan>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn start_period(mut self, start_period: impl Into<Timespan>) -> Self {
        self.start_period = start_period.into();
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    fn render(&self) -> String {
        let mut result = String::from("HEALTHCHECK");
        let durations = [
            ("interval", &self.interval, DEFAULT_INTERVAL),
            ("timeout", &self.timeout, DEFAULT_TIMEOUT),
            ("start-period", &self.start_period, DEFAULT_START_PERIOD),
        ];
        for (flag, value, default) in durations {
            let value = value.to_string();
            if value != default {
                result.push_str(&format!(" --{}={}", flag, value));
            }
        }
        if self.retries != DEFAULT_RETRIES {
            result.push_str(&format!(" --retries={}", self.retries));
        }
        match &self.command {
            None => result.push_str(" NONE"),
            Some(command) => result.push_str(&format!(" CMD {}", command.render())),
        }
        result
    }
}

/// The trigger of an `ONBUILD`, built only by [`Step::onbuild`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnbuildArgs {
    trigger: Box<Step>,
}

impl OnbuildArgs {
    pub fn trigger(&self) -> &Step {
        &self.trigger
    }
}

/// A single Dockerfile instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    From(FromArgs),
    Arg(BuildArg),
    Run(RunArgs),
    Cmd(Invocation),
    Label(KeyValue),
    Expose(Port),
    Env(KeyValue),
    Download(DownloadArgs),
    Clone(CloneArgs),
    Extract(ExtractArgs),
    Copy(CopyArgs),
    Entrypoint(Invocation),
    Volume(Vec<String>),
    User(UserArgs),
    Workdir(String),
    Onbuild(OnbuildArgs),
    Stopsignal(String),
    Healthcheck(HealthCheck),
    Shell(Arguments),
}

impl Step {
    /// `FROM image`.
    pub fn base(image: BaseImage) -> Self {
        Self::From(FromArgs::new(image))
    }

    /// `ARG name`.
    pub fn arg(name: impl Into<String>) -> Result<Self> {
        Ok(Self::Arg(BuildArg::new(name)?))
    }

    /// `RUN` with one or more shell commands chained by `&&`.
    pub fn run<I, S>(cmds: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::Run(RunArgs::chain(cmds)?))
    }

    /// `CMD`, exec form unless an [`Invocation::shell`] is given.
    pub fn cmd(cmd: impl Into<Invocation>) -> Self {
        Self::Cmd(cmd.into())
    }

    /// `ENTRYPOINT`, exec form unless an [`Invocation::shell`] is given.
    pub fn entrypoint(cmd: impl Into<Invocation>) -> Result<Self> {
        let cmd = cmd.into();
        if cmd.args.is_empty() {
            return Err(DockedError::EmptyValue { what: "ENTRYPOINT" });
        }
        Ok(Self::Entrypoint(cmd))
    }

    pub fn label(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Ok(Self::Label(KeyValue::new(key, value)?))
    }

    pub fn env(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Ok(Self::Env(KeyValue::new(key, value)?))
    }

    /// `EXPOSE port/tcp`.
    pub fn expose(port: i64) -> Self {
        Self::Expose(Port::tcp(port))
    }

    pub fn volume<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() || paths.iter().any(String::is_empty) {
            return Err(DockedError::EmptyValue { what: "VOLUME path" });
        }
        Ok(Self::Volume(paths))
    }

    pub fn user(user: impl ToString) -> Result<Self> {
        Ok(Self::User(UserArgs::new(user)?))
    }

    pub fn workdir(path: impl Into<String>) -> Result<Self> {
        Ok(Self::Workdir(non_empty(path.into(), "WORKDIR path")?))
    }

    /// `ONBUILD trigger`. The trigger can be neither ONBUILD nor FROM.
    pub fn onbuild(trigger: Step) -> Result<Self> {
        match trigger.kind() {
            StepKind::Onbuild => Err(DockedError::NestedOnbuild),
            StepKind::From => Err(DockedError::MisplacedStep {
                kind: "FROM",
                role: "stage-opening",
            }),
            _ => Ok(Self::Onbuild(OnbuildArgs {
                trigger: Box::new(trigger),
            })),
        }
    }

    /// `STOPSIGNAL`, by name (`SIGKILL`) or number.
    pub fn stopsignal(signal: impl ToString) -> Result<Self> {
        Ok(Self::Stopsignal(non_empty(signal.to_string(), "STOPSIGNAL")?))
    }

    /// `SHELL`, always rendered as a JSON array.
    pub fn shell(cmd: impl Into<Arguments>) -> Result<Self> {
        let cmd = cmd.into();
        if cmd.is_empty() {
            return Err(DockedError::EmptyValue { what: "SHELL" });
        }
        Ok(Self::Shell(cmd))
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Self::From(_) => StepKind::From,
            Self::Arg(_) => StepKind::Arg,
            Self::Run(_) => StepKind::Run,
            Self::Cmd(_) => StepKind::Cmd,
            Self::Label(_) => StepKind::Label,
            Self::Expose(_) => StepKind::Expose,
            Self::Env(_) => StepKind::Env,
            Self::Download(_) => StepKind::Download,
            Self::Clone(_) => StepKind::Clone,
            Self::Extract(_) => StepKind::Extract,
            Self::Copy(_) => StepKind::Copy,
            Self::Entrypoint(_) => StepKind::Entrypoint,
            Self::Volume(_) => StepKind::Volume,
            Self::User(_) => StepKind::User,
            Self::Workdir(_) => StepKind::Workdir,
            Self::Onbuild(_) => StepKind::Onbuild,
            Self::Stopsignal(_) => StepKind::Stopsignal,
            Self::Healthcheck(_) => StepKind::Healthcheck,
            Self::Shell(_) => StepKind::Shell,
        }
    }

    pub fn role(&self) -> StepRole {
        self.kind().role()
    }

    /// Render the instruction.
    ///
    /// Only fails when a referenced stage is unnamed or no longer exists.
    pub fn render(&self) -> Result<String> {
        let line = match self {
            Self::From(args) => {
                let mut result = String::from("FROM");
                if let Some(platform) = &args.platform {
                    result.push_str(&format!(" --platform={}", platform));
                }
                result.push_str(&format!(" {}", args.image));
                if let Some(name) = args.name.as_deref().filter(|name| !name.is_empty()) {
                    result.push_str(&format!(" AS {}", name));
                }
                result
            }
            Self::Arg(arg) => match &arg.default {
                Some(default) => format!("ARG {}={}", arg.name, default),
                None => format!("ARG {}", arg.name),
            },
            Self::Run(run) => run.render()?,
            Self::Cmd(cmd) => format!("CMD {}", cmd.render()),
            Self::Label(kv) => kv.render("LABEL"),
            Self::Expose(port) => format!("EXPOSE {}/{}", port.number, port.protocol.as_str()),
            Self::Env(kv) => kv.render("ENV"),
            Self::Download(add) => {
                let mut result = format!("ADD{}", add.common.flags());
                if let Some(checksum) = &add.checksum {
                    result.push_str(&format!(" --checksum={}", checksum));
                }
                format!("{} {}", result, add.common.paths())
            }
            Self::Clone(add) => {
                let mut result = format!("ADD{}", add.common.flags());
                if add.keep_git_dir {
                    result.push_str(" --keep-git-dir=true");
                }
                format!("{} {}", result, add.common.paths())
            }
            Self::Extract(add) => format!("ADD{} {}", add.common.flags(), add.common.paths()),
            Self::Copy(copy) => {
                let mut result = format!("COPY{}", copy.common.flags());
                if let Some(from) = &copy.from {
                    let name = resolve_stage_name(from, "COPY --from")?;
                    result.push_str(&format!(" --from={}", name));
                }
                format!("{} {}", result, copy.common.paths())
            }
            Self::Entrypoint(cmd) => format!("ENTRYPOINT {}", cmd.render()),
            Self::Volume(paths) => format!("VOLUME {}", join_paths(paths)),
            Self::User(user) => match &user.group {
                Some(group) => format!("USER {}:{}", user.user, group),
                None => format!("USER {}", user.user),
            },
            Self::Workdir(path) => format!("WORKDIR {}", path),
            Self::Onbuild(args) => format!("ONBUILD {}", args.trigger.render()?),
            Self::Stopsignal(signal) => format!("STOPSIGNAL {}", signal),
            Self::Healthcheck(check) => check.render(),
            Self::Shell(cmd) => format!("SHELL {}", format_command(cmd, false)),
        };
        Ok(line)
    }

    /// Lowest syntax version supporting the options of this step.
    pub fn min_version(&self) -> SyntaxVersion {
        match self {
            Self::Run(run) => run.min_version(),
            Self::Download(add) if add.checksum.is_some() => SyntaxVersion::MasterLabs,
            Self::Download(add) => add.common.min_version(),
            Self::Clone(_) => SyntaxVersion::MasterLabs,
            Self::Extract(add) => add.common.min_version(),
            Self::Copy(copy) => copy.common.min_version(),
            Self::Onbuild(args) => args.trigger.min_version(),
            _ => SyntaxVersion::BASELINE,
        }
    }
}

impl From<FromArgs> for Step {
    fn from(args: FromArgs) -> Self {
        Self::From(args)
    }
}

impl From<BuildArg> for Step {
    fn from(arg: BuildArg) -> Self {
        Self::Arg(arg)
    }
}

impl From<RunArgs> for Step {
    fn from(run: RunArgs) -> Self {
        Self::Run(run)
    }
}

impl From<DownloadArgs> for Step {
    fn from(add: DownloadArgs) -> Self {
        Self::Download(add)
    }
}

impl From<CloneArgs> for Step {
    fn from(add: CloneArgs) -> Self {
        Self::Clone(add)
    }
}

impl From<ExtractArgs> for Step {
    fn from(add: ExtractArgs) -> Self {
        Self::Extract(add)
    }
}

impl From<CopyArgs> for Step {
    fn from(copy: CopyArgs) -> Self {
        Self::Copy(copy)
    }
}

impl From<UserArgs> for Step {
    fn from(user: UserArgs) -> Self {
        Self::User(user)
    }
}

impl From<Port> for Step {
    fn from(port: Port) -> Self {
        Self::Expose(port)
    }
}

impl From<HealthCheck> for Step {
    fn from(check: HealthCheck) -> Self {
        Self::Healthcheck(check)
    }
}

fn non_empty(value: String, what: &'static str) -> Result<String> {
    if value.is_empty() {
        return Err(DockedError::EmptyValue { what });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::mount::{Mount, SecretMount};
    use super::reference::ChecksumAlgorithm;
    use super::*;

    fn render(step: Step) -> String {
        step.render().unwrap()
    }

    #[test]
    fn test_from() {
        assert_eq!(render(Step::base(BaseImage::new("alpine"))), "FROM alpine");
        let args = FromArgs::new(BaseImage::tagged("golang", "1.21"))
            .platform("linux/amd64")
            .alias("build");
        assert_eq!(
            render(args.into()),
            "FROM --platform=linux/amd64 golang:1.21 AS build"
        );
        let pinned = FromArgs::new(BaseImage::pinned("alpine", "sha256:0f"));
        assert_eq!(render(pinned.into()), "FROM alpine@sha256:0f");
    }

    #[test]
    fn test_arg() {
        assert_eq!(render(Step::arg("user").unwrap()), "ARG user");
        let arg = BuildArg::new("user").unwrap().with_default("root");
        assert_eq!(render(arg.into()), "ARG user=root");
        let arg = BuildArg::new("user").unwrap().with_default("gram orsinium");
        assert_eq!(render(arg.into()), "ARG user=gram orsinium");
        assert!(Step::arg("").is_err());
    }

    #[test]
    fn test_run_forms() {
        assert_eq!(render(Step::run(["apt-get update"]).unwrap()), "RUN apt-get update");
        assert_eq!(
            render(Step::run(["echo 1", "echo 2"]).unwrap()),
            "RUN echo 1 && \\\n    echo 2"
        );
        assert_eq!(
            render(RunArgs::exec("apt-get update").unwrap().into()),
            r#"RUN ["apt-get", "update"]"#
        );
        assert_eq!(
            render(RunArgs::shell(["apt-get", "update"]).unwrap().into()),
            "RUN apt-get update"
        );
    }

    #[test]
    fn test_run_flags_and_versions() {
        let secret = Mount::try_from(SecretMount::default()).unwrap();
        let run = RunArgs::shell("echo 1").unwrap().with_mount(secret);
        assert_eq!(run.min_version(), SyntaxVersion::V1_2);
        assert_eq!(render(run.into()), "RUN --mount=type=secret echo 1");

        let run = RunArgs::shell("echo 1").unwrap().network(Network::None);
        assert_eq!(run.min_version(), SyntaxVersion::V1_1);
        assert_eq!(render(run.into()), "RUN --network=none echo 1");

        let run = RunArgs::shell("echo 1").unwrap().security(Security::Insecure);
        assert_eq!(run.min_version(), SyntaxVersion::Labs);
        assert_eq!(render(run.into()), "RUN --security=insecure echo 1");

        assert_eq!(Step::run(["true"]).unwrap().min_version(), SyntaxVersion::BASELINE);
    }

    #[test]
    fn test_run_exec_form_cannot_chain() {
        let err = RunArgs::try_new(Arguments::from("echo 1"), vec!["echo 2".into()], false);
        assert_eq!(err.unwrap_err(), DockedError::ExecFormChain);
        let err = RunArgs::try_new(Arguments::from(["echo", "1"]), vec!["echo 2".into()], true);
        assert_eq!(err.unwrap_err(), DockedError::ExecFormChain);
        assert!(Step::run(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_cmd_and_entrypoint() {
        assert_eq!(render(Step::cmd(Invocation::shell("echo 1"))), "CMD echo 1");
        assert_eq!(render(Step::cmd(Invocation::shell(["echo", "1"]))), "CMD echo 1");
        assert_eq!(render(Step::cmd("echo 1")), r#"CMD ["echo", "1"]"#);
        assert_eq!(render(Step::cmd(["echo", "1"])), r#"CMD ["echo", "1"]"#);
        assert_eq!(
            render(Step::entrypoint("cowsay hello").unwrap()),
            r#"ENTRYPOINT ["cowsay", "hello"]"#
        );
        assert_eq!(
            render(Step::entrypoint(Invocation::shell(["top", "-b"])).unwrap()),
            "ENTRYPOINT top -b"
        );
        assert!(Step::entrypoint("").is_err());
    }

    #[test]
    fn test_label_env_expose() {
        assert_eq!(render(Step::env("user", "root").unwrap()), "ENV user=root");
        assert_eq!(
            render(Step::env("user", "gram orsinium").unwrap()),
            r#"ENV user="gram orsinium""#
        );
        assert_eq!(render(Step::label("empty", "").unwrap()), r#"LABEL empty="""#);
        assert_eq!(render(Step::expose(80)), "EXPOSE 80/tcp");
        assert_eq!(render(Port::udp(8125).into()), "EXPOSE 8125/udp");
    }

    #[test]
    fn test_add_family() {
        let download = DownloadArgs::new("https://a.b/c.gz", "/")
            .unwrap()
            .checksum(Checksum::new("244").unwrap());
        let step = Step::from(download);
        assert_eq!(step.min_version(), SyntaxVersion::MasterLabs);
        assert_eq!(render(step), "ADD --checksum=sha256:244 https://a.b/c.gz /");

        let download = DownloadArgs::new("https://a.b/c.gz", "/").unwrap().checksum(
            Checksum::with_algorithm(ChecksumAlgorithm::Sha512, "244").unwrap(),
        );
        assert_eq!(render(download.into()), "ADD --checksum=sha512:244 https://a.b/c.gz /");

        let clone = CloneArgs::new("https://github.com/moby/buildkit.git#v0.10.1", "/buildkit")
            .unwrap()
            .keep_git_dir();
        assert_eq!(
            render(clone.into()),
            "ADD --keep-git-dir=true https://github.com/moby/buildkit.git#v0.10.1 /buildkit"
        );

        assert_eq!(render(ExtractArgs::new("a/b/c.gz", "/").unwrap().into()), "ADD a/b/c.gz /");
        let extract = ExtractArgs::new("a/b/c.gz", "/").unwrap().chown("gram");
        assert_eq!(render(extract.into()), "ADD --chown=gram a/b/c.gz /");
    }

    #[test]
    fn test_copy() {
        assert_eq!(render(CopyArgs::new("hom*", "/mydir/").unwrap().into()), "COPY hom* /mydir/");
        assert_eq!(
            render(CopyArgs::new("win path", "/").unwrap().into()),
            r#"COPY ["win path", "/"]"#
        );
        assert_eq!(
            render(CopyArgs::many(["src1", "src2"], "/").unwrap().into()),
            "COPY src1 src2 /"
        );
        assert_eq!(
            render(CopyArgs::new("files", "/somedir/").unwrap().chown(1).into()),
            "COPY --chown=1 files /somedir/"
        );

        let linked = Step::from(CopyArgs::new("files/", "/").unwrap().link());
        assert_eq!(linked.min_version(), SyntaxVersion::V1_4);
        assert_eq!(render(linked), "COPY --link files/ /");

        let from = CopyArgs::new("files/", "/")
            .unwrap()
            .from_stage(BaseImage::new("build"));
        assert_eq!(render(from.into()), "COPY --from=build files/ /");

        let ordered = CopyArgs::new("a", "/b")
            .unwrap()
            .from_stage("build")
            .link()
            .chown("gram:docker");
        assert_eq!(
            render(ordered.into()),
            "COPY --chown=gram:docker --link --from=build a /b"
        );
        assert!(CopyArgs::many(Vec::<String>::new(), "/").is_err());
    }

    #[test]
    fn test_volume_user_workdir() {
        assert_eq!(
            render(Step::volume(["/var/log", "/var/db"]).unwrap()),
            "VOLUME /var/log /var/db"
        );
        assert_eq!(render(Step::volume(["win path"]).unwrap()), r#"VOLUME ["win path"]"#);
        assert_eq!(render(Step::user("gram").unwrap()), "USER gram");
        assert_eq!(
            render(UserArgs::new(1).unwrap().with_group(100).into()),
            "USER 1:100"
        );
        assert_eq!(render(Step::workdir("win path").unwrap()), "WORKDIR win path");
        assert!(Step::workdir("").is_err());
    }

    #[test]
    fn test_onbuild() {
        let copy = Step::from(CopyArgs::new(".", "/app/src").unwrap());
        assert_eq!(render(Step::onbuild(copy).unwrap()), "ONBUILD COPY . /app/src");

        let inner = Step::onbuild(Step::run(["echo hello"]).unwrap()).unwrap();
        assert_eq!(Step::onbuild(inner).unwrap_err(), DockedError::NestedOnbuild);

        let Step::Onbuild(args) = Step::onbuild(Step::workdir("/app").unwrap()).unwrap() else {
            panic!("expected ONBUILD");
        };
        assert_eq!(args.trigger().kind(), StepKind::Workdir);

        let linked = Step::from(CopyArgs::new("a", "/").unwrap().link());
        assert_eq!(Step::onbuild(linked).unwrap().min_version(), SyntaxVersion::V1_4);
    }

    #[test]
    fn test_stopsignal() {
        assert_eq!(render(Step::stopsignal("SIGKILL").unwrap()), "STOPSIGNAL SIGKILL");
        assert_eq!(render(Step::stopsignal(9).unwrap()), "STOPSIGNAL 9");
    }

    #[test]
    fn test_healthcheck() {
        assert_eq!(render(HealthCheck::none().into()), "HEALTHCHECK NONE");
        assert_eq!(
            render(HealthCheck::cmd("curl -f localhost").unwrap().into()),
            r#"HEALTHCHECK CMD ["curl", "-f", "localhost"]"#
        );
        assert_eq!(
            render(HealthCheck::cmd(Invocation::shell("curl -f localhost")).unwrap().into()),
            "HEALTHCHECK CMD curl -f localhost"
        );
        let check = HealthCheck::cmd("echo 1").unwrap().interval(Duration::from_secs(34));
        assert_eq!(render(check.into()), r#"HEALTHCHECK --interval=34s CMD ["echo", "1"]"#);
        let check = HealthCheck::cmd("echo 1")
            .unwrap()
            .timeout("5m")
            .start_period("5m")
            .retries(9);
        assert_eq!(
            render(check.into()),
            r#"HEALTHCHECK --timeout=5m --start-period=5m --retries=9 CMD ["echo", "1"]"#
        );
        let defaults = HealthCheck::cmd("echo 1").unwrap().interval(Duration::from_secs(30));
        assert_eq!(render(defaults.into()), r#"HEALTHCHECK CMD ["echo", "1"]"#);
    }

    #[test]
    fn test_sub_second_timespan() {
        assert_eq!(Timespan::from(Duration::from_millis(500)).to_string(), "500ms");
        assert_eq!(Timespan::from(Duration::from_millis(1500)).to_string(), "1500ms");
        assert_eq!(Timespan::from(Duration::from_micros(250)).to_string(), "250us");
        assert_eq!(Timespan::from(Duration::from_nanos(7)).to_string(), "7ns");
        assert_eq!(Timespan::from(Duration::ZERO).to_string(), "0s");

        let check = HealthCheck::cmd("echo 1").unwrap().interval(Duration::from_millis(250));
        assert_eq!(render(check.into()), r#"HEALTHCHECK --interval=250ms CMD ["echo", "1"]"#);
    }

    #[test]
    fn test_shell() {
        assert_eq!(render(Step::shell(["bash", "-c"]).unwrap()), r#"SHELL ["bash", "-c"]"#);
        assert_eq!(render(Step::shell("bash -c").unwrap()), r#"SHELL ["bash", "-c"]"#);
    }

    #[test]
    fn test_kind_and_role() {
        assert_eq!(Step::expose(80).role(), StepRole::Run);
        assert_eq!(Step::workdir("/").unwrap().role(), StepRole::Build);
        let clone = Step::from(CloneArgs::new("https://x/y.git", "/y").unwrap());
        assert_eq!(clone.kind().name(), "CLONE");
        assert_eq!(clone.kind().keyword(), "ADD");
        assert_eq!(clone.min_version(), SyntaxVersion::MasterLabs);
    }
}
