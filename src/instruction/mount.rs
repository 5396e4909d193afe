//! `RUN --mount` specifications.
//!
//! Each mount type is a plain struct with its documented defaults. Turning
//! one into a [`Mount`] goes through `TryFrom`, which checks the constraints
//! of the type. Attributes equal to their default are left out of the output.

use crate::error::{DockedError, Result};
use crate::format::resolve_stage_name;
use crate::instruction::reference::StageRef;

const CACHE_MODE: u32 = 0o755;
const SECRET_MODE: u32 = 0o400;
const SSH_MODE: u32 = 0o600;
const SSH_ID: &str = "default";
const MAX_MODE: u32 = 0o7777;

/// Concurrent access mode of a cache mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sharing {
    #[default]
    Shared,
    Private,
    Locked,
}

impl Sharing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Private => "private",
            Self::Locked => "locked",
        }
    }
}

/// Bind a directory from the build context, a stage or an image (read-only
/// unless `allow_write` is set; writes are discarded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub target: String,
    /// Path inside `from`; defaults to its root.
    pub source: Option<String>,
    /// Stage or image providing the source; defaults to the build context.
    pub from: Option<StageRef>,
    pub allow_write: bool,
}

impl BindMount {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: None,
            from: None,
            allow_write: false,
        }
    }
}

/// Cache directory for compilers and package managers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMount {
    pub target: String,
    pub id: Option<String>,
    pub allow_write: bool,
    pub sharing: Sharing,
    pub from: Option<StageRef>,
    pub source: Option<String>,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl CacheMount {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            id: None,
            allow_write: true,
            sharing: Sharing::Shared,
            from: None,
            source: None,
            mode: CACHE_MODE,
            uid: 0,
            gid: 0,
        }
    }
}

/// tmpfs mounted in the build container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmpfsMount {
    pub target: String,
    /// Size limit, e.g. `64m`.
    pub size: Option<String>,
}

impl TmpfsMount {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            size: None,
        }
    }
}

/// Build secret exposed as a file, never baked into the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMount {
    pub target: Option<String>,
    pub id: Option<String>,
    pub required: bool,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl Default for SecretMount {
    fn default() -> Self {
        Self {
            target: None,
            id: None,
            required: false,
            mode: SECRET_MODE,
            uid: 0,
            gid: 0,
        }
    }
}

/// Access to the SSH agent of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshMount {
    pub target: Option<String>,
    pub id: String,
    pub required: bool,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl Default for SshMount {
    fn default() -> Self {
        Self {
            target: None,
            id: SSH_ID.to_string(),
            required: false,
            mode: SSH_MODE,
            uid: 0,
            gid: 0,
        }
    }
}

/// A validated mount specification.
///
/// Only obtainable through `TryFrom` on one of the mount structs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount(Kind);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Bind(BindMount),
    Cache(CacheMount),
    Tmpfs(TmpfsMount),
    Secret(SecretMount),
    Ssh(SshMount),
}

impl Mount {
    /// The `type=` attribute.
    pub fn kind(&self) -> &'static str {
        match &self.0 {
            Kind::Bind(_) => "bind",
            Kind::Cache(_) => "cache",
            Kind::Tmpfs(_) => "tmpfs",
            Kind::Secret(_) => "secret",
            Kind::Ssh(_) => "ssh",
        }
    }

    /// Render as a comma-joined `key=value` list.
    pub fn render(&self) -> Result<String> {
        let mut parts = vec![("type", self.kind().to_string())];
        match &self.0 {
            Kind::Bind(m) => {
                parts.push(("target", m.target.clone()));
                if let Some(source) = &m.source {
                    parts.push(("source", source.clone()));
                }
                if let Some(from) = &m.from {
                    parts.push(("from", resolve_stage_name(from, "RUN --mount=type=bind")?));
                }
                if m.allow_write {
                    parts.push(("rw", "true".to_string()));
                }
            }
            Kind::Cache(m) => {
                parts.push(("target", m.target.clone()));
                if let Some(id) = &m.id {
                    parts.push(("id", id.clone()));
                }
                if !m.allow_write {
                    parts.push(("ro", "true".to_string()));
                }
                if m.sharing != Sharing::Shared {
                    parts.push(("sharing", m.sharing.as_str().to_string()));
                }
                if let Some(from) = &m.from {
                    parts.push(("from", resolve_stage_name(from, "RUN --mount=type=cache")?));
                }
                if let Some(source) = &m.source {
                    parts.push(("source", source.clone()));
                }
                push_ownership(&mut parts, m.mode, CACHE_MODE, m.uid, m.gid);
            }
            Kind::Tmpfs(m) => {
                parts.push(("target", m.target.clone()));
                if let Some(size) = &m.size {
                    parts.push(("size", size.clone()));
                }
            }
            Kind::Secret(m) => {
                if let Some(target) = &m.target {
                    parts.push(("target", target.clone()));
                }
                if let Some(id) = &m.id {
                    parts.push(("id", id.clone()));
                }
                if m.required {
                    parts.push(("required", "true".to_string()));
                }
                push_ownership(&mut parts, m.mode, SECRET_MODE, m.uid, m.gid);
            }
            Kind::Ssh(m) => {
                if let Some(target) = &m.target {
                    parts.push(("target", target.clone()));
                }
                if m.id != SSH_ID {
                    parts.push(("id", m.id.clone()));
                }
                if m.required {
                    parts.push(("required", "true".to_string()));
                }
                push_ownership(&mut parts, m.mode, SSH_MODE, m.uid, m.gid);
            }
        }
        Ok(parts
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(","))
    }
}

fn push_ownership(
    parts: &mut Vec<(&'static str, String)>,
    mode: u32,
    default_mode: u32,
    uid: u32,
    gid: u32,
) {
    if mode != default_mode {
        parts.push(("mode", format!("0{:o}", mode)));
    }
    if uid != 0 {
        parts.push(("uid", uid.to_string()));
    }
    if gid != 0 {
        parts.push(("gid", gid.to_string()));
    }
}

fn invalid(kind: &'static str, reason: &str) -> DockedError {
    DockedError::InvalidMount {
        kind,
        reason: reason.to_string(),
    }
}

fn check_target(kind: &'static str, target: &str) -> Result<()> {
    if target.is_empty() {
        return Err(invalid(kind, "target must not be empty"));
    }
    Ok(())
}

fn check_mode(kind: &'static str, mode: u32) -> Result<()> {
    if mode > MAX_MODE {
        return Err(invalid(kind, &format!("mode 0{:o} is out of range", mode)));
    }
    Ok(())
}

fn check_id(kind: &'static str, id: Option<&str>) -> Result<()> {
    if id.is_some_and(str::is_empty) {
        return Err(invalid(kind, "id must not be empty"));
    }
    Ok(())
}

impl TryFrom<BindMount> for Mount {
    type Error = DockedError;

    fn try_from(mount: BindMount) -> Result<Self> {
        check_target("bind", &mount.target)?;
        Ok(Self(Kind::Bind(mount)))
    }
}

impl TryFrom<CacheMount> for Mount {
    type Error = DockedError;

    fn try_from(mount: CacheMount) -> Result<Self> {
        check_target("cache", &mount.target)?;
        check_id("cache", mount.id.as_deref())?;
        check_mode("cache", mount.mode)?;
        Ok(Self(Kind::Cache(mount)))
    }
}

impl TryFrom<TmpfsMount> for Mount {
    type Error = DockedError;

    fn try_from(mount: TmpfsMount) -> Result<Self> {
        check_target("tmpfs", &mount.target)?;
        Ok(Self(Kind::Tmpfs(mount)))
    }
}

impl TryFrom<SecretMount> for Mount {
    type Error = DockedError;

    fn try_from(mount: SecretMount) -> Result<Self> {
        check_id("secret", mount.id.as_deref())?;
        check_mode("secret", mount.mode)?;
        Ok(Self(Kind::Secret(mount)))
    }
}

impl TryFrom<SshMount> for Mount {
    type Error = DockedError;

    fn try_from(mount: SshMount) -> Result<Self> {
        check_id("ssh", Some(&mount.id))?;
        check_mode("ssh", mount.mode)?;
        Ok(Self(Kind::Ssh(mount)))
    }
}
