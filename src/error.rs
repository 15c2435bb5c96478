//! Error types.
//!
//! Errors are layered: each concern has its own enum, and the top-level
//! [`Error`] wraps them so callers can match on the category they care about.

use std::fmt;

use thiserror::Error;

pub use crate::core::classify::{ApiFailure, FailureKind};

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ImportId(#[from] ImportIdError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not initialized: run `platsync init` first")]
    NotInitialized,

    #[error("already initialized: {0} exists")]
    AlreadyInitialized(String),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("no team given and no default team configured")]
    NoTeam,

    #[error("api token not set: export {0}")]
    MissingToken(String),

    #[error("{0}")]
    Unsupported(String),
}

/// Import identifier parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportIdError {
    #[error("invalid id '{id}': expected format {expected}")]
    Malformed { id: String, expected: String },
}

/// Errors raised while validating desired state or planning changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("environment variable key must not be empty")]
    EmptyKey,

    #[error("environment variable {key} has no target")]
    EmptyTarget { key: String },

    #[error("unknown target '{0}': expected production, preview or development")]
    InvalidTarget(String),

    #[error("environment variable {key} sets git branch '{branch}' but targets more than preview")]
    BranchOutsidePreview { key: String, branch: String },

    #[error("environment variable {key} is declared twice for target {target}{}", branch_suffix(.git_branch))]
    Conflict {
        key: String,
        target: String,
        git_branch: Option<String>,
    },

    #[error("remote record for {label} has no id")]
    MissingId { label: String },

    #[error("member identity unresolved: {member}")]
    MemberUnresolved { member: String },
}

fn branch_suffix(branch: &Option<String>) -> String {
    match branch {
        Some(b) => format!(" on branch {}", b),
        None => String::new(),
    }
}

/// The kind of remote mutation an operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpKind::Create => "create",
            OpKind::Read => "read",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Identifies one remote operation in error reports.
///
/// `resource` is a human-readable label such as `API_KEY [production]` or a
/// member UID. Secret values never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpContext {
    pub kind: OpKind,
    pub resource: String,
    pub id: Option<String>,
}

impl OpContext {
    pub fn new(kind: OpKind, resource: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            kind,
            resource: resource.into(),
            id: id.map(str::to_string),
        }
    }
}

impl fmt::Display for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.resource)?;
        if let Some(id) = &self.id {
            write!(f, " ({})", id)?;
        }
        Ok(())
    }
}

/// Errors raised while issuing a batch of remote operations.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// A single operation failed before anything else was applied.
    #[error("{op} failed: {message}")]
    Failed {
        op: OpContext,
        kind: FailureKind,
        message: String,
    },

    /// Some operations were applied before the batch stopped.
    ///
    /// Completed operations are not rolled back; the next pass picks up
    /// from whatever state the remote is left in.
    #[error("{}", describe_partial(.completed, .failed, .abandoned, .cancelled))]
    Partial {
        completed: Vec<OpContext>,
        failed: Option<Box<ApplyError>>,
        abandoned: usize,
        cancelled: bool,
    },
}

impl ApplyError {
    /// Operations that were applied before the batch stopped.
    pub fn completed(&self) -> &[OpContext] {
        match self {
            ApplyError::Failed { .. } => &[],
            ApplyError::Partial { completed, .. } => completed,
        }
    }
}

fn describe_partial(
    completed: &[OpContext],
    failed: &Option<Box<ApplyError>>,
    abandoned: &usize,
    cancelled: &bool,
) -> String {
    let mut msg = format!(
        "partially applied: {} completed, {} abandoned",
        completed.len(),
        abandoned
    );
    if *cancelled {
        msg.push_str(" (cancelled)");
    }
    if let Some(err) = failed {
        msg.push_str(&format!("; {}", err));
    }
    msg
}

pub type Result<T> = std::result::Result<T, Error>;
