// ABOUTME: Error types for the deploy and rollback pipelines.
// ABOUTME: Every stage failure carries the stage it happened in; lock failures carry the holder.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::HealthTimeout;
use crate::process::ProcessError;
use crate::runtime::{RestartError, RetagError};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Build,
    Migrate,
    Retag,
    Restart,
    Health,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Build => "build",
            Stage::Migrate => "migrate",
            Stage::Retag => "retag",
            Stage::Restart => "restart",
            Stage::Health => "health",
        };
        f.write_str(name)
    }
}

/// What went wrong inside a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("image build failed: {0}")]
    Build(#[source] ProcessError),

    #[error("migrations failed: {0}")]
    Migration(#[source] ProcessError),

    #[error(transparent)]
    Retag(#[from] RetagError),

    #[error(transparent)]
    Restart(#[from] RestartError),

    #[error(transparent)]
    HealthTimeout(#[from] HealthTimeout),
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Build(_) => Stage::Build,
            StageError::Migration(_) => Stage::Migrate,
            StageError::Retag(_) => Stage::Retag,
            StageError::Restart(_) => Stage::Restart,
            StageError::HealthTimeout(_) => Stage::Health,
        }
    }
}

/// Terminal failure of a pipeline run. Nothing after `stage` was attempted.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct Aborted {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl From<StageError> for Aborted {
    fn from(source: StageError) -> Self {
        Self {
            stage: source.stage(),
            source,
        }
    }
}

/// Who holds a deploy lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHolderInfo {
    pub holder: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error(
        "deploy of {app} already in progress: held by {} (pid {}) since {}; use --force to break it",
        .holder.holder,
        .holder.pid,
        .holder.started_at
    )]
    Held { app: String, holder: LockHolderInfo },

    #[error("lock I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize lock info: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("lock for {0} was taken by another process while breaking it")]
    Contended(String),

    #[error("cannot locate a state directory: neither XDG_STATE_HOME nor HOME is set")]
    NoStateDir,
}

/// Programmatic category of a [`DeployError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    LockHeld,
    Lock,
    Build,
    Migration,
    Retag,
    Restart,
    HealthTimeout,
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Aborted(#[from] Aborted),
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Lock(LockError::Held { .. }) => DeployErrorKind::LockHeld,
            DeployError::Lock(_) => DeployErrorKind::Lock,
            DeployError::Aborted(aborted) => match aborted.source {
                StageError::Build(_) => DeployErrorKind::Build,
                StageError::Migration(_) => DeployErrorKind::Migration,
                StageError::Retag(_) => DeployErrorKind::Retag,
                StageError::Restart(_) => DeployErrorKind::Restart,
                StageError::HealthTimeout(_) => DeployErrorKind::HealthTimeout,
            },
        }
    }

    /// The stage a pipeline aborted in, if it got that far.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DeployError::Aborted(aborted) => Some(aborted.stage),
            DeployError::Lock(_) => None,
        }
    }

    pub fn lock_holder_info(&self) -> Option<&LockHolderInfo> {
        match self {
            DeployError::Lock(LockError::Held { holder, .. }) => Some(holder),
            _ => None,
        }
    }

    pub(crate) fn lock_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeployError::Lock(LockError::Io {
            path: path.into(),
            source,
        })
    }
}
