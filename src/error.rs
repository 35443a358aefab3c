// ABOUTME: Application-wide error types for hl.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::DeployError;
use crate::process::ProcessError;
use crate::runtime::RestartError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot locate hl home: set HL_HOME or HOME")]
    NoHome,

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Restart(#[from] RestartError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Pipeline stage the error aborted in, if any.
    pub fn stage(&self) -> Option<crate::deploy::Stage> {
        match self {
            Error::Deploy(e) => e.stage(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
