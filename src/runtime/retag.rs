// ABOUTME: Promotion of a commit-addressed image to the repository's latest tag.
// ABOUTME: Three sequential registry operations: pull, tag, push.

use std::fmt;

use super::DOCKER;
use crate::process::{CommandRunner, CommandSpec, ProcessError};
use crate::types::{ImageRef, ImageTag};

/// Sub-operation of a retag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetagStep {
    Pull,
    Tag,
    Push,
}

impl fmt::Display for RetagStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetagStep::Pull => write!(f, "pull"),
            RetagStep::Tag => write!(f, "tag"),
            RetagStep::Push => write!(f, "push"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("retag failed at {step}: {source}")]
pub struct RetagError {
    pub step: RetagStep,
    #[source]
    pub source: ProcessError,
}

/// The pull, tag and push commands that move `latest` to `source`.
pub fn retag_commands(source: &ImageRef) -> [(RetagStep, CommandSpec); 3] {
    let latest = source.with_tag(&ImageTag::latest()).to_string();
    let source = source.to_string();

    [
        (
            RetagStep::Pull,
            CommandSpec::new(DOCKER).args(["pull", source.as_str()]),
        ),
        (
            RetagStep::Tag,
            CommandSpec::new(DOCKER).args(["tag", source.as_str(), latest.as_str()]),
        ),
        (
            RetagStep::Push,
            CommandSpec::new(DOCKER).args(["push", latest.as_str()]),
        ),
    ]
}

/// Point the registry's `latest` tag at `source`.
///
/// Not atomic. A failure before the push leaves the registry's `latest`
/// untouched; repeating the whole operation is safe.
pub async fn promote_to_latest<R: CommandRunner + ?Sized>(
    runner: &R,
    source: &ImageRef,
) -> Result<(), RetagError> {
    for (step, cmd) in retag_commands(source) {
        tracing::debug!(%step, image = %source, "retag");
        runner
            .run(&cmd)
            .await
            .map_err(|source| RetagError { step, source })?;
    }
    Ok(())
}
