// ABOUTME: The CommandRunner seam and its tokio-backed implementation.
// ABOUTME: SystemRunner inherits stdio so build and migration output streams live.

use std::process::Stdio;

use async_trait::async_trait;
use snafu::ResultExt;
use tokio::process::Command;

use super::command::CommandSpec;
use super::error::{ExitSnafu, ProcessError, SpawnSnafu};

/// Runs external commands to completion.
///
/// Success means the process exited with status 0. Implementations must not
/// retry.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<(), ProcessError>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    async fn run(&self, command: &CommandSpec) -> Result<(), ProcessError> {
        (**self).run(command).await
    }
}

/// Runs commands on the local host with inherited stdin/stdout/stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<(), ProcessError> {
        tracing::debug!(command = %command, dir = ?command.current_dir, "running");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        let status = cmd.status().await.context(SpawnSnafu {
            program: command.program.clone(),
        })?;

        if !status.success() {
            return ExitSnafu {
                command: command.to_string(),
                code: status.code(),
            }
            .fail();
        }

        Ok(())
    }
}
