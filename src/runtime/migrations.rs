// ABOUTME: One-shot migration container run against a not-yet-promoted image.
// ABOUTME: Uses docker run --rm on the app network with live stdio.

use std::path::Path;

use nonempty::NonEmpty;

use super::DOCKER;
use crate::process::{CommandRunner, CommandSpec, ProcessError};
use crate::types::{EnvPair, ImageRef};

/// Inputs for a migration run.
///
/// `image` must be the commit-addressed tag of the new build, never `latest`:
/// migrations validate the new code before it is exposed.
#[derive(Debug, Clone)]
pub struct MigrationRequest<'a> {
    pub image: &'a ImageRef,
    pub network: &'a str,
    pub command: &'a NonEmpty<String>,
    pub env: &'a [EnvPair],
    pub env_file: Option<&'a Path>,
    pub workdir: &'a Path,
}

/// `docker run --rm [--env-file f] -e K=V... --network <net> <image> <command...>`
pub fn migration_command(request: &MigrationRequest<'_>) -> CommandSpec {
    let mut cmd = CommandSpec::new(DOCKER)
        .args(["run", "--rm"])
        .current_dir(request.workdir);

    if let Some(env_file) = request.env_file {
        cmd = cmd.opt("--env-file", env_file.display().to_string());
    }

    for pair in request.env {
        cmd = cmd.opt("-e", pair.to_string());
    }

    cmd.opt("--network", request.network)
        .arg(request.image.to_string())
        .args(request.command.iter().cloned())
}

/// Run the migration command to completion. Success iff it exits 0.
///
/// No readiness check is made for the services the command talks to; an
/// unreachable database shows up as a failing command.
pub async fn run_migrations<R: CommandRunner + ?Sized>(
    runner: &R,
    request: &MigrationRequest<'_>,
) -> Result<(), ProcessError> {
    let cmd = migration_command(request);
    tracing::debug!(image = %request.image, network = request.network, "running migrations");
    runner.run(&cmd).await
}
