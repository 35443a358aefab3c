// ABOUTME: Multi-platform, multi-tag image build and push via docker buildx.
// ABOUTME: One invocation pushes every tag; any failure fails the whole build.

use std::path::Path;

use nonempty::NonEmpty;

use super::DOCKER;
use crate::process::{CommandRunner, CommandSpec, ProcessError};
use crate::types::ImageRef;

/// Inputs for a single build-and-push.
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    pub context: &'a Path,
    pub dockerfile: Option<&'a Path>,
    pub tags: NonEmpty<ImageRef>,
    pub platforms: Option<&'a NonEmpty<String>>,
}

/// `docker buildx build --push [--platform a,b] -t <tag>... [--file <df>] <context>`
pub fn build_command(request: &BuildRequest<'_>) -> CommandSpec {
    let mut cmd = CommandSpec::new(DOCKER).args(["buildx", "build", "--push"]);

    if let Some(platforms) = request.platforms {
        let joined: Vec<&str> = platforms.iter().map(String::as_str).collect();
        cmd = cmd.opt("--platform", joined.join(","));
    }

    for tag in request.tags.iter() {
        cmd = cmd.opt("-t", tag.to_string());
    }

    if let Some(dockerfile) = request.dockerfile {
        cmd = cmd.opt("--file", dockerfile.display().to_string());
    }

    cmd.arg(request.context.display().to_string())
}

/// Build and push every tag in one buildx run.
///
/// The builder may have pushed some tags before failing; callers must not treat
/// a failure as "nothing was pushed".
pub async fn build_and_push<R: CommandRunner + ?Sized>(
    runner: &R,
    request: &BuildRequest<'_>,
) -> Result<(), ProcessError> {
    let cmd = build_command(request);
    tracing::debug!(tags = request.tags.len(), "building image");
    runner.run(&cmd).await
}
