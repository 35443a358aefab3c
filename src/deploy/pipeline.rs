// ABOUTME: Generic pipeline struct parameterized by state marker.
// ABOUTME: Entry points for deploy and rollback runs and the final run report.

use std::path::PathBuf;
use std::time::Duration;

use nonempty::NonEmpty;

use crate::config::AppWorkspace;
use crate::types::{AppName, CommitRef, EnvPair, ImageRef, RollbackTarget};

use super::error::Aborted;
use super::state::{Completed, Initialized, Restarted, RollbackRequested};
use super::tags::{ImageTagSet, plan_tags};

/// What to deploy.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub commit: CommitRef,
    pub branch: String,
    /// Build context directory (usually an exported checkout of `commit`).
    pub context: PathBuf,
    /// Defaults to `<context>/Dockerfile`.
    pub dockerfile: Option<PathBuf>,
    /// Extra migration environment, overriding `migrations.env`.
    pub env_overrides: Vec<EnvPair>,
}

impl DeployRequest {
    pub fn new(commit: CommitRef, branch: impl Into<String>, context: impl Into<PathBuf>) -> Self {
        Self {
            commit,
            branch: branch.into(),
            context: context.into(),
            dockerfile: None,
            env_overrides: Vec::new(),
        }
    }

    pub fn dockerfile(mut self, dockerfile: impl Into<PathBuf>) -> Self {
        self.dockerfile = Some(dockerfile.into());
        self
    }

    pub fn env_overrides(mut self, env: Vec<EnvPair>) -> Self {
        self.env_overrides = env;
        self
    }
}

/// A pipeline run in progress, parameterized by its current state.
///
/// The workspace is a frozen snapshot of the app's configuration for the whole
/// run. Transitions consume the pipeline, so a stage cannot be repeated or
/// skipped, and a failed transition leaves nothing to continue from.
///
/// A built image cannot be promoted before its migrations ran:
///
/// ```compile_fail
/// use hl::deploy::{ImageBuilt, Pipeline};
/// use hl::process::SystemRunner;
///
/// async fn skip_migrations(p: Pipeline<ImageBuilt>) {
///     let _ = p.promote(&SystemRunner).await;
/// }
/// ```
///
/// A rollback never builds or migrates:
///
/// ```compile_fail
/// use hl::deploy::{Pipeline, RollbackRequested};
/// use hl::process::SystemRunner;
///
/// async fn migrate_rollback(p: Pipeline<RollbackRequested>) {
///     let _ = p.migrate(&SystemRunner).await;
/// }
/// ```
///
/// The stack is only restarted after promotion:
///
/// ```compile_fail
/// use hl::deploy::{Migrated, Pipeline};
/// use hl::process::SystemRunner;
///
/// async fn restart_early(p: Pipeline<Migrated>) {
///     let _ = p.restart(&SystemRunner).await;
/// }
/// ```
#[derive(Debug)]
pub struct Pipeline<S> {
    pub(crate) workspace: AppWorkspace,
    pub(crate) state: S,
}

impl Pipeline<Initialized> {
    /// Start a deploy of `request` for the app in `workspace`.
    pub fn deploy(workspace: AppWorkspace, request: DeployRequest) -> Self {
        let tags = plan_tags(&workspace.config.image, &request.commit, &request.branch);
        Pipeline {
            workspace,
            state: Initialized { request, tags },
        }
    }

    pub fn tags(&self) -> &ImageTagSet {
        &self.state.tags
    }

    pub fn request(&self) -> &DeployRequest {
        &self.state.request
    }
}

impl Pipeline<RollbackRequested> {
    /// Start a rollback to an image that was built earlier.
    pub fn rollback(workspace: AppWorkspace, target: RollbackTarget) -> Self {
        let image = workspace.config.image.with_tag(target.tag());
        Pipeline {
            workspace,
            state: RollbackRequested { target, image },
        }
    }

    pub fn target(&self) -> &RollbackTarget {
        &self.state.target
    }

    pub fn image(&self) -> &ImageRef {
        &self.state.image
    }
}

impl<S> Pipeline<S> {
    pub fn app(&self) -> &AppName {
        self.workspace.app()
    }

    pub fn workspace(&self) -> &AppWorkspace {
        &self.workspace
    }
}

impl Pipeline<Restarted> {
    /// Compose files the stack was restarted with.
    pub fn compose_files(&self) -> &NonEmpty<PathBuf> {
        &self.state.compose_files
    }
}

impl Pipeline<Completed> {
    pub fn image(&self) -> &ImageRef {
        &self.state.image
    }

    /// Consume the pipeline, yielding its report.
    pub fn finish(self) -> Report {
        Report {
            app: self.workspace.config.app,
            image: self.state.image,
            health_elapsed: self.state.health_elapsed,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub app: AppName,
    /// The image `latest` now points at.
    pub image: ImageRef,
    /// Time from the first health poll to the healthy one.
    pub health_elapsed: Duration,
}

/// A run either completes with a report or aborts at a named stage.
pub type PipelineOutcome = Result<Report, Aborted>;
