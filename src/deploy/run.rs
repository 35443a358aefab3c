// ABOUTME: Drives deploy and rollback pipelines from start to finish.
// ABOUTME: Stages run strictly in order; the first failure ends the run.

use crate::config::AppWorkspace;
use crate::health::HttpProbe;
use crate::output::Output;
use crate::process::CommandRunner;
use crate::types::RollbackTarget;

use super::error::Stage;
use super::pipeline::{DeployRequest, Pipeline, PipelineOutcome};
use super::state::Promoted;

/// Runs pipelines against a command runner and a health probe.
pub struct Orchestrator<'a, R: ?Sized, P: ?Sized> {
    runner: &'a R,
    probe: &'a P,
    output: &'a Output,
}

impl<'a, R, P> Orchestrator<'a, R, P>
where
    R: CommandRunner + ?Sized,
    P: HttpProbe + ?Sized,
{
    pub fn new(runner: &'a R, probe: &'a P, output: &'a Output) -> Self {
        Self {
            runner,
            probe,
            output,
        }
    }

    /// Build -> Migrate -> Retag -> Restart -> Health.
    pub async fn deploy(&self, workspace: AppWorkspace, request: DeployRequest) -> PipelineOutcome {
        let pipeline = Pipeline::deploy(workspace, request);
        tracing::debug!(
            app = %pipeline.app(),
            commit = %pipeline.request().commit,
            sha_tag = %pipeline.tags().sha,
            "starting deploy"
        );

        self.output.stage(
            Stage::Build,
            &format!("Building {} ...", pipeline.tags().branch_sha),
        );
        let pipeline = pipeline.build(self.runner).await?;

        self.output.stage(Stage::Migrate, "Running migrations ...");
        let pipeline = pipeline.migrate(self.runner).await?;

        self.output.stage(Stage::Retag, "Promoting image to latest ...");
        let pipeline = pipeline.promote(self.runner).await?;

        self.finish_release(pipeline).await
    }

    /// Retag -> Restart -> Health, for an image that already exists.
    pub async fn rollback(&self, workspace: AppWorkspace, target: RollbackTarget) -> PipelineOutcome {
        let pipeline = Pipeline::rollback(workspace, target);
        tracing::debug!(app = %pipeline.app(), image = %pipeline.image(), "starting rollback");

        self.output.stage(
            Stage::Retag,
            &format!("Promoting {} to latest ...", pipeline.image()),
        );
        let pipeline = pipeline.promote(self.runner).await?;

        self.finish_release(pipeline).await
    }

    async fn finish_release(&self, pipeline: Pipeline<Promoted>) -> PipelineOutcome {
        self.output.stage(Stage::Restart, "Restarting stack ...");
        let pipeline = pipeline.restart(self.runner).await?;

        self.output.stage(
            Stage::Health,
            &format!(
                "Waiting for {} to become healthy ...",
                pipeline.workspace().config.health.url
            ),
        );
        let pipeline = pipeline.await_healthy(self.probe).await?;

        Ok(pipeline.finish())
    }
}
