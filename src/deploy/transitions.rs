// ABOUTME: State transition methods for the deploy and rollback pipelines.
// ABOUTME: Each method consumes self and returns the next state, or aborts at its stage.

use crate::config::DOCKERFILE;
use crate::health::{HealthGate, HttpProbe};
use crate::process::CommandRunner;
use crate::runtime::{
    BuildRequest, MigrationRequest, build_and_push, promote_to_latest, restart_stack,
    run_migrations,
};

use super::error::{Aborted, StageError};
use super::pipeline::Pipeline;
use super::state::{
    Completed, ImageBuilt, Initialized, Migrated, Promotable, Promoted, Restarted,
};

// =============================================================================
// Initialized -> ImageBuilt
// =============================================================================

impl Pipeline<Initialized> {
    /// Build the image from the request's context and push its commit tags.
    pub async fn build<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
    ) -> Result<Pipeline<ImageBuilt>, Aborted> {
        let Pipeline {
            workspace,
            state: Initialized { request, tags },
        } = self;

        let dockerfile = request
            .dockerfile
            .clone()
            .unwrap_or_else(|| request.context.join(DOCKERFILE));

        let build = BuildRequest {
            context: &request.context,
            dockerfile: Some(&dockerfile),
            tags: tags.build_tags(),
            platforms: Some(&workspace.config.platforms),
        };
        build_and_push(runner, &build)
            .await
            .map_err(StageError::Build)?;

        Ok(Pipeline {
            workspace,
            state: ImageBuilt { request, tags },
        })
    }
}

// =============================================================================
// ImageBuilt -> Migrated
// =============================================================================

impl Pipeline<ImageBuilt> {
    /// Run migrations against the commit-addressed image, never `latest`.
    pub async fn migrate<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
    ) -> Result<Pipeline<Migrated>, Aborted> {
        let Pipeline {
            workspace,
            state: ImageBuilt { request, tags },
        } = self;

        let config = &workspace.config;
        let env = config.migrations.env_with(&request.env_overrides);
        let env_file = workspace.env_file();

        let migration = MigrationRequest {
            image: &tags.sha,
            network: &config.network,
            command: &config.migrations.command,
            env: &env,
            env_file: env_file.as_deref(),
            workdir: &workspace.dir,
        };
        run_migrations(runner, &migration)
            .await
            .map_err(StageError::Migration)?;

        Ok(Pipeline {
            workspace,
            state: Migrated { tags },
        })
    }
}

// =============================================================================
// Migrated | RollbackRequested -> Promoted
// =============================================================================

impl<S: Promotable> Pipeline<S> {
    /// Point the registry's `latest` at this run's image.
    pub async fn promote<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
    ) -> Result<Pipeline<Promoted>, Aborted> {
        let image = self.state.promotion_source().clone();

        promote_to_latest(runner, &image)
            .await
            .map_err(StageError::Retag)?;

        Ok(Pipeline {
            workspace: self.workspace,
            state: Promoted { image },
        })
    }
}

// =============================================================================
// Promoted -> Restarted
// =============================================================================

impl Pipeline<Promoted> {
    /// Pull and recreate the app's compose stack.
    pub async fn restart<R: CommandRunner + ?Sized>(
        self,
        runner: &R,
    ) -> Result<Pipeline<Restarted>, Aborted> {
        let compose_files = restart_stack(runner, &self.workspace.dir, &self.workspace.config.network)
            .await
            .map_err(StageError::Restart)?;

        Ok(Pipeline {
            workspace: self.workspace,
            state: Restarted {
                image: self.state.image,
                compose_files,
            },
        })
    }
}

// =============================================================================
// Restarted -> Completed
// =============================================================================

impl Pipeline<Restarted> {
    /// Block until the configured health endpoint answers healthy.
    pub async fn await_healthy<P: HttpProbe + ?Sized>(
        self,
        probe: &P,
    ) -> Result<Pipeline<Completed>, Aborted> {
        let gate = HealthGate::new(probe, &self.workspace.config.health);
        let health_elapsed = gate.wait().await.map_err(StageError::HealthTimeout)?;

        Ok(Pipeline {
            workspace: self.workspace,
            state: Completed {
                image: self.state.image,
                health_elapsed,
            },
        })
    }
}
