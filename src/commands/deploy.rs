// ABOUTME: Deploy command implementation.
// ABOUTME: Exports the commit, then runs the deploy pipeline under the app's deploy lock.

use std::path::PathBuf;

use hl::config::{AppWorkspace, HlHome};
use hl::deploy::{DeployLock, DeployRequest, Orchestrator, default_lock_dir};
use hl::diagnostics::{Diagnostics, Warning};
use hl::error::{Error, Result};
use hl::git::{ExportedCommit, export_commit};
use hl::health::HyperProbe;
use hl::output::Output;
use hl::process::SystemRunner;
use hl::types::{AppName, CommitRef, EnvPair};

use super::{check_workspace, flush_warnings};

pub struct DeployArgs {
    pub app: AppName,
    pub commit: CommitRef,
    pub branch: String,
    pub context: Option<PathBuf>,
    pub dockerfile: Option<PathBuf>,
    pub env: Vec<EnvPair>,
    pub force: bool,
}

/// Deploy a commit of one app.
pub async fn deploy(home: &HlHome, args: DeployArgs, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let workspace = AppWorkspace::load(home, &args.app).await?;
    check_workspace(&workspace, &mut diag);

    output.progress(&format!(
        "Deploying {} {} ({})",
        args.app,
        args.commit.short(),
        args.branch
    ));

    let lock_dir = default_lock_dir()?;
    let lock = DeployLock::acquire(&lock_dir, &args.app, args.force).await?;

    let result = deploy_inner(home, workspace, args, &output, &mut diag).await;

    if let Err(e) = lock.release().await {
        diag.warn(Warning::lock_release(format!(
            "failed to release deploy lock: {}",
            e
        )));
    }

    flush_warnings(&diag, &output);
    let report = result?;

    output.success(&format!("Deployed {}", report.image));
    Ok(())
}

/// Runs while holding the lock.
async fn deploy_inner(
    home: &HlHome,
    workspace: AppWorkspace,
    args: DeployArgs,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<hl::deploy::Report> {
    let runner = SystemRunner;

    let (context, export) = match &args.context {
        Some(dir) => (dir.clone(), None),
        None => {
            output.progress(&format!("  → Exporting {} ...", args.commit.short()));
            let export = export_commit(&runner, &home.git_dir(&args.app), &args.commit).await?;
            (export.context().to_path_buf(), Some(export))
        }
    };

    let result = run_pipeline(&runner, workspace, &args, context, output).await;

    if let Some(export) = export {
        close_export(export, diag);
    }

    result
}

async fn run_pipeline(
    runner: &SystemRunner,
    workspace: AppWorkspace,
    args: &DeployArgs,
    context: PathBuf,
    output: &Output,
) -> Result<hl::deploy::Report> {
    let dockerfile = args
        .dockerfile
        .clone()
        .unwrap_or_else(|| context.join(hl::config::DOCKERFILE));
    if !dockerfile.is_file() {
        return Err(Error::InvalidInput(format!(
            "Dockerfile not found: {}",
            dockerfile.display()
        )));
    }

    let request = DeployRequest::new(args.commit.clone(), args.branch.clone(), context)
        .dockerfile(dockerfile)
        .env_overrides(args.env.clone());

    let orchestrator = Orchestrator::new(runner, &HyperProbe, output);
    let report = orchestrator
        .deploy(workspace, request)
        .await
        .map_err(hl::deploy::DeployError::from)?;
    Ok(report)
}

fn close_export(export: ExportedCommit, diag: &mut Diagnostics) {
    let path = export.context().display().to_string();
    if let Err(e) = export.close() {
        diag.warn(Warning::context_cleanup(format!(
            "failed to remove build context {}: {}",
            path, e
        )));
    }
}
