// ABOUTME: Rollback command implementation.
// ABOUTME: Repoints latest at an earlier image, restarts, and health-gates without rebuilding.

use hl::config::{AppWorkspace, HlHome};
use hl::deploy::{DeployError, DeployLock, Orchestrator, default_lock_dir};
use hl::diagnostics::{Diagnostics, Warning};
use hl::error::Result;
use hl::health::HyperProbe;
use hl::output::Output;
use hl::process::SystemRunner;
use hl::types::{AppName, RollbackTarget};

use super::{check_workspace, flush_warnings};

/// Roll `app` back to `target`.
pub async fn rollback(
    home: &HlHome,
    app: &AppName,
    target: RollbackTarget,
    force: bool,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let workspace = AppWorkspace::load(home, app).await?;
    check_workspace(&workspace, &mut diag);

    output.progress(&format!("Rolling back {} to {}", app, target));

    let lock_dir = default_lock_dir()?;
    let lock = DeployLock::acquire(&lock_dir, app, force).await?;

    let orchestrator = Orchestrator::new(&SystemRunner, &HyperProbe, &output);
    let result = orchestrator.rollback(workspace, target).await;

    if let Err(e) = lock.release().await {
        diag.warn(Warning::lock_release(format!(
            "failed to release deploy lock: {}",
            e
        )));
    }

    flush_warnings(&diag, &output);
    let report = result.map_err(DeployError::from)?;

    output.success(&format!("Rolled back to {}", report.image));
    Ok(())
}
