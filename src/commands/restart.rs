// ABOUTME: Restart command implementation.
// ABOUTME: Pulls and recreates the compose stack without touching images or tags.

use hl::config::{AppWorkspace, HlHome};
use hl::deploy::{DeployLock, default_lock_dir};
use hl::error::Result;
use hl::output::Output;
use hl::process::SystemRunner;
use hl::runtime::restart_stack;
use hl::types::AppName;

/// Restart the stack of `app`, holding its deploy lock.
pub async fn restart(home: &HlHome, app: &AppName, mut output: Output) -> Result<()> {
    output.start_timer();
    let workspace = AppWorkspace::load(home, app).await?;

    output.progress(&format!("Restarting {}", app));

    let lock_dir = default_lock_dir()?;
    let files = DeployLock::with_lock(&lock_dir, app, false, async {
        let files = restart_stack(&SystemRunner, &workspace.dir, &workspace.config.network).await?;
        Ok::<_, hl::error::Error>(files)
    })
    .await?;

    output.success(&format!(
        "Restarted {} ({} compose file(s))",
        app,
        files.len()
    ));
    Ok(())
}
