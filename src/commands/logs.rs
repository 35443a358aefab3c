// ABOUTME: Logs command implementation.
// ABOUTME: Streams docker compose logs across the app's primary and accessory compose files.

use hl::config::{AppWorkspace, HlHome};
use hl::error::Result;
use hl::process::SystemRunner;
use hl::runtime::{LogsOptions, show_logs};
use hl::types::AppName;

/// Show logs for `app`. Does not take the deploy lock.
pub async fn logs(home: &HlHome, app: &AppName, options: LogsOptions) -> Result<()> {
    let workspace = AppWorkspace::load(home, app).await?;
    tracing::debug!(app = %app, dir = %workspace.dir.display(), "showing logs");

    show_logs(
        &SystemRunner,
        &workspace.dir,
        &workspace.config.network,
        &options,
    )
    .await?;
    Ok(())
}
