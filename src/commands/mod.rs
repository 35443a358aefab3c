// ABOUTME: Command module aggregator for the hl CLI.
// ABOUTME: Re-exports the deploy, rollback, restart and logs command handlers.

mod deploy;
mod logs;
mod restart;
mod rollback;

pub use deploy::{DeployArgs, deploy};
pub use logs::logs;
pub use restart::restart;
pub use rollback::rollback;

use hl::config::AppWorkspace;
use hl::diagnostics::{Diagnostics, Warning};
use hl::output::Output;

/// Warn about config that loads fine but will likely break at runtime.
fn check_workspace(workspace: &AppWorkspace, diag: &mut Diagnostics) {
    if !workspace.config.secrets.is_empty() && workspace.env_file().is_none() {
        diag.warn(Warning::missing_env_file(format!(
            "{} lists secrets but {} has no .env file",
            workspace.app(),
            workspace.dir.display()
        )));
    }
}

/// Emit collected warnings.
fn flush_warnings(diag: &Diagnostics, output: &Output) {
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
}
