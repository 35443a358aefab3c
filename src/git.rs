// ABOUTME: Exports a commit from the app's bare repository into a build context.
// ABOUTME: The export lives in a temporary directory removed when the handle is closed or dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::types::CommitRef;

const ARCHIVE_NAME: &str = "source.tar";
const CONTEXT_DIR: &str = "context";

/// A checked-out tree of one commit, without git metadata.
#[derive(Debug)]
pub struct ExportedCommit {
    dir: TempDir,
    context: PathBuf,
}

impl ExportedCommit {
    /// Root of the exported tree; use as the build context.
    pub fn context(&self) -> &Path {
        &self.context
    }

    /// Remove the export, reporting failure instead of ignoring it.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

/// `git archive` of `commit`, then unpacked into a fresh directory.
pub fn export_commands(git_dir: &Path, commit: &CommitRef, workdir: &Path) -> [CommandSpec; 2] {
    let archive = workdir.join(ARCHIVE_NAME).display().to_string();
    let context = workdir.join(CONTEXT_DIR).display().to_string();

    [
        CommandSpec::new("git")
            .opt("--git-dir", git_dir.display().to_string())
            .args(["archive", "--format=tar"])
            .opt("-o", archive.clone())
            .arg(commit.as_str()),
        CommandSpec::new("tar").args(["-xf", archive.as_str(), "-C", context.as_str()]),
    ]
}

/// Export `commit` from the bare repository at `git_dir`.
pub async fn export_commit<R: CommandRunner + ?Sized>(
    runner: &R,
    git_dir: &Path,
    commit: &CommitRef,
) -> Result<ExportedCommit> {
    if !git_dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "git repository not found: {}",
            git_dir.display()
        )));
    }

    let dir = tempfile::Builder::new().prefix("hl-build-").tempdir()?;
    let context = dir.path().join(CONTEXT_DIR);
    tokio::fs::create_dir(&context).await?;

    tracing::debug!(commit = %commit, dir = %dir.path().display(), "exporting commit");
    for cmd in export_commands(git_dir, commit, dir.path()) {
        runner.run(&cmd).await?;
    }

    Ok(ExportedCommit { dir, context })
}
