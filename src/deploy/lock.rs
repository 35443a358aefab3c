// ABOUTME: Per-app deploy lock preventing concurrent pipelines for the same app.
// ABOUTME: Atomic lock-file creation and breaking, with holder info stored in ~/.local/state/hl/.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AppName;

use super::error::{DeployError, LockError, LockHolderInfo};

/// State directory below `$XDG_STATE_HOME` (or `$HOME/.local/state`).
const STATE_SUBDIR: &str = "hl";

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// App being deployed.
    pub app: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(app: &AppName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            app: app.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    pub fn holder_info(&self) -> LockHolderInfo {
        LockHolderInfo {
            holder: self.holder.clone(),
            pid: self.pid,
            started_at: self.started_at,
        }
    }
}

/// `$XDG_STATE_HOME/hl`, falling back to `$HOME/.local/state/hl`.
pub fn default_lock_dir() -> Result<PathBuf, DeployError> {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(state).join(STATE_SUBDIR));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".local/state").join(STATE_SUBDIR))
        .ok_or(DeployError::Lock(LockError::NoStateDir))
}

/// A held deploy lock. Released explicitly or, best effort, on drop.
#[derive(Debug)]
pub struct DeployLock {
    path: PathBuf,
    app: AppName,
    released: bool,
}

impl DeployLock {
    /// Path to the lock file for an app.
    pub fn lock_path(dir: &Path, app: &AppName) -> PathBuf {
        dir.join(format!("{app}.lock"))
    }

    /// Acquire the deploy lock for `app`.
    ///
    /// The lock file is written under a temporary name and hard-linked into
    /// place, so it is never observable half-written and creation fails if the
    /// lock already exists. Stale (>1 hour) and unreadable locks are broken with
    /// a warning; `force` breaks any lock.
    pub async fn acquire(dir: &Path, app: &AppName, force: bool) -> Result<Self, DeployError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DeployError::lock_io(dir, e))?;

        let path = Self::lock_path(dir, app);
        let lock_json = serde_json::to_string(&LockInfo::new(app)).map_err(LockError::from)?;

        if Self::try_create(&path, &lock_json).await? {
            return Ok(Self::held(path, app));
        }

        match Self::check_existing_lock(&path, force).await {
            ExistingLock::Held(existing) => {
                return Err(LockError::Held {
                    app: app.to_string(),
                    holder: existing.holder_info(),
                }
                .into());
            }
            ExistingLock::Breakable(judged) => {
                Self::break_lock(&path, app, judged.as_deref()).await?;
            }
        }

        if !Self::try_create(&path, &lock_json).await? {
            return Err(LockError::Contended(app.to_string()).into());
        }

        Ok(Self::held(path, app))
    }

    fn held(path: PathBuf, app: &AppName) -> Self {
        Self {
            path,
            app: app.clone(),
            released: false,
        }
    }

    /// Atomically create the lock file. `Ok(false)` if it already exists.
    async fn try_create(path: &Path, contents: &str) -> Result<bool, DeployError> {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        let staging = path.with_extension(format!("lock.{}.{seq}", std::process::id()));
        tokio::fs::write(&staging, contents)
            .await
            .map_err(|e| DeployError::lock_io(&staging, e))?;

        let linked = tokio::fs::hard_link(&staging, path).await;
        remove_scratch(&staging).await;

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(DeployError::lock_io(path, e)),
        }
    }

    /// Move the lock judged breakable out of the way.
    ///
    /// The lock is renamed to a tombstone first, so only one process can take
    /// it. If the tombstone no longer holds the contents that were judged
    /// breakable, another process replaced the lock in the meantime: it is put
    /// back and this acquisition gives up. `judged` is `None` when the old lock
    /// could not be read at all.
    async fn break_lock(path: &Path, app: &AppName, judged: Option<&str>) -> Result<(), DeployError> {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        let tombstone = path.with_extension(format!("lock.broken.{}.{seq}", std::process::id()));

        tracing::debug!("Removing stale/forced lock at {}", path.display());
        match tokio::fs::rename(path, &tombstone).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(DeployError::lock_io(path, e)),
        }

        if let Some(judged) = judged {
            let taken = tokio::fs::read_to_string(&tombstone).await.ok();
            if taken.as_deref() != Some(judged) {
                if let Err(e) = tokio::fs::hard_link(&tombstone, path).await {
                    tracing::warn!("Failed to restore lock at {}: {}", path.display(), e);
                }
                remove_scratch(&tombstone).await;
                return Err(LockError::Contended(app.to_string()).into());
            }
        }

        remove_scratch(&tombstone).await;
        Ok(())
    }

    /// Whether the existing lock must be respected or may be broken.
    async fn check_existing_lock(path: &Path, force: bool) -> ExistingLock {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(_) => {
                tracing::warn!("Lock info unreadable, breaking lock");
                return ExistingLock::Breakable(None);
            }
        };

        match serde_json::from_str::<LockInfo>(&contents) {
            Ok(existing) if force => {
                tracing::warn!(
                    "Breaking lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
                ExistingLock::Breakable(Some(contents))
            }
            Ok(existing) if existing.is_stale() => {
                tracing::warn!(
                    "Auto-breaking stale lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
                ExistingLock::Breakable(Some(contents))
            }
            Ok(existing) => ExistingLock::Held(existing),
            Err(_) => {
                tracing::warn!("Lock info corrupted, breaking lock");
                ExistingLock::Breakable(Some(contents))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn app(&self) -> &AppName {
        &self.app
    }

    /// Release the lock.
    pub async fn release(mut self) -> Result<(), DeployError> {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DeployError::lock_io(&self.path, e)),
        }
    }

    /// Run `f` while holding the lock for `app`.
    ///
    /// The lock is released whether `f` succeeds or fails. A failed release is
    /// logged and does not override the result of `f`.
    pub async fn with_lock<F, T, E>(dir: &Path, app: &AppName, force: bool, f: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<DeployError>,
    {
        let lock = Self::acquire(dir, app, force).await?;
        let result = f.await;
        if let Err(e) = lock.release().await {
            tracing::warn!("Failed to release deploy lock: {}", e);
        }
        result
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!("Failed to remove lock {} on drop: {}", self.path.display(), e);
            }
        }
    }
}

enum ExistingLock {
    Held(LockInfo),
    /// Raw contents of the lock that was judged breakable, if readable.
    Breakable(Option<String>),
}

/// Remove a staging file or tombstone. Leftovers are harmless but logged.
async fn remove_scratch(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::debug!("Failed to remove {}: {}", path.display(), e),
    }
}
