// ABOUTME: Diagnostics accumulator for non-fatal warnings during a pipeline run.
// ABOUTME: Collects warnings that shouldn't fail a deploy but should be shown to users.

/// Collects non-fatal warnings during deploy operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a lock release warning.
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            message: message.into(),
        }
    }

    /// Create a build context cleanup warning.
    pub fn context_cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ContextCleanup,
            message: message.into(),
        }
    }

    /// Create a missing `.env` warning.
    pub fn missing_env_file(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MissingEnvFile,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Failed to release deploy lock (lock file may remain).
    LockRelease,
    /// Failed to remove the exported build context.
    ContextCleanup,
    /// Config lists secrets but the app has no `.env`.
    MissingEnvFile,
}
