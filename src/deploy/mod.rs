// ABOUTME: Deploy and rollback orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Pipeline struct, tag planning, errors, and the deploy lock.

mod error;
mod lock;
mod pipeline;
mod run;
mod state;
mod tags;
mod transitions;

pub use error::{
    Aborted, DeployError, DeployErrorKind, LockError, LockHolderInfo, Stage, StageError,
};
pub use lock::{DeployLock, LockInfo, default_lock_dir};
pub use pipeline::{DeployRequest, Pipeline, PipelineOutcome, Report};
pub use run::Orchestrator;
pub use state::{
    Completed, ImageBuilt, Initialized, Migrated, Promotable, Promoted, Restarted,
    RollbackRequested,
};
pub use tags::{ImageTagSet, plan_tags};
