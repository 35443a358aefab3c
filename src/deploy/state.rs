// ABOUTME: Pipeline state marker types for the type state pattern.
// ABOUTME: Each state carries exactly the data the next transition needs.

use std::path::PathBuf;
use std::time::Duration;

use nonempty::NonEmpty;

use crate::types::{ImageRef, RollbackTarget};

use super::pipeline::DeployRequest;
use super::tags::ImageTagSet;

/// Deploy requested: tags planned, nothing built yet.
/// Available actions: `build()`
#[derive(Debug, Clone)]
pub struct Initialized {
    pub(crate) request: DeployRequest,
    pub(crate) tags: ImageTagSet,
}

/// Image built and pushed under every planned tag.
/// Available actions: `migrate()`
#[derive(Debug, Clone)]
pub struct ImageBuilt {
    pub(crate) request: DeployRequest,
    pub(crate) tags: ImageTagSet,
}

/// Migrations succeeded against the commit-addressed image.
/// Available actions: `promote()`
#[derive(Debug, Clone)]
pub struct Migrated {
    pub(crate) tags: ImageTagSet,
}

/// Rollback requested to an existing image. Build and migrate do not apply.
/// Available actions: `promote()`
#[derive(Debug, Clone)]
pub struct RollbackRequested {
    pub(crate) target: RollbackTarget,
    pub(crate) image: ImageRef,
}

/// `latest` now points at `image`.
/// Available actions: `restart()`
#[derive(Debug, Clone)]
pub struct Promoted {
    pub(crate) image: ImageRef,
}

/// Stack pulled and recreated.
/// Available actions: `await_healthy()`
#[derive(Debug, Clone)]
pub struct Restarted {
    pub(crate) image: ImageRef,
    pub(crate) compose_files: NonEmpty<PathBuf>,
}

/// Health endpoint answered healthy.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) image: ImageRef,
    pub(crate) health_elapsed: Duration,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Migrated {}
    impl Sealed for super::RollbackRequested {}
}

/// States from which an image may be promoted to `latest`.
///
/// Only a migrated deploy or a rollback qualify; a freshly built image cannot
/// skip its migrations.
pub trait Promotable: sealed::Sealed {
    fn promotion_source(&self) -> &ImageRef;
}

impl Promotable for Migrated {
    fn promotion_source(&self) -> &ImageRef {
        &self.tags.sha
    }
}

impl Promotable for RollbackRequested {
    fn promotion_source(&self) -> &ImageRef {
        &self.image
    }
}
