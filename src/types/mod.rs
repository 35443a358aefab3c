// ABOUTME: Validated domain types shared by the pipeline and its collaborators.
// ABOUTME: Parsing happens once at the edge so the pipeline only sees valid values.

mod app_name;
mod commit;
mod env_pair;
mod image_ref;
mod tag;

pub use app_name::{AppName, AppNameError};
pub use commit::{CommitRef, CommitRefError, RollbackTarget, RollbackTargetError, SHORT_SHA_LEN};
pub use env_pair::{EnvPair, EnvPairError};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use tag::{ImageTag, LATEST_TAG, TagError};
