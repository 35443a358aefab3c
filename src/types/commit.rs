// ABOUTME: Git commit references and rollback targets.
// ABOUTME: Derives the 7-character short SHA that addresses built images.

use std::fmt;
use thiserror::Error;

use super::tag::{ImageTag, TagError};

/// Length of the commit prefix embedded in image tags.
pub const SHORT_SHA_LEN: usize = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitRefError {
    #[error("commit reference must be at least {SHORT_SHA_LEN} characters, got {0}")]
    TooShort(usize),

    #[error("commit reference must be hexadecimal, found '{0}'")]
    NotHex(char),
}

/// A commit SHA (full or abbreviated, at least 7 hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitRef(String);

impl CommitRef {
    pub fn parse(value: &str) -> Result<Self, CommitRefError> {
        let value = value.trim();

        if let Some(c) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(CommitRefError::NotHex(c));
        }

        if value.len() < SHORT_SHA_LEN {
            return Err(CommitRefError::TooShort(value.len()));
        }

        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters of the commit.
    pub fn short(&self) -> &str {
        &self.0[..SHORT_SHA_LEN]
    }

    pub fn short_tag(&self) -> ImageTag {
        ImageTag::sanitize(self.short())
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CommitRef {
    type Err = CommitRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RollbackTargetError {
    #[error("invalid rollback target: {0}")]
    Tag(#[from] TagError),

    #[error("'latest' cannot be a rollback target; name a commit or a tag")]
    Latest,
}

/// The tag a rollback repoints production at.
///
/// Hex input of at least seven characters is treated as a commit and reduced to
/// its short SHA. Anything else must already be a valid tag (for example
/// `master-abc123d`). `latest` is rejected since it names the tag being replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackTarget(ImageTag);

impl RollbackTarget {
    pub fn parse(value: &str) -> Result<Self, RollbackTargetError> {
        let value = value.trim();
        if let Ok(commit) = CommitRef::parse(value) {
            return Ok(Self(commit.short_tag()));
        }

        let tag = ImageTag::new(value)?;
        if tag.is_latest() {
            return Err(RollbackTargetError::Latest);
        }
        Ok(Self(tag))
    }

    pub fn tag(&self) -> &ImageTag {
        &self.0
    }
}

impl fmt::Display for RollbackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RollbackTarget {
    type Err = RollbackTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
