// ABOUTME: Image tag validation and sanitization.
// ABOUTME: Tags follow the registry grammar [A-Za-z0-9_][A-Za-z0-9_.-]{0,127}.

use std::fmt;
use thiserror::Error;

/// The mutable production tag.
pub const LATEST_TAG: &str = "latest";

const MAX_TAG_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("image tag cannot be empty")]
    Empty,

    #[error("image tag exceeds maximum length of {MAX_TAG_LEN} characters")]
    TooLong,

    #[error("image tag cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in image tag: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTag(String);

impl ImageTag {
    pub fn new(value: &str) -> Result<Self, TagError> {
        let first = value.chars().next().ok_or(TagError::Empty)?;

        if value.len() > MAX_TAG_LEN {
            return Err(TagError::TooLong);
        }

        if first == '.' || first == '-' {
            return Err(TagError::InvalidStart(first));
        }

        if let Some(c) = value.chars().find(|c| !is_tag_char(*c)) {
            return Err(TagError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    /// Coerce arbitrary text (a git branch name, typically) into a valid tag.
    ///
    /// Illegal characters become `-`, a leading `.` or `-` becomes `_`, and the
    /// result is truncated to the maximum tag length. Empty input yields `_`.
    pub fn sanitize(value: &str) -> Self {
        let mut out: String = value
            .chars()
            .map(|c| if is_tag_char(c) { c } else { '-' })
            .take(MAX_TAG_LEN)
            .collect();

        match out.chars().next() {
            None => out.push('_'),
            Some('.') | Some('-') => out.replace_range(..1, "_"),
            Some(_) => {}
        }

        Self(out)
    }

    pub fn latest() -> Self {
        Self(LATEST_TAG.to_string())
    }

    pub fn is_latest(&self) -> bool {
        self.0 == LATEST_TAG
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
