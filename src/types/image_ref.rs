// ABOUTME: Container image reference parsing and validation.
// ABOUTME: Handles formats like app, registry/app, registry:5000/org/app:tag@digest.

use std::fmt;
use thiserror::Error;

use super::tag::ImageTag;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),

    #[error("expected an image repository without tag or digest: {0}")]
    NotARepository(String),
}

/// An image reference. Unlike a `docker pull` argument, a missing tag is not
/// defaulted to `latest`: a bare reference names the repository itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    registry: Option<String>,
    name: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        for c in input.chars() {
            if !c.is_ascii_alphanumeric()
                && c != '/'
                && c != ':'
                && c != '.'
                && c != '-'
                && c != '_'
                && c != '@'
            {
                return Err(ParseImageRefError::InvalidChar(c));
            }
        }

        let (without_digest, digest) = match input.split_once('@') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        // A colon followed by a slash belongs to a registry port, not a tag.
        let (without_tag, tag) = match without_digest.rsplit_once(':') {
            Some((before, after)) if !after.contains('/') => (before, Some(after.to_string())),
            _ => (without_digest, None),
        };

        if let Some(tag) = &tag {
            ImageTag::new(tag)
                .map_err(|e| ParseImageRefError::InvalidFormat(format!("{input}: {e}")))?;
        }

        let (registry, name) = Self::parse_registry_and_name(without_tag)?;

        Ok(Self {
            registry,
            name,
            tag,
            digest,
        })
    }

    /// Parse a reference that must name a repository (no tag, no digest).
    pub fn parse_repository(input: &str) -> Result<Self, ParseImageRefError> {
        let image = Self::parse(input)?;
        if image.tag.is_some() || image.digest.is_some() {
            return Err(ParseImageRefError::NotARepository(input.trim().to_string()));
        }
        Ok(image)
    }

    fn parse_registry_and_name(
        input: &str,
    ) -> Result<(Option<String>, String), ParseImageRefError> {
        if input.is_empty() || input.starts_with('/') || input.ends_with('/') {
            return Err(ParseImageRefError::InvalidFormat(input.to_string()));
        }

        // A registry is present if the first component contains a dot or colon,
        // or is "localhost"
        let parts: Vec<&str> = input.splitn(2, '/').collect();

        match parts.as_slice() {
            [name] => Ok((None, (*name).to_string())),
            [first, rest] => {
                if first.contains('.') || first.contains(':') || *first == "localhost" {
                    Ok((Some((*first).to_string()), (*rest).to_string()))
                } else {
                    Ok((None, input.to_string()))
                }
            }
            _ => Err(ParseImageRefError::InvalidFormat(input.to_string())),
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The repository part (`registry/name`), without tag or digest.
    pub fn repository(&self) -> ImageRef {
        ImageRef {
            registry: self.registry.clone(),
            name: self.name.clone(),
            tag: None,
            digest: None,
        }
    }

    /// Same repository, addressed by `tag`.
    pub fn with_tag(&self, tag: &ImageTag) -> ImageRef {
        ImageRef {
            registry: self.registry.clone(),
            name: self.name.clone(),
            tag: Some(tag.as_str().to_string()),
            digest: None,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(ref digest) = self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}
