// ABOUTME: Derives the image tags a deploy pushes from the commit and branch.
// ABOUTME: Pure and deterministic: the same inputs always give the same three tags.

use nonempty::NonEmpty;

use crate::types::{CommitRef, ImageRef, ImageTag};

/// Longest branch prefix that still leaves room for `-<short sha>`.
const MAX_BRANCH_PREFIX: usize = 128 - 1 - crate::types::SHORT_SHA_LEN;

/// The three tags one build is pushed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTagSet {
    /// `<repo>:<short sha>`, the commit-addressed tag migrations run against.
    pub sha: ImageRef,
    /// `<repo>:<branch>-<short sha>`.
    pub branch_sha: ImageRef,
    /// `<repo>:latest`.
    pub latest: ImageRef,
}

impl ImageTagSet {
    /// Tags pushed by the build. `latest` is left to promotion so it never
    /// points at an image whose migrations have not run.
    pub fn build_tags(&self) -> NonEmpty<ImageRef> {
        NonEmpty {
            head: self.sha.clone(),
            tail: vec![self.branch_sha.clone()],
        }
    }
}

/// Plan the tags for building `commit` on `branch` into `repository`.
///
/// The branch is coerced into tag characters first, so `feature/login`
/// becomes `feature-login`.
pub fn plan_tags(repository: &ImageRef, commit: &CommitRef, branch: &str) -> ImageTagSet {
    let short = commit.short();
    let branch = ImageTag::sanitize(branch);
    let prefix = &branch.as_str()[..branch.as_str().len().min(MAX_BRANCH_PREFIX)];

    ImageTagSet {
        sha: repository.with_tag(&commit.short_tag()),
        branch_sha: repository.with_tag(&ImageTag::sanitize(&format!("{prefix}-{short}"))),
        latest: repository.with_tag(&ImageTag::latest()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> ImageRef {
        ImageRef::parse_repository("registry.example/recipes").unwrap()
    }

    #[test]
    fn plans_sha_branch_and_latest() {
        let commit = CommitRef::parse("abc123def4567").unwrap();
        let tags = plan_tags(&repo(), &commit, "master");

        assert_eq!(tags.sha.to_string(), "registry.example/recipes:abc123d");
        assert_eq!(
            tags.branch_sha.to_string(),
            "registry.example/recipes:master-abc123d"
        );
        assert_eq!(tags.latest.to_string(), "registry.example/recipes:latest");
    }

    #[test]
    fn branch_is_sanitized() {
        let commit = CommitRef::parse("0123456789").unwrap();
        let tags = plan_tags(&repo(), &commit, "feature/login");
        assert_eq!(tags.branch_sha.tag(), Some("feature-login-0123456"));
    }

    #[test]
    fn long_branch_keeps_sha_suffix() {
        let commit = CommitRef::parse("fedcba9876").unwrap();
        let branch = "b".repeat(300);
        let tags = plan_tags(&repo(), &commit, &branch);

        let tag = tags.branch_sha.tag().unwrap();
        assert_eq!(tag.len(), 128);
        assert!(tag.ends_with("-fedcba9"));
    }

    #[test]
    fn build_tags_exclude_latest() {
        let commit = CommitRef::parse("abc123def4567").unwrap();
        let tags = plan_tags(&repo(), &commit, "master");
        let built: Vec<String> = tags.build_tags().iter().map(ToString::to_string).collect();
        assert_eq!(
            built,
            vec![
                "registry.example/recipes:abc123d",
                "registry.example/recipes:master-abc123d",
            ]
        );
    }
}
