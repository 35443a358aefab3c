// ABOUTME: Property tests for image tag planning.
// ABOUTME: Every planned tag is valid and addresses the commit's short SHA.

use hl::deploy::plan_tags;
use hl::types::{CommitRef, ImageRef, ImageTag};
use proptest::prelude::*;

fn repo() -> ImageRef {
    ImageRef::parse_repository("registry.example/recipes").unwrap()
}

proptest! {
    #[test]
    fn planned_tags_are_valid_and_carry_the_short_sha(
        sha in "[0-9a-f]{7,40}",
        branch in "[a-zA-Z0-9/._-]{0,200}",
    ) {
        let commit = CommitRef::parse(&sha).unwrap();
        let tags = plan_tags(&repo(), &commit, &branch);

        let sha_tag = tags.sha.tag().unwrap();
        let branch_tag = tags.branch_sha.tag().unwrap();

        prop_assert_eq!(sha_tag, &sha[..7]);
        prop_assert!(ImageTag::new(branch_tag).is_ok());
        let suffix = format!("-{}", &sha[..7]);
        prop_assert!(branch_tag.ends_with(&suffix));
        prop_assert_eq!(tags.latest.tag(), Some("latest"));
    }

    #[test]
    fn planning_is_deterministic(sha in "[0-9a-f]{7,40}", branch in "\\PC{0,40}") {
        let commit = CommitRef::parse(&sha).unwrap();
        prop_assert_eq!(
            plan_tags(&repo(), &commit, &branch),
            plan_tags(&repo(), &commit, &branch)
        );
    }

    #[test]
    fn build_never_pushes_latest(sha in "[0-9a-f]{7,40}", branch in "[a-z/]{1,20}") {
        let commit = CommitRef::parse(&sha).unwrap();
        let tags = plan_tags(&repo(), &commit, &branch);
        prop_assert!(tags.build_tags().iter().all(|image| image.tag() != Some("latest")));
    }
}
