//! Property-based tests for the repository invariants.

use proptest::prelude::*;
use pubsub::Repository;

// ============================================================================
// Strategy Generators
// ============================================================================

fn handle_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["rich", "paul", "kate", "jack", "joan", "may"]).prop_map(String::from)
}

/// Operations that can be applied to a repository
#[derive(Debug, Clone)]
enum GraphOp {
    Follow(String, String),
    Unfollow(String, String),
    Post(String, String),
}

fn op_strategy() -> impl Strategy<Value = GraphOp> {
    prop_oneof![
        3 => (handle_strategy(), handle_strategy()).prop_map(|(a, b)| GraphOp::Follow(a, b)),
        1 => (handle_strategy(), handle_strategy()).prop_map(|(a, b)| GraphOp::Unfollow(a, b)),
        3 => (handle_strategy(), "[a-z]{1,10}[a-z ]{0,10}( #[a-c]){0,3}").prop_map(|(a, t)| GraphOp::Post(a, t)),
    ]
}

fn apply(repo: &Repository, op: &GraphOp) {
    match op {
        GraphOp::Follow(a, b) => {
            repo.follow(a, b);
        }
        GraphOp::Unfollow(a, b) => {
            repo.unfollow(a, b);
        }
        GraphOp::Post(a, text) => {
            repo.create_post(a, text).unwrap();
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Any interleaving of operations leaves every structure consistent
    #[test]
    fn operations_preserve_consistency(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let repo = Repository::new();
        for op in &ops {
            apply(&repo, op);
        }
        prop_assert!(repo.check_consistency().is_ok());
    }

    /// b is in following(a) exactly when a is in followers(b)
    #[test]
    fn follow_sets_mirror_each_other(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let repo = Repository::new();
        for op in &ops {
            apply(&repo, op);
        }
        for a in ["rich", "paul", "kate", "jack", "joan", "may"] {
            for b in repo.get_following(a) {
                prop_assert!(repo.get_followers(&b).contains(a));
            }
            for b in repo.get_followers(a) {
                prop_assert!(repo.get_following(&b).contains(a));
            }
        }
    }

    /// The feed equals the sorted union of the followed users' posts
    #[test]
    fn feed_matches_sorted_union(
        ops in prop::collection::vec(op_strategy(), 0..60),
        limit in prop::option::of(0usize..10),
    ) {
        let repo = Repository::new();
        for op in &ops {
            apply(&repo, op);
        }
        for user in ["rich", "paul", "kate"] {
            let mut expected: Vec<_> = repo
                .get_following(user)
                .iter()
                .flat_map(|f| repo.posts_by_user(f, None))
                .collect();
            expected.sort_by_key(|p| std::cmp::Reverse(p.sort_key()));
            if let Some(n) = limit {
                expected.truncate(n);
            }
            prop_assert_eq!(repo.feed_for(user, limit), expected);
        }
    }

    /// Per-user history is newest first whatever else was written in between
    #[test]
    fn posts_by_user_never_increase(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let repo = Repository::new();
        for op in &ops {
            apply(&repo, op);
        }
        for user in ["rich", "paul", "kate", "jack", "joan", "may"] {
            let posts = repo.posts_by_user(user, None);
            prop_assert!(posts.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        }
    }

    /// Following twice is the same as following once
    #[test]
    fn follow_is_idempotent(a in handle_strategy(), b in handle_strategy()) {
        let repo = Repository::new();
        repo.follow(&a, &b);
        let once = repo.snapshot();
        repo.follow(&a, &b);
        prop_assert_eq!(repo.snapshot(), once);
    }
}
