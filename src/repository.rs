//! The post/social-graph repository.
//!
//! One owned aggregate holds profiles, the post log, the hashtag index and
//! the follow graph behind a single `RwLock`. Every mutation takes the write
//! lock for its whole duration and every multi-structure read takes the read
//! lock once, so a reader never sees a post without its index entries or a
//! follow edge without its mirror.
//!
//! Nothing inside the lock blocks: password hashing runs before the write
//! lock is taken and verification runs after the read lock is released.

use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RepositoryConfig;
use crate::core::errors::{StoreError, StoreResult};
use crate::core::helpers::{hash_password, normalize_handle, now, verify_against_dummy, verify_password};
use crate::feed::merge_newest_first;
use crate::follow::FollowGraph;
use crate::hashtags::{extract_tags, is_tag, HashtagIndex};
use crate::models::models::{Post, Profile, RepositorySnapshot, RepositoryStats};
use crate::posts::PostStore;
use crate::users::{validate_registration, ProfileStore};

#[derive(Debug, Default)]
struct State {
    profiles: ProfileStore,
    posts: PostStore,
    tags: HashtagIndex,
    graph: FollowGraph,
}

#[derive(Debug, Default)]
pub struct Repository {
    config: RepositoryConfig,
    state: RwLock<State>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RepositoryConfig) -> Self {
        Self {
            config,
            state: RwLock::new(State::default()),
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn normalize<'a>(&self, handle: &'a str) -> Cow<'a, str> {
        normalize_handle(handle, self.config.case_fold_handles)
    }

    // === Identity & credentials ===

    /// Registers a new user. A handle that is already taken is rejected with
    /// `AlreadyExists`; existing profiles are never overwritten.
    pub fn register(
        &self,
        handle: &str,
        email: &str,
        bio: &str,
        photo_ref: &str,
        raw_password: &str,
    ) -> StoreResult<Profile> {
        let handle = self.normalize(handle).into_owned();
        validate_registration(&handle, bio, raw_password)?;

        // Cheap early rejection; the authoritative check happens under the write lock.
        if self.state.read().profiles.contains(&handle) {
            warn!(handle = %handle, "rejected duplicate registration");
            return Err(StoreError::AlreadyExists(format!(
                "Handle {} is already registered",
                handle
            )));
        }

        let profile = Profile {
            display_name: handle.clone(),
            handle,
            email: email.trim().to_string(),
            bio: bio.to_string(),
            photo_ref: photo_ref.to_string(),
            credential_hash: hash_password(raw_password)?,
        };

        let mut state = self.state.write();
        let stored = match state.profiles.insert(profile) {
            Ok(stored) => stored.clone(),
            Err(err) => {
                warn!(error = %err, "rejected duplicate registration");
                return Err(err);
            }
        };
        info!(handle = %stored.handle, "registered user");
        Ok(stored)
    }

    /// False for a wrong password and for an unknown handle alike. Unknown
    /// handles still pay for one hash verification.
    pub fn verify_credential(&self, handle: &str, raw_password: &str) -> bool {
        let handle = self.normalize(handle);
        let stored = self.state.read().profiles.credential_hash(&handle);
        match stored {
            Some(hash) => verify_password(raw_password, &hash),
            None => verify_against_dummy(raw_password),
        }
    }

    pub fn get_profile(&self, handle: &str) -> StoreResult<Profile> {
        let handle = self.normalize(handle);
        self.state
            .read()
            .profiles
            .get(&handle)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {} not found", handle)))
    }

    pub fn is_registered(&self, handle: &str) -> bool {
        let handle = self.normalize(handle);
        self.state.read().profiles.contains(&handle)
    }

    // === Posts ===

    /// Stamps, stores and indexes a post in one critical section.
    pub fn create_post(&self, author: &str, text: &str) -> StoreResult<Post> {
        let author = self.normalize(author);
        if author.is_empty() {
            return Err(StoreError::InvalidInput("Author handle is required".to_string()));
        }
        if text.trim().is_empty() {
            return Err(StoreError::InvalidInput("Post text is required".to_string()));
        }
        if text.chars().count() > self.config.max_post_length {
            return Err(StoreError::InvalidInput(format!(
                "Post text exceeds {} characters",
                self.config.max_post_length
            )));
        }

        let mut state = self.state.write();
        if let Some(max) = self.config.max_posts {
            if state.posts.len() >= max {
                return Err(StoreError::CapacityExceeded(format!(
                    "Post store is full ({} posts)",
                    max
                )));
            }
        }
        let post = state.posts.append(&author, text, now());
        state.tags.index_post(&post);
        debug!(author = %post.author, id = %post.id, seq = post.seq, "created post");
        Ok(Post::clone(&post))
    }

    pub fn get_post(&self, id: &Uuid) -> StoreResult<Post> {
        self.state
            .read()
            .posts
            .get(id)
            .map(|p| Post::clone(p))
            .ok_or_else(|| StoreError::NotFound(format!("Post {} not found", id)))
    }

    /// The author's posts, newest first, at most `limit` of them.
    pub fn posts_by_user(&self, handle: &str, limit: Option<usize>) -> Vec<Post> {
        let handle = self.normalize(handle);
        self.state.read().posts.newest_first(&handle, limit)
    }

    /// Posts containing `needle` (case-sensitive), in global insertion order,
    /// i.e. oldest first, unlike the newest-first per-user and feed views.
    pub fn search_text(&self, needle: &str) -> Vec<Post> {
        self.state.read().posts.search_text(needle)
    }

    // === Hashtags ===

    /// Posts carrying `tag`, in creation order.
    pub fn search_by_tag(&self, tag: &str) -> Vec<Post> {
        self.state.read().tags.search(tag)
    }

    pub fn list_tags(&self) -> Vec<String> {
        self.state.read().tags.tags()
    }

    // === Follow graph ===

    /// Adds the edge `follower -> followee`. Returns whether the graph changed;
    /// repeats and disallowed self-follows are no-ops.
    pub fn follow(&self, follower: &str, followee: &str) -> bool {
        let follower = self.normalize(follower);
        let followee = self.normalize(followee);
        if follower.is_empty() || followee.is_empty() {
            return false;
        }
        if follower == followee && !self.config.allow_self_follow {
            debug!(handle = %follower, "ignored self-follow");
            return false;
        }
        let added = self.state.write().graph.follow(&follower, &followee);
        if added {
            debug!(follower = %follower, followee = %followee, "follow");
        }
        added
    }

    /// Removes the edge if present. Returns whether the graph changed.
    pub fn unfollow(&self, follower: &str, followee: &str) -> bool {
        let follower = self.normalize(follower);
        let followee = self.normalize(followee);
        let removed = self.state.write().graph.unfollow(&follower, &followee);
        if removed {
            debug!(follower = %follower, followee = %followee, "unfollow");
        }
        removed
    }

    pub fn get_followers(&self, handle: &str) -> BTreeSet<String> {
        let handle = self.normalize(handle);
        self.state.read().graph.followers(&handle)
    }

    pub fn get_following(&self, handle: &str) -> BTreeSet<String> {
        let handle = self.normalize(handle);
        self.state.read().graph.following(&handle)
    }

    pub fn is_following(&self, follower: &str, followee: &str) -> bool {
        let follower = self.normalize(follower);
        let followee = self.normalize(followee);
        self.state.read().graph.is_following(&follower, &followee)
    }

    // === Queries ===

    /// Newest-first merge of the posts of everyone `handle` follows.
    pub fn feed_for(&self, handle: &str, limit: Option<usize>) -> Vec<Post> {
        let handle = self.normalize(handle);
        let state = self.state.read();
        let sources = state
            .graph
            .following_of(&handle)
            .map(|followee| state.posts.by_author(followee));
        merge_newest_first(sources, limit)
    }

    /// A query that is exactly one `#tag` or `@mention` goes to the hashtag
    /// index; anything else is a substring search.
    pub fn search_by_query(&self, query: &str) -> Vec<Post> {
        let state = self.state.read();
        if is_tag(query) {
            state.tags.search(query)
        } else {
            state.posts.search_text(query)
        }
    }

    // === Whole-repository operations ===

    pub fn stats(&self) -> RepositoryStats {
        let state = self.state.read();
        RepositoryStats {
            users: state.profiles.len(),
            posts: state.posts.len(),
            tags: state.tags.len(),
            follow_edges: state.graph.edge_count(),
        }
    }

    /// Copies every data set under one read lock.
    pub fn snapshot(&self) -> RepositorySnapshot {
        let state = self.state.read();
        RepositorySnapshot {
            profiles: state.profiles.all(),
            posts: state.posts.log().iter().map(|p| Post::clone(p)).collect(),
            follows: state.graph.edges(),
        }
    }

    /// Rebuilds a repository, including every derived index, from a snapshot.
    pub fn from_snapshot(config: RepositoryConfig, snapshot: RepositorySnapshot) -> StoreResult<Self> {
        let mut state = State::default();
        for profile in snapshot.profiles {
            state.profiles.insert(profile)?;
        }

        let mut posts = snapshot.posts;
        posts.sort_by_key(Post::sort_key);
        for post in posts {
            // the next post would need seq + 1
            if post.seq == u64::MAX {
                return Err(StoreError::InvalidInput(format!(
                    "Post {} has an out-of-range sequence number",
                    post.id
                )));
            }
            if state.posts.contains(&post.id) {
                return Err(StoreError::AlreadyExists(format!("Post {} appears twice", post.id)));
            }
            let post = Arc::new(post);
            state.tags.index_post(&post);
            state.posts.insert(post);
        }

        // Edges go through the same handle policy as `follow`.
        for edge in snapshot.follows {
            let follower = normalize_handle(&edge.follower, config.case_fold_handles);
            let followee = normalize_handle(&edge.followee, config.case_fold_handles);
            if follower.is_empty() || followee.is_empty() {
                continue;
            }
            if follower == followee && !config.allow_self_follow {
                warn!(handle = %follower, "dropped self-follow from snapshot");
                continue;
            }
            state.graph.follow(&follower, &followee);
        }

        info!(
            users = state.profiles.len(),
            posts = state.posts.len(),
            edges = state.graph.edge_count(),
            "restored repository from snapshot"
        );
        Ok(Self {
            config,
            state: RwLock::new(state),
        })
    }

    /// Drops every profile, post, index entry and follow edge.
    pub fn clear(&self) {
        *self.state.write() = State::default();
    }

    /// Walks every structure and reports the first broken cross-structure invariant.
    pub fn check_consistency(&self) -> StoreResult<()> {
        let state = self.state.read();
        let broken = |msg: String| Err(StoreError::InvalidInput(msg));

        if let Some(edge) = state.graph.asymmetry() {
            return broken(format!(
                "follow edge {} -> {} is not mirrored",
                edge.follower, edge.followee
            ));
        }

        let mut listed = 0;
        for (author, posts) in state.posts.authors() {
            listed += posts.len();
            if let Some(p) = posts.iter().find(|p| &p.author != author) {
                return broken(format!("post {} listed under {} but written by {}", p.id, author, p.author));
            }
            if posts.windows(2).any(|w| w[0].sort_key() >= w[1].sort_key()) {
                return broken(format!("posts of {} are not in chronological order", author));
            }
        }
        if listed != state.posts.len() {
            return broken(format!(
                "per-user lists hold {} posts but the log holds {}",
                listed,
                state.posts.len()
            ));
        }

        for (tag, posts) in state.tags.entries() {
            let mut seen = HashSet::new();
            for p in posts {
                if !seen.insert(p.id) {
                    return broken(format!("post {} indexed twice under {}", p.id, tag));
                }
                if !state.posts.contains(&p.id) {
                    return broken(format!("tag {} references unknown post {}", tag, p.id));
                }
                if !extract_tags(&p.text).contains(tag) {
                    return broken(format!("post {} indexed under {} it does not contain", p.id, tag));
                }
            }
        }
        for p in state.posts.log() {
            for tag in extract_tags(&p.text) {
                if !state.tags.posts_for(&tag).iter().any(|q| q.id == p.id) {
                    return broken(format!("post {} missing from index {}", p.id, tag));
                }
            }
        }

        Ok(())
    }
}
