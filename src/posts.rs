use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::models::Post;

/// Append-only post log plus a per-author view.
///
/// Every per-author list is kept in insertion order, which is also
/// chronological because stamps never go backwards. Newest-first views are
/// reverse iterations; nothing is ever sorted in place.
#[derive(Debug, Default)]
pub struct PostStore {
    log: Vec<Arc<Post>>,
    by_author: HashMap<String, Vec<Arc<Post>>>,
    by_id: HashMap<Uuid, Arc<Post>>,
    next_seq: u64,
    last_created_at: Option<DateTime<Utc>>,
}

impl PostStore {
    /// Stamps and appends a new post. `now` is clamped to the last stamp so
    /// the log stays monotonic even if the wall clock steps back.
    pub fn append(&mut self, author: &str, text: &str, now: DateTime<Utc>) -> Arc<Post> {
        let created_at = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        let post = Arc::new(Post {
            id: Uuid::new_v4(),
            seq: self.next_seq,
            author: author.to_string(),
            text: text.to_string(),
            created_at,
        });
        self.insert(Arc::clone(&post));
        post
    }

    /// Inserts an already-stamped post. Callers restoring from a snapshot
    /// must feed posts in `seq` order.
    pub fn insert(&mut self, post: Arc<Post>) {
        self.next_seq = self.next_seq.max(post.seq.saturating_add(1));
        self.last_created_at = Some(match self.last_created_at {
            Some(last) if last > post.created_at => last,
            _ => post.created_at,
        });
        self.by_id.insert(post.id, Arc::clone(&post));
        self.by_author
            .entry(post.author.clone())
            .or_default()
            .push(Arc::clone(&post));
        self.log.push(post);
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &Uuid) -> Option<&Arc<Post>> {
        self.by_id.get(id)
    }

    /// Author's posts, oldest first. Unknown authors yield an empty slice.
    pub fn by_author(&self, author: &str) -> &[Arc<Post>] {
        self.by_author.get(author).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn newest_first(&self, author: &str, limit: Option<usize>) -> Vec<Post> {
        self.by_author(author)
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .map(|p| Post::clone(p))
            .collect()
    }

    /// Case-sensitive substring scan over the global log, in insertion order.
    pub fn search_text(&self, needle: &str) -> Vec<Post> {
        self.log
            .iter()
            .filter(|p| p.text.contains(needle))
            .map(|p| Post::clone(p))
            .collect()
    }

    pub fn log(&self) -> &[Arc<Post>] {
        &self.log
    }

    pub fn authors(&self) -> impl Iterator<Item = (&String, &Vec<Arc<Post>>)> {
        self.by_author.iter()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn insert_at_max_seq_does_not_overflow() {
        let mut store = PostStore::default();
        store.insert(Arc::new(Post {
            id: Uuid::new_v4(),
            seq: u64::MAX,
            author: "rich".to_string(),
            text: "last".to_string(),
            created_at: at(1),
        }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.by_author("rich")[0].seq, u64::MAX);
    }

    #[test]
    fn newest_first_with_limit() {
        let mut store = PostStore::default();
        store.append("rich", "one", at(1));
        store.append("paul", "other", at(2));
        store.append("rich", "two", at(3));
        store.append("rich", "three", at(4));

        let texts: Vec<String> = store
            .newest_first("rich", None)
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, vec!["three", "two", "one"]);

        let limited = store.newest_first("rich", Some(1));
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].text, "three");

        // storage order untouched by the read
        assert_eq!(store.by_author("rich")[0].text, "one");
    }

    #[test]
    fn clock_step_back_is_clamped() {
        let mut store = PostStore::default();
        let first = store.append("rich", "later", at(10));
        let second = store.append("rich", "earlier", at(10) - Duration::seconds(5));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.sort_key() > first.sort_key());
    }

    #[test]
    fn search_is_case_sensitive_and_in_log_order() {
        let mut store = PostStore::default();
        store.append("rich", "Hello world", at(1));
        store.append("paul", "hello there", at(2));
        store.append("jack", "say hello", at(3));

        let hits: Vec<String> = store
            .search_text("hello")
            .into_iter()
            .map(|p| p.author)
            .collect();
        assert_eq!(hits, vec!["paul", "jack"]);
    }

    #[test]
    fn unknown_author_is_empty() {
        let store = PostStore::default();
        assert!(store.by_author("nobody").is_empty());
        assert!(store.newest_first("nobody", Some(3)).is_empty());
    }
}
