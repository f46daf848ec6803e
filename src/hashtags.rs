use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use crate::models::models::Post;

fn hashtag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[#@]\w+").expect("Regex should compile"))
}

fn whole_tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[#@]\w+$").expect("Regex should compile"))
}

/// Distinct `#tag` / `@mention` tokens in `text`.
pub fn extract_tags(text: &str) -> BTreeSet<String> {
    hashtag_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// True when the whole query is a single token such as `#cat` or `@rich`.
pub fn is_tag(query: &str) -> bool {
    whole_tag_regex().is_match(query)
}

/// Token → posts containing it, in creation order. Keys stay sorted.
#[derive(Debug, Default)]
pub struct HashtagIndex {
    index: BTreeMap<String, Vec<Arc<Post>>>,
}

impl HashtagIndex {
    /// Indexes `post` once under each distinct token it contains.
    pub fn index_post(&mut self, post: &Arc<Post>) {
        for tag in extract_tags(&post.text) {
            self.index.entry(tag).or_default().push(Arc::clone(post));
        }
    }

    pub fn search(&self, tag: &str) -> Vec<Post> {
        self.posts_for(tag).iter().map(|p| Post::clone(p)).collect()
    }

    pub fn posts_for(&self, tag: &str) -> &[Arc<Post>] {
        self.index.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tags(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Vec<Arc<Post>>)> {
        self.index.iter()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
