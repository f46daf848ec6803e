//! Feed assembly.
//!
//! Every author's posts are stored oldest first, so walking each list in
//! reverse gives a newest-first stream. [`FeedMerge`] interleaves those
//! streams through a max-heap keyed on [`Post::sort_key`], producing one
//! newest-first sequence. It is an iterator, so `take(n)` stops after `n`
//! heap pops without touching the rest of any list.

use std::cmp::Ordering;
use std::collections::binary_heap::PeekMut;
use std::collections::BinaryHeap;
use std::iter::Rev;
use std::slice::Iter;
use std::sync::Arc;

use crate::models::models::Post;

/// Head of one author's newest-first stream.
struct Cursor<'a> {
    head: &'a Arc<Post>,
    rest: Rev<Iter<'a, Arc<Post>>>,
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.head.sort_key() == other.head.sort_key()
    }
}

impl Eq for Cursor<'_> {}

impl PartialOrd for Cursor<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor<'_> {
    // Max-heap: the newest head sits on top.
    fn cmp(&self, other: &Self) -> Ordering {
        self.head.sort_key().cmp(&other.head.sort_key())
    }
}

pub struct FeedMerge<'a> {
    heap: BinaryHeap<Cursor<'a>>,
}

impl<'a> FeedMerge<'a> {
    /// `sources` are per-author lists in oldest-first order.
    pub fn new<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = &'a [Arc<Post>]>,
    {
        let heap = sources
            .into_iter()
            .filter_map(|posts| {
                let mut rest = posts.iter().rev();
                rest.next().map(|head| Cursor { head, rest })
            })
            .collect();
        Self { heap }
    }
}

impl<'a> Iterator for FeedMerge<'a> {
    type Item = &'a Arc<Post>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut top = self.heap.peek_mut()?;
        let emitted = top.head;
        let next = top.rest.next();
        match next {
            // replace in place; PeekMut re-sifts on drop
            Some(next) => top.head = next,
            None => {
                PeekMut::pop(top);
            }
        }
        Some(emitted)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: usize = self.heap.iter().map(|c| 1 + c.rest.len()).sum();
        (remaining, Some(remaining))
    }
}

/// Newest-first merge of `sources`, truncated to `limit` when given.
pub fn merge_newest_first<'a, I>(sources: I, limit: Option<usize>) -> Vec<Post>
where
    I: IntoIterator<Item = &'a [Arc<Post>]>,
{
    FeedMerge::new(sources)
        .take(limit.unwrap_or(usize::MAX))
        .map(|p| Post::clone(p))
        .collect()
}
