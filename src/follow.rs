use std::collections::{BTreeSet, HashMap};

use crate::models::models::FollowEdge;

/// Directed follow graph stored as two mirrored adjacency maps.
///
/// `b ∈ following[a]` iff `a ∈ followers[b]`. Both maps are only ever touched
/// together, and empty sets are dropped so the maps hold live edges only.
#[derive(Debug, Default)]
pub struct FollowGraph {
    following: HashMap<String, BTreeSet<String>>,
    followers: HashMap<String, BTreeSet<String>>,
}

impl FollowGraph {
    /// Returns true when the edge was newly added.
    pub fn follow(&mut self, follower: &str, followee: &str) -> bool {
        let added = self
            .following
            .entry(follower.to_string())
            .or_default()
            .insert(followee.to_string());
        if added {
            self.followers
                .entry(followee.to_string())
                .or_default()
                .insert(follower.to_string());
        }
        added
    }

    /// Returns true when an edge was removed.
    pub fn unfollow(&mut self, follower: &str, followee: &str) -> bool {
        let removed = remove_edge(&mut self.following, follower, followee);
        if removed {
            remove_edge(&mut self.followers, followee, follower);
        }
        removed
    }

    pub fn is_following(&self, follower: &str, followee: &str) -> bool {
        self.following
            .get(follower)
            .is_some_and(|set| set.contains(followee))
    }

    pub fn following_of(&self, handle: &str) -> impl Iterator<Item = &String> {
        self.following.get(handle).into_iter().flatten()
    }

    pub fn following(&self, handle: &str) -> BTreeSet<String> {
        self.following.get(handle).cloned().unwrap_or_default()
    }

    pub fn followers(&self, handle: &str) -> BTreeSet<String> {
        self.followers.get(handle).cloned().unwrap_or_default()
    }

    /// Every edge, sorted by (follower, followee).
    pub fn edges(&self) -> Vec<FollowEdge> {
        let mut edges: Vec<FollowEdge> = self
            .following
            .iter()
            .flat_map(|(follower, followees)| {
                followees.iter().map(move |followee| FollowEdge {
                    follower: follower.clone(),
                    followee: followee.clone(),
                })
            })
            .collect();
        edges.sort();
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.following.values().map(BTreeSet::len).sum()
    }

    /// Finds the first edge present in one map but not mirrored in the other.
    pub fn asymmetry(&self) -> Option<FollowEdge> {
        for (follower, followees) in &self.following {
            for followee in followees {
                if !self.followers.get(followee).is_some_and(|s| s.contains(follower)) {
                    return Some(FollowEdge {
                        follower: follower.clone(),
                        followee: followee.clone(),
                    });
                }
            }
        }
        for (followee, followers) in &self.followers {
            for follower in followers {
                if !self.is_following(follower, followee) {
                    return Some(FollowEdge {
                        follower: follower.clone(),
                        followee: followee.clone(),
                    });
                }
            }
        }
        None
    }
}

fn remove_edge(map: &mut HashMap<String, BTreeSet<String>>, from: &str, to: &str) -> bool {
    let Some(set) = map.get_mut(from) else {
        return false;
    };
    let removed = set.remove(to);
    if set.is_empty() {
        map.remove(from);
    }
    removed
}
