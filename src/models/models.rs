use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user handle. All per-user data is keyed by it.
pub type Handle = String;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub handle: Handle,
    pub display_name: String,
    pub email: String,
    pub bio: String,
    pub photo_ref: String,
    pub credential_hash: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    /// Store-assigned insertion sequence; strictly increasing.
    pub seq: u64,
    pub author: Handle,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

// (seconds threshold, divisor, unit)
const AGE_UNITS: [(i64, i64, &str); 4] = [
    (60, 1, "second"),
    (3600, 60, "minute"),
    (3600 * 24, 3600, "hour"),
    (i64::MAX, 3600 * 24, "day"),
];

impl Post {
    /// Total order used by every newest-first view. `seq` breaks ties between
    /// posts stamped within the same clock tick.
    pub fn sort_key(&self) -> (DateTime<Utc>, u64) {
        (self.created_at, self.seq)
    }

    pub fn time_since_posted(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = now - self.created_at;
        Duration::seconds(elapsed.num_seconds().max(0))
    }

    /// Human-readable age, e.g. `"5 minutes ago"`.
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let seconds = self.time_since_posted(now).num_seconds();
        let (_, divisor, unit) = AGE_UNITS
            .iter()
            .copied()
            .find(|(cut, _, _)| seconds < *cut)
            .unwrap_or(AGE_UNITS[AGE_UNITS.len() - 1]);
        let units = seconds / divisor;
        let plural = if units == 1 { "" } else { "s" };
        format!("{} {}{} ago", units, unit, plural)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FollowEdge {
    pub follower: Handle,
    pub followee: Handle,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TokenData {
    pub handle: Handle,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time copy of every data set, taken under a single read lock.
/// Secondary indexes are derived and rebuilt on restore.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub profiles: Vec<Profile>,
    pub posts: Vec<Post>,
    pub follows: Vec<FollowEdge>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepositoryStats {
    pub users: usize,
    pub posts: usize,
    pub tags: usize,
    pub follow_edges: usize,
}
