//! Storage Backend
//!
//! The engine talks to storage through the [`StorageBackend`] trait: a small
//! set of key-value, set, sorted-set, and counter primitives. Every method
//! returns a `Result` because the intended production backend is a shared
//! remote store and each call is a network round-trip that can fail with
//! `FeedError::Backend`.
//!
//! ## Key Schema
//!
//! ```text
//! next_post_id        counter    monotonic post id source
//! post:{id}           kv         serialized Post record
//! posts:{user}        zset       user's own post ids, scored by posted_at
//! followers:{user}    set        users following {user}
//! followed:{user}     set        users {user} follows
//! hometl:{user}       zset       precomputed home timeline (push strategy)
//! ```

mod memory;

pub use memory::MemoryBackend;

use crate::error::Result;

/// Storage primitives consumed by the feed engine
///
/// Sorted sets hold `u64` members (post ids) ordered by `(score, member)`;
/// an upsert of an existing member replaces its score instead of duplicating
/// it, which is what makes push-strategy redelivery idempotent.
pub trait StorageBackend: Send + Sync {
    // -------------------------------------------------------------------------
    // Key-Value
    // -------------------------------------------------------------------------

    /// Get the value stored under `key`, or `None` if absent
    fn kv_get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set the value stored under `key`, replacing any previous value
    fn kv_set(&self, key: &str, value: &[u8]) -> Result<()>;

    // -------------------------------------------------------------------------
    // Sets
    // -------------------------------------------------------------------------

    /// Add `member` to the set at `key`; returns true when newly added
    fn set_add(&self, key: &str, member: &str) -> Result<bool>;

    /// All members of the set at `key`; empty for an unknown key
    fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// Membership test against the set at `key`
    fn set_contains(&self, key: &str, member: &str) -> Result<bool>;

    // -------------------------------------------------------------------------
    // Sorted Sets
    // -------------------------------------------------------------------------

    /// Upsert `member` with `score` into the sorted set at `key`
    ///
    /// Keyed by member: re-adding an existing member moves it to the new
    /// score. Returns true when the member was newly added.
    fn zset_add(&self, key: &str, member: u64, score: i64) -> Result<bool>;

    /// Up to `count` members by descending `(score, member)` order
    fn zset_rev_range(&self, key: &str, count: usize) -> Result<Vec<u64>>;

    /// Number of members in the sorted set at `key`
    fn zset_len(&self, key: &str) -> Result<usize>;

    /// Drop lowest-ranked members until the set holds at most `max_len`
    fn zset_trim_to(&self, key: &str, max_len: usize) -> Result<()>;

    // -------------------------------------------------------------------------
    // Counters
    // -------------------------------------------------------------------------

    /// Atomically increment the counter at `key` and return the new value.
    /// The first call returns 1.
    fn counter_next(&self, key: &str) -> Result<u64>;

    // -------------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------------

    /// Wipe all stored state. Exclusive maintenance operation: must not run
    /// while publishers are active.
    fn clear(&self) -> Result<()>;
}

// =============================================================================
// Key Construction Helpers
// =============================================================================

/// Key of a serialized post record
pub fn post_key(id: u64) -> String {
    format!("post:{}", id)
}

/// Key of a user's own-posts index
pub fn author_posts_key(user: &str) -> String {
    format!("posts:{}", user)
}

/// Key of a user's follower set
pub fn followers_key(user: &str) -> String {
    format!("followers:{}", user)
}

/// Key of a user's followee set
pub fn followed_key(user: &str) -> String {
    format!("followed:{}", user)
}

/// Key of a user's precomputed home timeline
pub fn home_timeline_key(user: &str) -> String {
    format!("hometl:{}", user)
}

/// Key of the post id counter
pub const NEXT_POST_ID_KEY: &str = "next_post_id";
