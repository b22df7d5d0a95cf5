//! Post Store
//!
//! Immutable post records plus the per-author recency index that the pull
//! strategy merges at read time. Records are bincode-encoded and stored under
//! `post:{id}`; the author index is a sorted set of post ids scored by
//! `posted_at`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{author_posts_key, post_key, StorageBackend, NEXT_POST_ID_KEY};
use crate::error::{FeedError, Result};

/// Opaque user identifier; users have no entity record beyond their id
pub type UserId = String;

/// Monotonically increasing post identifier, assigned once, never reused
pub type PostId = u64;

/// Maximum post length, counted in UTF-16 code units (the classic client
/// limit; `char` count would admit longer texts for non-BMP content)
pub const MAX_MESSAGE_UNITS: usize = 139;

/// An immutable post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: UserId,
    /// Milliseconds since the Unix epoch
    pub posted_at: i64,
    pub text: String,
}

impl Post {
    /// Construct a post, enforcing the message length bound
    pub fn new(id: PostId, author: UserId, posted_at: i64, text: String) -> Result<Self> {
        let units = text.encode_utf16().count();
        if units > MAX_MESSAGE_UNITS {
            return Err(FeedError::Validation(format!(
                "message is {} units long, max is {}",
                units, MAX_MESSAGE_UNITS
            )));
        }
        Ok(Self {
            id,
            author,
            posted_at,
            text,
        })
    }
}

/// Persistent store of posts and per-author recency indexes
#[derive(Clone)]
pub struct PostStore {
    backend: Arc<dyn StorageBackend>,
}

impl PostStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Next usable post id
    ///
    /// Backed by the storage backend's atomic counter, so ids stay distinct
    /// across arbitrary concurrent callers and across service instances.
    /// Gaps are possible when a caller fails after claiming an id;
    /// duplicates are not.
    pub fn next_id(&self) -> Result<PostId> {
        self.backend.counter_next(NEXT_POST_ID_KEY)
    }

    /// Persist a post and index it under its author
    ///
    /// Idempotent: re-appending the same post overwrites the record with
    /// identical bytes and the index upsert is keyed by post id.
    pub fn append(&self, post: &Post) -> Result<()> {
        let encoded = bincode::serialize(post)
            .map_err(|e| FeedError::Serialization(format!("encoding post {}: {}", post.id, e)))?;
        self.backend.kv_set(&post_key(post.id), &encoded)?;
        self.backend
            .zset_add(&author_posts_key(&post.author), post.id, post.posted_at)?;

        tracing::debug!("Post {} by {} appended", post.id, post.author);
        Ok(())
    }

    /// Fetch a post by id
    pub fn get(&self, id: PostId) -> Result<Post> {
        let bytes = self
            .backend
            .kv_get(&post_key(id))?
            .ok_or(FeedError::NotFound(id))?;
        bincode::deserialize(&bytes)
            .map_err(|e| FeedError::Serialization(format!("decoding post {}: {}", id, e)))
    }

    /// Hydrate a list of post ids, preserving order
    pub fn get_many(&self, ids: &[PostId]) -> Result<Vec<Post>> {
        ids.iter().map(|&id| self.get(id)).collect()
    }

    /// Up to `limit` most recent posts by `author`, most-recent-first
    pub fn recent_by_author(&self, author: &str, limit: usize) -> Result<Vec<Post>> {
        let ids = self
            .backend
            .zset_rev_range(&author_posts_key(author), limit)?;
        self.get_many(&ids)
    }
}
