//! Social Graph Store
//!
//! Directed follower/followee edges over the storage backend. Each edge is
//! written to both the followee's follower set and the follower's followee
//! set, so both strategies get their query answered with a single set read:
//! push fan-out needs "who follows X", pull merge needs "who does X follow".

use std::sync::Arc;

use crate::backend::{followed_key, followers_key, StorageBackend};
use crate::error::{FeedError, Result};
use crate::post::UserId;

/// Follower/followee edge store
#[derive(Clone)]
pub struct SocialGraph {
    backend: Arc<dyn StorageBackend>,
}

impl SocialGraph {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Add a follow edge: `follower` starts following `followee`
    ///
    /// Rejects self-follows. Idempotent: the edge lives in true sets, so
    /// adding it twice (including two concurrent calls for the same edge)
    /// never double-counts.
    pub fn follow(&self, follower: &UserId, followee: &UserId) -> Result<()> {
        if follower == followee {
            return Err(FeedError::Validation(format!(
                "user {} cannot follow themselves",
                follower
            )));
        }

        self.backend.set_add(&followers_key(followee), follower)?;
        self.backend.set_add(&followed_key(follower), followee)?;

        tracing::debug!("Follow edge added: {} -> {}", follower, followee);
        Ok(())
    }

    /// All users who follow `user`; empty for an unknown user
    pub fn followers(&self, user: &str) -> Result<Vec<UserId>> {
        self.backend.set_members(&followers_key(user))
    }

    /// All users `user` follows; empty for an unknown user
    pub fn followees(&self, user: &str) -> Result<Vec<UserId>> {
        self.backend.set_members(&followed_key(user))
    }

    /// Whether `follower` currently follows `followee`
    pub fn is_following(&self, follower: &str, followee: &str) -> Result<bool> {
        self.backend.set_contains(&followers_key(followee), follower)
    }
}
