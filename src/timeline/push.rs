//! Push strategy (fan-out at write time)
//!
//! Publishing broadcasts the new post's id into every follower's precomputed
//! `hometl:{user}` sorted set, scored by `posted_at`. Reads are then a single
//! bounded reverse range over that set: O(limit), independent of how many
//! users the reader follows. The cost moves to the write side, which pays
//! O(followers) per post.
//!
//! ## Idempotency
//!
//! The sorted-set member is the PostId itself, so redelivering a post to a
//! follower relocates the existing entry instead of appending a duplicate.
//! That makes the whole broadcast safe to retry after a partial failure:
//! re-running `deliver` converges to exactly one entry per follower.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::{home_timeline_key, StorageBackend};
use crate::error::Result;
use crate::graph::SocialGraph;
use crate::post::{Post, PostStore};

use super::fanout::broadcast;
use super::TimelineStrategy;

/// Fan-out strategy: timelines are precomputed at publish time
pub struct PushStrategy {
    backend: Arc<dyn StorageBackend>,
    graph: SocialGraph,
    posts: PostStore,

    /// Max concurrent per-follower upserts during one broadcast
    fanout_concurrency: usize,
    /// Retained timeline length, if bounded
    timeline_cap: Option<usize>,
    /// Wall-clock budget for one broadcast, if bounded
    publish_deadline: Option<Duration>,
}

impl PushStrategy {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        graph: SocialGraph,
        posts: PostStore,
        fanout_concurrency: usize,
        timeline_cap: Option<usize>,
        publish_deadline: Option<Duration>,
    ) -> Self {
        Self {
            backend,
            graph,
            posts,
            fanout_concurrency,
            timeline_cap,
            publish_deadline,
        }
    }

    /// Upsert one post into one follower's timeline, then apply the
    /// retention bound. Both halves are idempotent.
    fn deliver_to(&self, follower: &str, post: &Post) -> Result<()> {
        let key = home_timeline_key(follower);
        self.backend.zset_add(&key, post.id, post.posted_at)?;
        if let Some(cap) = self.timeline_cap {
            self.backend.zset_trim_to(&key, cap)?;
        }
        Ok(())
    }
}

impl TimelineStrategy for PushStrategy {
    fn name(&self) -> &'static str {
        "push"
    }

    fn deliver(&self, post: &Post) -> Result<()> {
        let followers = self.graph.followers(&post.author)?;
        if followers.is_empty() {
            return Ok(());
        }

        let deadline = self.publish_deadline.map(|budget| Instant::now() + budget);
        broadcast(&followers, self.fanout_concurrency, deadline, |follower| {
            self.deliver_to(follower, post)
        })?;

        tracing::debug!(
            "Post {} fanned out to {} followers of {}",
            post.id,
            followers.len(),
            post.author
        );
        Ok(())
    }

    fn home_timeline(&self, user: &str, limit: usize) -> Result<Vec<Post>> {
        let ids = self
            .backend
            .zset_rev_range(&home_timeline_key(user), limit)?;
        self.posts.get_many(&ids)
    }
}
