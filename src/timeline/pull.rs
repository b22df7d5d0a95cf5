//! Pull strategy (fan-in at read time)
//!
//! Publishing writes nothing beyond the author's own recency index, so write
//! cost is O(1) no matter how many followers the author has. Every timeline
//! read performs a k-way merge over the followees' recent posts: fetch up to
//! `limit` posts per followee, sort the candidates by
//! `(posted_at desc, id desc)`, truncate. The read pays
//! O(F * limit * log(F * limit)) for F followees, which is the right trade
//! for accounts with huge audiences that post often ("celebrity problem").

use crate::error::Result;
use crate::graph::SocialGraph;
use crate::post::{Post, PostStore};

use super::TimelineStrategy;

/// Fan-in strategy: timelines are computed fresh on every read
pub struct PullStrategy {
    graph: SocialGraph,
    posts: PostStore,
}

impl PullStrategy {
    pub fn new(graph: SocialGraph, posts: PostStore) -> Self {
        Self { graph, posts }
    }
}

impl TimelineStrategy for PullStrategy {
    fn name(&self) -> &'static str {
        "pull"
    }

    /// Nothing to do: `PostStore::append` already indexed the post under its
    /// author, which is the only structure this strategy reads
    fn deliver(&self, _post: &Post) -> Result<()> {
        Ok(())
    }

    fn home_timeline(&self, user: &str, limit: usize) -> Result<Vec<Post>> {
        let followees = self.graph.followees(user)?;

        // Each followee can contribute at most `limit` entries to the final
        // timeline, so `limit` per author is enough to merge correctly
        let mut candidates = Vec::new();
        for followee in &followees {
            candidates.extend(self.posts.recent_by_author(followee, limit)?);
        }

        candidates.sort_by(|a, b| {
            b.posted_at
                .cmp(&a.posted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        candidates.truncate(limit);

        Ok(candidates)
    }
}
