//! Timeline Engine
//!
//! Home timelines under two interchangeable fan-out strategies with opposite
//! cost profiles, behind one interface:
//!
//! - **Pull** (fan-in): publish is O(1), reads merge every followee's recent
//!   posts. See [`PullStrategy`].
//! - **Push** (fan-out): publish broadcasts to every follower's precomputed
//!   timeline, reads are a single bounded range. See [`PushStrategy`].
//!
//! A deployment picks exactly one via [`Config::strategy`]; the strategies
//! are never mixed within one timeline, and the call sites never change.

mod fanout;
mod pull;
mod push;

pub use fanout::broadcast;
pub use pull::PullStrategy;
pub use push::PushStrategy;

use std::sync::Arc;

use crate::backend::StorageBackend;
use crate::config::{Config, Strategy};
use crate::error::{FeedError, Result};
use crate::graph::SocialGraph;
use crate::post::{Post, PostId, PostStore, UserId};

/// Capability interface satisfied by both fan-out strategies
///
/// `deliver` runs after the post is persisted and does the strategy-specific
/// write work; `home_timeline` answers reads. Implementations must keep
/// `deliver` idempotent so a publish interrupted mid-broadcast can be
/// re-run end-to-end.
pub trait TimelineStrategy: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Strategy-specific write work for an already-persisted post
    fn deliver(&self, post: &Post) -> Result<()>;

    /// Up to `limit` posts for `user`, ordered by `(posted_at desc, id desc)`
    fn home_timeline(&self, user: &str, limit: usize) -> Result<Vec<Post>>;
}

/// The feed engine: social graph + post store + one timeline strategy
///
/// All state lives in the shared storage backend; the engine itself is
/// cheap to share behind an `Arc` across concurrent publishers and readers.
pub struct FeedEngine {
    config: Config,
    backend: Arc<dyn StorageBackend>,
    graph: SocialGraph,
    posts: PostStore,
    strategy: Box<dyn TimelineStrategy>,
}

impl FeedEngine {
    /// Build an engine over `backend` with the strategy named in `config`
    pub fn new(config: Config, backend: Arc<dyn StorageBackend>) -> Result<Self> {
        config.validate()?;

        let graph = SocialGraph::new(backend.clone());
        let posts = PostStore::new(backend.clone());

        let strategy: Box<dyn TimelineStrategy> = match config.strategy {
            Strategy::Pull => Box::new(PullStrategy::new(graph.clone(), posts.clone())),
            Strategy::Push => Box::new(PushStrategy::new(
                backend.clone(),
                graph.clone(),
                posts.clone(),
                config.fanout_concurrency,
                config.timeline_cap,
                config.publish_deadline,
            )),
        };

        tracing::info!("Feed engine initialized with {} strategy", strategy.name());

        Ok(Self {
            config,
            backend,
            graph,
            posts,
            strategy,
        })
    }

    // =========================================================================
    // Social Graph
    // =========================================================================

    /// Add a follow edge; `Validation` error on self-follow, idempotent
    /// otherwise
    pub fn follow(&self, follower: &UserId, followee: &UserId) -> Result<()> {
        self.graph.follow(follower, followee)
    }

    /// All users who follow `user`
    pub fn followers(&self, user: &str) -> Result<Vec<UserId>> {
        self.graph.followers(user)
    }

    /// All users `user` follows
    pub fn followees(&self, user: &str) -> Result<Vec<UserId>> {
        self.graph.followees(user)
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    /// Validate a new post and assign it the next id
    ///
    /// Split from [`publish`](Self::publish) so a caller retrying a failed
    /// publish can re-submit the same post (same id) instead of minting a
    /// fresh one.
    pub fn compose(&self, author: &str, posted_at: i64, text: &str) -> Result<Post> {
        let id = self.posts.next_id()?;
        Post::new(id, author.to_string(), posted_at, text.to_string())
    }

    /// Persist a composed post and deliver it under the active strategy
    ///
    /// Safe to re-run end-to-end: the record write is an upsert and strategy
    /// delivery is idempotent by post id.
    pub fn publish(&self, post: &Post) -> Result<PostId> {
        self.posts.append(post)?;
        self.strategy.deliver(post)?;
        Ok(post.id)
    }

    /// Compose-and-publish convenience
    pub fn post(&self, author: &str, posted_at: i64, text: &str) -> Result<PostId> {
        let post = self.compose(author, posted_at, text)?;
        self.publish(&post)
    }

    /// Fetch a post by id
    pub fn get_post(&self, id: PostId) -> Result<Post> {
        self.posts.get(id)
    }

    // =========================================================================
    // Timeline Reads
    // =========================================================================

    /// Up to `limit` home-timeline posts for `user`, newest first
    ///
    /// `limit` must be positive; a possibly-empty vec is returned for users
    /// with nothing to show, never an error.
    pub fn home_timeline(&self, user: &str, limit: usize) -> Result<Vec<Post>> {
        if limit == 0 {
            return Err(FeedError::Config(
                "timeline limit must be positive".to_string(),
            ));
        }
        self.strategy.home_timeline(user, limit)
    }

    /// Home timeline at the configured default length
    pub fn home_timeline_default(&self, user: &str) -> Result<Vec<Post>> {
        self.home_timeline(user, self.config.default_limit)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Clear all stored and derived state
    ///
    /// Exclusive maintenance operation for use between runs; must not race
    /// with concurrent publishers.
    pub fn reset(&self) -> Result<()> {
        tracing::info!("Resetting all feed state");
        self.backend.clear()
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Short name of the active strategy
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}
