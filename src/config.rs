//! Configuration for chirpfeed
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{FeedError, Result};

/// Main configuration for a feed engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Strategy Selection
    // -------------------------------------------------------------------------
    /// Which fan-out strategy serves home timelines. A static deployment
    /// choice: the two strategies are never mixed within one timeline.
    pub strategy: Strategy,

    // -------------------------------------------------------------------------
    // Read Configuration
    // -------------------------------------------------------------------------
    /// Timeline length returned when the caller does not pass a limit
    pub default_limit: usize,

    // -------------------------------------------------------------------------
    // Push Fan-out Configuration
    // -------------------------------------------------------------------------
    /// Max concurrent per-follower upserts during one broadcast
    pub fanout_concurrency: usize,

    /// Retained length of each precomputed home timeline, if bounded.
    /// A storage bound, not a correctness requirement.
    pub timeline_cap: Option<usize>,

    /// Wall-clock budget for one publish broadcast, if bounded.
    /// An exceeded deadline aborts with a retryable backend error.
    pub publish_deadline: Option<Duration>,
}

/// Home timeline fan-out strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Fan-in at read time: O(1) writes, reads merge every followee's posts
    Pull,

    /// Fan-out at write time: O(followers) writes, O(limit) reads
    Push,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::Pull,
            default_limit: 10,
            fanout_concurrency: 8,
            timeline_cap: Some(800),
            publish_deadline: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(FeedError::Config(
                "default_limit must be positive".to_string(),
            ));
        }
        if self.fanout_concurrency == 0 {
            return Err(FeedError::Config(
                "fanout_concurrency must be positive".to_string(),
            ));
        }
        if self.timeline_cap == Some(0) {
            return Err(FeedError::Config(
                "timeline_cap must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the fan-out strategy
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the default timeline length
    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    /// Set the broadcast concurrency cap
    pub fn fanout_concurrency(mut self, workers: usize) -> Self {
        self.config.fanout_concurrency = workers;
        self
    }

    /// Set (or clear) the retained home-timeline length
    pub fn timeline_cap(mut self, cap: Option<usize>) -> Self {
        self.config.timeline_cap = cap;
        self
    }

    /// Set (or clear) the publish broadcast deadline
    pub fn publish_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.config.publish_deadline = deadline;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_default_limit_rejected() {
        let config = Config::builder().default_limit(0).build();
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));
    }

    #[test]
    fn test_zero_fanout_concurrency_rejected() {
        let config = Config::builder().fanout_concurrency(0).build();
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));
    }

    #[test]
    fn test_zero_timeline_cap_rejected() {
        let config = Config::builder().timeline_cap(Some(0)).build();
        assert!(matches!(config.validate(), Err(FeedError::Config(_))));
    }

    #[test]
    fn test_builder_sets_strategy() {
        let config = Config::builder().strategy(Strategy::Push).build();
        assert_eq!(config.strategy, Strategy::Push);
    }
}
