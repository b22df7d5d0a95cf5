//! # chirpfeed
//!
//! A social feed engine computing home timelines — the reverse-chronological
//! merge of recent posts from everyone a user follows — with:
//! - Two interchangeable fan-out strategies (pull/fan-in, push/fan-out)
//! - Idempotent, retryable broadcast with bounded concurrency
//! - A pluggable storage backend (kv / set / sorted-set / counter primitives)
//! - Fault-isolated bulk ingestion of post and follow records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Record Loader                            │
//! │              (JSON-lines ingestion stream)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Feed Engine                              │
//! │        publish / follow / home_timeline / reset              │
//! └──────┬──────────────┬──────────────────┬────────────────────┘
//!        │              │                  │
//!        ▼              ▼                  ▼
//! ┌─────────────┐ ┌─────────────┐  ┌────────────────────┐
//! │ SocialGraph │ │  PostStore  │  │  TimelineStrategy  │
//! │   (edges)   │ │  (records)  │  │   (pull | push)    │
//! └──────┬──────┘ └──────┬──────┘  └─────────┬──────────┘
//!        │               │                   │
//!        └───────────────┼───────────────────┘
//!                        ▼
//!                ┌───────────────┐
//!                │StorageBackend │
//!                │ (kv/set/zset) │
//!                └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod backend;
pub mod graph;
pub mod post;
pub mod timeline;
pub mod ingest;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FeedError, Result};
pub use config::{Config, Strategy};
pub use backend::{MemoryBackend, StorageBackend};
pub use graph::SocialGraph;
pub use post::{Post, PostId, PostStore, UserId};
pub use timeline::{FeedEngine, PullStrategy, PushStrategy, TimelineStrategy};
pub use ingest::{ingest, ingest_file, IngestReport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of chirpfeed
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
