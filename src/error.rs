//! Error types for chirpfeed
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::post::PostId;

/// Result type alias using FeedError
pub type Result<T> = std::result::Result<T, FeedError>;

/// Unified error type for chirpfeed operations
#[derive(Debug, Error)]
pub enum FeedError {
    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    /// A single unit of work (one post, one edge, one ingestion record) was
    /// rejected. Callers recover locally: the offending unit is dropped and
    /// the surrounding stream continues.
    #[error("Validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Post {0} not found")]
    NotFound(PostId),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// Storage backend failure. Retryable: publish under the push strategy is
    /// idempotent, so the whole call can be re-run after a partial broadcast.
    #[error("Backend unavailable: {0}")]
    Backend(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}
