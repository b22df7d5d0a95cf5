//! Record Loader
//!
//! Bulk ingestion of post and follow-edge records from a JSON-lines stream.
//! The stream is consumed lazily in a single forward pass; restarting means
//! re-opening the source.
//!
//! Per-record fault isolation: a malformed line, or a record the engine
//! rejects with a `Validation` error (self-follow, over-length message), is
//! counted, logged, and skipped without aborting the rest of the stream.
//! Backend and I/O failures do abort, since every later record would hit the
//! same failure.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use crate::error::{FeedError, Result};
use crate::timeline::FeedEngine;

/// One line of the ingestion stream, distinguished by shape
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Record {
    Post {
        author_id: String,
        /// Milliseconds since the Unix epoch
        posted_at: i64,
        message: String,
    },
    Follow {
        follower_id: String,
        followee_id: String,
    },
}

/// Final accounting for one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Post records accepted and published
    pub posts: u64,
    /// Follow records accepted
    pub follows: u64,
    /// Records dropped: unparseable lines plus locally-rejected records
    pub skipped: u64,
}

impl IngestReport {
    /// Total records accepted
    pub fn accepted(&self) -> u64 {
        self.posts + self.follows
    }
}

/// Stream records from `reader` into `engine`
///
/// Blank lines are ignored. Returns the final accepted/skipped accounting.
pub fn ingest<R: BufRead>(engine: &FeedEngine, reader: R) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match apply_line(engine, &line) {
            Ok(Applied::Post) => report.posts += 1,
            Ok(Applied::Follow) => report.follows += 1,
            Err(FeedError::Validation(reason)) => {
                report.skipped += 1;
                tracing::warn!("Skipping record on line {}: {}", line_no + 1, reason);
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Ingestion finished: {} posts, {} follows, {} skipped",
        report.posts,
        report.follows,
        report.skipped
    );
    Ok(report)
}

/// Convenience wrapper over a buffered file reader
pub fn ingest_file(engine: &FeedEngine, path: &Path) -> Result<IngestReport> {
    let file = File::open(path)?;
    ingest(engine, BufReader::new(file))
}

enum Applied {
    Post,
    Follow,
}

fn apply_line(engine: &FeedEngine, line: &str) -> Result<Applied> {
    let record: Record = serde_json::from_str(line)
        .map_err(|e| FeedError::Validation(format!("malformed record: {}", e)))?;

    match record {
        Record::Post {
            author_id,
            posted_at,
            message,
        } => {
            engine.post(&author_id, posted_at, &message)?;
            Ok(Applied::Post)
        }
        Record::Follow {
            follower_id,
            followee_id,
        } => {
            engine.follow(&follower_id, &followee_id)?;
            Ok(Applied::Follow)
        }
    }
}
