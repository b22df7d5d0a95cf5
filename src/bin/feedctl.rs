//! chirpfeed demo CLI
//!
//! Ingests a JSON-lines record file into an in-memory engine and prints
//! requested home timelines.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use chirpfeed::{Config, FeedEngine, MemoryBackend, Strategy};

/// chirpfeed feed inspector
#[derive(Parser, Debug)]
#[command(name = "feedctl")]
#[command(about = "Ingest a record file and print home timelines")]
#[command(version)]
struct Args {
    /// JSON-lines file of post and follow records
    #[arg(short, long)]
    records: PathBuf,

    /// Fan-out strategy: pull or push
    #[arg(short, long, default_value = "pull")]
    strategy: String,

    /// User(s) whose home timeline to print (repeatable)
    #[arg(short, long)]
    user: Vec<String>,

    /// Timeline length per user
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Max concurrent fan-out writes (push strategy)
    #[arg(long, default_value = "8")]
    fanout_concurrency: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chirpfeed=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    let strategy = match args.strategy.as_str() {
        "pull" => Strategy::Pull,
        "push" => Strategy::Push,
        other => {
            tracing::error!("Unknown strategy {:?}, expected pull or push", other);
            std::process::exit(1);
        }
    };

    tracing::info!("chirpfeed v{}", chirpfeed::VERSION);

    let config = Config::builder()
        .strategy(strategy)
        .default_limit(args.limit)
        .fanout_concurrency(args.fanout_concurrency)
        .build();

    let engine = match FeedEngine::new(config, Arc::new(MemoryBackend::new())) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Failed to build engine: {}", e);
            std::process::exit(1);
        }
    };

    let report = match chirpfeed::ingest_file(&engine, &args.records) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Ingestion failed: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Ingested {} posts, {} follows ({} records skipped)",
        report.posts, report.follows, report.skipped
    );

    for user in &args.user {
        match engine.home_timeline(user, args.limit) {
            Ok(timeline) => {
                println!("\nHome timeline for {} ({} posts):", user, timeline.len());
                for post in timeline {
                    println!("  [{}] {} @{}: {}", post.id, post.author, post.posted_at, post.text);
                }
            }
            Err(e) => {
                tracing::error!("Timeline read for {} failed: {}", user, e);
                std::process::exit(1);
            }
        }
    }
}
