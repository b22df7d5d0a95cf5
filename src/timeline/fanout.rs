//! Bounded-concurrency broadcast pool
//!
//! The push strategy delivers one post to every follower. The per-follower
//! upserts are mutually independent, so they are dispatched across a capped
//! pool of worker threads fed by a crossbeam channel: concurrency keeps
//! publish latency flat for high-follower authors, the cap protects the
//! storage backend from unbounded concurrent calls.

use std::time::Instant;

use parking_lot::Mutex;

use crate::error::{FeedError, Result};

/// Run `op` over every item with at most `concurrency` workers
///
/// Stops dispatching after the first failure (or once `deadline` passes) and
/// returns that first error; items already processed stay processed. Callers
/// rely on `op` being idempotent to make the whole broadcast retryable.
pub fn broadcast<T, F>(
    items: &[T],
    concurrency: usize,
    deadline: Option<Instant>,
    op: F,
) -> Result<()>
where
    T: Sync,
    F: Fn(&T) -> Result<()> + Sync,
{
    if items.is_empty() {
        return Ok(());
    }

    let workers = concurrency.min(items.len()).max(1);
    if workers == 1 {
        for item in items {
            check_deadline(deadline)?;
            op(item)?;
        }
        return Ok(());
    }

    let (tx, rx) = crossbeam::channel::unbounded();
    for item in items {
        // Receiver outlives every send; unbounded send cannot block
        let _ = tx.send(item);
    }
    drop(tx);

    let first_error: Mutex<Option<FeedError>> = Mutex::new(None);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let rx = rx.clone();
            let first_error = &first_error;
            let op = &op;

            scope.spawn(move || {
                while let Ok(item) = rx.recv() {
                    if first_error.lock().is_some() {
                        break;
                    }
                    let result = check_deadline(deadline).and_then(|_| op(item));
                    if let Err(e) = result {
                        let mut slot = first_error.lock();
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                        break;
                    }
                }
            });
        }
    });

    match first_error.into_inner() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn check_deadline(deadline: Option<Instant>) -> Result<()> {
    match deadline {
        Some(d) if Instant::now() >= d => Err(FeedError::Backend(
            "publish deadline exceeded mid-broadcast".to_string(),
        )),
        _ => Ok(()),
    }
}
