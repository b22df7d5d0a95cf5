//! In-memory storage backend
//!
//! Lock-guarded maps behind the [`StorageBackend`] trait. Suitable for tests
//! and single-process deployments; a multi-instance deployment would swap in
//! a backend over a shared remote store without touching the engine.

use std::collections::{BTreeSet, HashMap, HashSet};

use parking_lot::RwLock;

use super::StorageBackend;
use crate::error::Result;

/// Sorted set: rank order plus a member index so upserts relocate members
/// instead of duplicating them
#[derive(Default)]
struct SortedSet {
    /// (score, member) pairs; BTreeSet iteration gives ascending rank order
    by_rank: BTreeSet<(i64, u64)>,
    /// member -> current score
    scores: HashMap<u64, i64>,
}

impl SortedSet {
    /// Upsert a member; returns true when the member was newly added
    fn add(&mut self, member: u64, score: i64) -> bool {
        match self.scores.insert(member, score) {
            Some(old) => {
                self.by_rank.remove(&(old, member));
                self.by_rank.insert((score, member));
                false
            }
            None => {
                self.by_rank.insert((score, member));
                true
            }
        }
    }

    fn rev_range(&self, count: usize) -> Vec<u64> {
        self.by_rank
            .iter()
            .rev()
            .take(count)
            .map(|&(_, member)| member)
            .collect()
    }

    fn trim_to(&mut self, max_len: usize) {
        while self.by_rank.len() > max_len {
            // Lowest (score, member) pair ranks last, so it goes first
            let lowest = match self.by_rank.iter().next() {
                Some(&pair) => pair,
                None => break,
            };
            self.by_rank.remove(&lowest);
            self.scores.remove(&lowest.1);
        }
    }
}

/// In-process implementation of [`StorageBackend`]
///
/// Each primitive family has its own lock, so publishes touching sorted sets
/// do not contend with graph reads touching plain sets. No lock is held
/// across more than one operation; cross-operation atomicity is the engine's
/// concern (and the engine only needs per-operation atomicity).
#[derive(Default)]
pub struct MemoryBackend {
    kv: RwLock<HashMap<String, Vec<u8>>>,
    sets: RwLock<HashMap<String, HashSet<String>>>,
    zsets: RwLock<HashMap<String, SortedSet>>,
    counters: RwLock<HashMap<String, u64>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn kv_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.kv.read().get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.kv.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        let mut sets = self.sets.write();
        Ok(sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .sets
            .read()
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn set_contains(&self, key: &str, member: &str) -> Result<bool> {
        Ok(self
            .sets
            .read()
            .get(key)
            .is_some_and(|set| set.contains(member)))
    }

    fn zset_add(&self, key: &str, member: u64, score: i64) -> Result<bool> {
        let mut zsets = self.zsets.write();
        Ok(zsets.entry(key.to_string()).or_default().add(member, score))
    }

    fn zset_rev_range(&self, key: &str, count: usize) -> Result<Vec<u64>> {
        Ok(self
            .zsets
            .read()
            .get(key)
            .map(|zset| zset.rev_range(count))
            .unwrap_or_default())
    }

    fn zset_len(&self, key: &str) -> Result<usize> {
        Ok(self
            .zsets
            .read()
            .get(key)
            .map(|zset| zset.by_rank.len())
            .unwrap_or(0))
    }

    fn zset_trim_to(&self, key: &str, max_len: usize) -> Result<()> {
        if let Some(zset) = self.zsets.write().get_mut(key) {
            zset.trim_to(max_len);
        }
        Ok(())
    }

    fn counter_next(&self, key: &str) -> Result<u64> {
        let mut counters = self.counters.write();
        let counter = counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn clear(&self) -> Result<()> {
        self.kv.write().clear();
        self.sets.write().clear();
        self.zsets.write().clear();
        self.counters.write().clear();
        Ok(())
    }
}
