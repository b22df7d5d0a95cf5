//! Engine-level integration tests
//!
//! Cross-strategy behavior: pull/push equivalence, idempotent fan-out retry
//! under injected backend failures, id monotonicity under concurrency, and
//! the query-surface error contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chirpfeed::{
    Config, FeedEngine, FeedError, MemoryBackend, PostId, PostStore, Result, StorageBackend,
    Strategy,
};

// =============================================================================
// Helpers
// =============================================================================

fn engine(strategy: Strategy) -> FeedEngine {
    let config = Config::builder().strategy(strategy).build();
    FeedEngine::new(config, Arc::new(MemoryBackend::new())).unwrap()
}

/// Backend wrapper that fails a chosen `zset_add` call, simulating a backend
/// timeout mid-broadcast. All other operations pass through.
struct FlakyBackend {
    inner: MemoryBackend,
    zset_add_calls: AtomicUsize,
    /// 1-based index of the zset_add call to fail, 0 to never fail
    fail_on_call: AtomicUsize,
}

impl FlakyBackend {
    fn new(fail_on_call: usize) -> Self {
        Self {
            inner: MemoryBackend::new(),
            zset_add_calls: AtomicUsize::new(0),
            fail_on_call: AtomicUsize::new(fail_on_call),
        }
    }

    fn heal(&self) {
        self.fail_on_call.store(0, Ordering::SeqCst);
    }
}

impl StorageBackend for FlakyBackend {
    fn kv_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.inner.kv_set(key, value)
    }

    fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        self.inner.set_add(key, member)
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.inner.set_members(key)
    }

    fn set_contains(&self, key: &str, member: &str) -> Result<bool> {
        self.inner.set_contains(key, member)
    }

    fn zset_add(&self, key: &str, member: u64, score: i64) -> Result<bool> {
        let call = self.zset_add_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call.load(Ordering::SeqCst) {
            return Err(FeedError::Backend("injected timeout".to_string()));
        }
        self.inner.zset_add(key, member, score)
    }

    fn zset_rev_range(&self, key: &str, count: usize) -> Result<Vec<u64>> {
        self.inner.zset_rev_range(key, count)
    }

    fn zset_len(&self, key: &str) -> Result<usize> {
        self.inner.zset_len(key)
    }

    fn zset_trim_to(&self, key: &str, max_len: usize) -> Result<()> {
        self.inner.zset_trim_to(key, max_len)
    }

    fn counter_next(&self, key: &str) -> Result<u64> {
        self.inner.counter_next(key)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}

// =============================================================================
// Pull/Push Equivalence
// =============================================================================

/// One follow edge or one post, replayed identically into both engines
enum Op {
    Follow(&'static str, &'static str),
    Post(&'static str, i64, &'static str),
}

fn replay(engine: &FeedEngine, script: &[Op]) {
    for op in script {
        match op {
            Op::Follow(follower, followee) => engine
                .follow(&follower.to_string(), &followee.to_string())
                .unwrap(),
            Op::Post(author, at, text) => {
                engine.post(author, *at, text).unwrap();
            }
        }
    }
}

fn timeline_ids(engine: &FeedEngine, user: &str, limit: usize) -> Vec<PostId> {
    engine
        .home_timeline(user, limit)
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect()
}

#[test]
fn test_two_followees_merge_newest_first_both_strategies() {
    // 1 follows 2 and 3; 2 posts "a" at t=100, 3 posts "b" at t=200;
    // the timeline of 1 must be [b, a] under either strategy
    let script = [
        Op::Follow("1", "2"),
        Op::Follow("1", "3"),
        Op::Post("2", 100, "a"),
        Op::Post("3", 200, "b"),
    ];

    for strategy in [Strategy::Pull, Strategy::Push] {
        let engine = engine(strategy);
        replay(&engine, &script);

        let timeline = engine.home_timeline("1", 10).unwrap();
        let texts: Vec<&str> = timeline.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a"], "strategy {:?}", strategy);
    }
}

#[test]
fn test_pull_push_equivalence_on_fixed_graph() {
    let script = [
        Op::Follow("u1", "u2"),
        Op::Follow("u1", "u3"),
        Op::Follow("u2", "u1"),
        Op::Follow("u3", "u1"),
        Op::Follow("u3", "u2"),
        Op::Post("u1", 500, "one"),
        Op::Post("u2", 300, "two"),
        Op::Post("u3", 500, "three"),
        Op::Post("u2", 700, "four"),
        Op::Post("u1", 700, "five"),
        Op::Post("u3", 100, "six"),
    ];

    let pull = engine(Strategy::Pull);
    let push = engine(Strategy::Push);
    replay(&pull, &script);
    replay(&push, &script);

    for user in ["u1", "u2", "u3", "stranger"] {
        for limit in [1, 2, 3, 10] {
            assert_eq!(
                timeline_ids(&pull, user, limit),
                timeline_ids(&push, user, limit),
                "user {} limit {}",
                user,
                limit
            );
        }
    }
}

#[test]
fn test_equal_timestamps_order_by_id_descending_both_strategies() {
    let script = [
        Op::Follow("reader", "a"),
        Op::Follow("reader", "b"),
        Op::Post("a", 1000, "first id"),
        Op::Post("b", 1000, "second id"),
        Op::Post("a", 1000, "third id"),
    ];

    for strategy in [Strategy::Pull, Strategy::Push] {
        let engine = engine(strategy);
        replay(&engine, &script);

        let ids = timeline_ids(&engine, "reader", 10);
        assert_eq!(ids, vec![3, 2, 1], "strategy {:?}", strategy);
    }
}

// =============================================================================
// Idempotent Fan-out Retry
// =============================================================================

#[test]
fn test_push_retry_after_partial_broadcast_converges() {
    // Broadcast to 5 followers with single-worker fan-out; the 4th zset_add
    // overall fails (1 for the author index + 2 delivered followers), so the
    // publish aborts with three followers still unserved.
    let backend = Arc::new(FlakyBackend::new(4));
    let config = Config::builder()
        .strategy(Strategy::Push)
        .fanout_concurrency(1)
        .build();
    let engine = FeedEngine::new(config, backend.clone()).unwrap();

    let followers = ["f1", "f2", "f3", "f4", "f5"];
    for follower in followers {
        engine
            .follow(&follower.to_string(), &"star".to_string())
            .unwrap();
    }

    let post = engine.compose("star", 100, "flaky broadcast").unwrap();
    let result = engine.publish(&post);
    assert!(matches!(result, Err(FeedError::Backend(_))));

    // Retry the same post end-to-end once the backend recovers
    backend.heal();
    engine.publish(&post).unwrap();

    for follower in followers {
        let timeline = engine.home_timeline(follower, 10).unwrap();
        assert_eq!(timeline.len(), 1, "follower {}", follower);
        assert_eq!(timeline[0].id, post.id);
    }
}

#[test]
fn test_republish_of_delivered_post_changes_nothing() {
    let engine = engine(Strategy::Push);
    engine
        .follow(&"reader".to_string(), &"author".to_string())
        .unwrap();

    let post = engine.compose("author", 100, "hello").unwrap();
    engine.publish(&post).unwrap();
    let before = timeline_ids(&engine, "reader", 10);

    engine.publish(&post).unwrap();
    engine.publish(&post).unwrap();

    assert_eq!(timeline_ids(&engine, "reader", 10), before);
}

// =============================================================================
// Id Assignment
// =============================================================================

#[test]
fn test_concurrent_next_id_values_are_distinct() {
    let backend: Arc<MemoryBackend> = Arc::new(MemoryBackend::new());
    let store = PostStore::new(backend);

    let mut ids: Vec<PostId> = Vec::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                scope.spawn(move || {
                    (0..100)
                        .map(|_| store.next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            ids.extend(handle.join().unwrap());
        }
    });

    assert_eq!(ids.len(), 800);
    assert!(ids.iter().all(|&id| id >= 1));
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 800, "duplicate ids were assigned");
}

// =============================================================================
// Query Surface
// =============================================================================

#[test]
fn test_zero_limit_is_a_configuration_error() {
    for strategy in [Strategy::Pull, Strategy::Push] {
        let engine = engine(strategy);
        let result = engine.home_timeline("anyone", 0);
        assert!(matches!(result, Err(FeedError::Config(_))));
    }
}

#[test]
fn test_default_limit_is_ten() {
    let engine = engine(Strategy::Pull);
    engine
        .follow(&"reader".to_string(), &"author".to_string())
        .unwrap();
    for t in 0..25 {
        engine.post("author", t, "post").unwrap();
    }

    assert_eq!(engine.home_timeline_default("reader").unwrap().len(), 10);
}

#[test]
fn test_bounded_retrieval_returns_min_of_limit_and_available() {
    for strategy in [Strategy::Pull, Strategy::Push] {
        let engine = engine(strategy);
        engine
            .follow(&"reader".to_string(), &"author".to_string())
            .unwrap();
        engine.post("author", 1, "one").unwrap();
        engine.post("author", 2, "two").unwrap();

        assert_eq!(engine.home_timeline("reader", 1).unwrap().len(), 1);
        assert_eq!(engine.home_timeline("reader", 10).unwrap().len(), 2);
    }
}

#[test]
fn test_get_post_not_found() {
    let engine = engine(Strategy::Pull);
    assert!(matches!(engine.get_post(999), Err(FeedError::NotFound(999))));
}

#[test]
fn test_reset_clears_state_and_restarts_ids() {
    let engine = engine(Strategy::Push);
    engine
        .follow(&"reader".to_string(), &"author".to_string())
        .unwrap();
    let first = engine.post("author", 100, "pre-reset").unwrap();

    engine.reset().unwrap();

    assert!(engine.followers("author").unwrap().is_empty());
    assert!(engine.home_timeline("reader", 10).unwrap().is_empty());
    // Id assignment restarts from 1 on a cleared backend
    let second = engine.post("author", 200, "post-reset").unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 1);
}

#[test]
fn test_high_follower_fanout_with_bounded_pool() {
    let config = Config::builder()
        .strategy(Strategy::Push)
        .fanout_concurrency(4)
        .build();
    let engine = FeedEngine::new(config, Arc::new(MemoryBackend::new())).unwrap();

    let followers: Vec<String> = (0..200).map(|i| format!("f{}", i)).collect();
    for follower in &followers {
        engine.follow(follower, &"star".to_string()).unwrap();
    }

    let id = engine.post("star", 100, "to the masses").unwrap();

    for follower in &followers {
        let timeline = engine.home_timeline(follower, 10).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].id, id);
    }
}
