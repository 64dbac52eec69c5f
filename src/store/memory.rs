//! In-process store implementations.

use std::future::ready;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tokio::time::Instant;
use tracing::trace;

use super::{ArtifactStore, WindowState, WindowStore};
use crate::types::Recipe;

/// Default maximum number of cached recipes.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Clone, Debug)]
struct CacheEntry {
    recipe: Recipe,
    expires_at: Instant,
}

/// Bounded in-memory recipe store.
///
/// Uses moka as a concurrent, capacity-bounded map. Expiry is tracked per
/// entry and enforced on read, so each entry can carry its own TTL. Reads
/// and writes of one key go through moka's compute API and are serialized.
pub struct MemoryArtifactStore {
    entries: Cache<String, CacheEntry>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max: u64) -> Self {
        Self {
            entries: Cache::new(max),
        }
    }
}

impl Default for MemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn get(&self, key: &str) -> Option<Recipe> {
        let now = Instant::now();
        // Check and removal run under moka's per-key lock, so a concurrent
        // `set` is never dropped by a stale read.
        let outcome = self
            .entries
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match &current {
                    Some(entry) if now > entry.value().expires_at => Op::Remove,
                    _ => Op::Nop,
                };
                ready(op)
            })
            .await;
        match outcome {
            CompResult::Unchanged(entry) => Some(entry.into_value().recipe),
            CompResult::Removed(_) => {
                trace!(key, "evicting expired cache entry");
                None
            }
            _ => None,
        }
    }

    async fn set(&self, key: &str, recipe: Recipe, ttl: Duration) {
        let entry = CacheEntry {
            recipe,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .entry_by_ref(key)
            .and_upsert_with(|_| ready(entry))
            .await;
    }

    async fn clear(&self) {
        self.entries.invalidate_all();
    }
}

/// In-memory window counters keyed by `"{caller}:{window}"`.
///
/// DashMap's entry API holds the shard lock for the whole
/// read-modify-write, which gives per-key atomic increments.
#[derive(Default)]
pub struct MemoryWindowStore {
    windows: DashMap<String, WindowState>,
}

impl MemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WindowStore for MemoryWindowStore {
    async fn get(&self, key: &str) -> Option<WindowState> {
        self.windows.get(key).map(|state| *state)
    }

    async fn increment(&self, key: &str, window: Duration) -> WindowState {
        let now = Instant::now();
        let mut state = self
            .windows
            .entry(key.to_owned())
            .or_insert(WindowState {
                count: 0,
                reset_at: now + window,
            });
        if now >= state.reset_at {
            state.count = 1;
            state.reset_at = now + window;
        } else {
            state.count += 1;
        }
        *state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::task::JoinSet;

    use super::*;
    use crate::types::{Difficulty, Instruction, RecipeIngredient};

    fn recipe(title: &str) -> Recipe {
        Recipe {
            id: "r1".into(),
            title: title.into(),
            description: String::new(),
            cuisine: "asian".into(),
            servings: 2,
            prep_time: 10,
            cook_time: 20,
            total_time: 30,
            difficulty: Difficulty::Easy,
            ingredients: vec![RecipeIngredient::new("rice")],
            instructions: vec![Instruction::new(1, "Cook the rice")],
            nutrition: None,
            dietary_info: vec![],
            tips: vec![],
            tags: vec![],
            rating: 0.0,
            review_count: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_absent_and_stays_absent() {
        let store = MemoryArtifactStore::new();
        store
            .set("k", recipe("Fried Rice"), Duration::from_secs(60))
            .await;
        assert_eq!(store.get("k").await.unwrap().title, "Fried Rice");

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.get("k").await.is_none());
        assert!(store.get("k").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_at_exact_expiry_is_still_live() {
        let store = MemoryArtifactStore::new();
        store.set("k", recipe("a"), Duration::from_secs(10)).await;
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(store.get("k").await.is_some());
    }

    #[tokio::test]
    async fn set_is_last_write_wins() {
        let store = MemoryArtifactStore::new();
        store.set("k", recipe("first"), Duration::from_secs(60)).await;
        store.set("k", recipe("second"), Duration::from_secs(60)).await;
        assert_eq!(store.get("k").await.unwrap().title, "second");
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let store = MemoryArtifactStore::new();
        store.set("a", recipe("a"), Duration::from_secs(60)).await;
        store.set("b", recipe("b"), Duration::from_secs(60)).await;
        store.clear().await;
        assert!(store.get("a").await.is_none());
        assert!(store.get("b").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn window_increments_then_resets_to_one() {
        let store = MemoryWindowStore::new();
        let window = Duration::from_secs(60);
        assert_eq!(store.increment("u:minute", window).await.count, 1);
        assert_eq!(store.increment("u:minute", window).await.count, 2);

        tokio::time::advance(window).await;
        let state = store.increment("u:minute", window).await;
        assert_eq!(state.count, 1);
        assert_eq!(state.reset_at, Instant::now() + window);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_distinct_keys_never_cross() {
        let store = Arc::new(MemoryArtifactStore::new());
        let mut tasks = JoinSet::new();
        for i in 0..64 {
            let store = store.clone();
            tasks.spawn(async move {
                let key = format!("fp-{i}");
                let title = format!("recipe {i}");
                for _ in 0..20 {
                    store.set(&key, recipe(&title), Duration::from_secs(60)).await;
                    let got = store.get(&key).await.map(|r| r.title);
                    assert_eq!(got.as_deref(), Some(title.as_str()));
                }
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn expiring_read_never_drops_a_concurrent_write() {
        let store = Arc::new(MemoryArtifactStore::new());
        for round in 0..200 {
            store.set("fp", recipe("stale"), Duration::ZERO).await;
            tokio::time::sleep(Duration::from_millis(1)).await;

            let reader = {
                let store = store.clone();
                tokio::spawn(async move { store.get("fp").await })
            };
            let writer = {
                let store = store.clone();
                tokio::spawn(async move {
                    store.set("fp", recipe("fresh"), Duration::from_secs(60)).await;
                })
            };
            let read = reader.await.unwrap();
            writer.await.unwrap();

            assert_ne!(read.map(|r| r.title).as_deref(), Some("stale"), "round {round}");
            assert_eq!(
                store.get("fp").await.map(|r| r.title).as_deref(),
                Some("fresh"),
                "round {round}"
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryWindowStore::new());
        let mut tasks = JoinSet::new();
        for _ in 0..500 {
            let store = store.clone();
            tasks.spawn(async move { store.increment("u:hour", Duration::from_secs(3600)).await });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }
        assert_eq!(store.get("u:hour").await.unwrap().count, 500);
    }

    #[tokio::test]
    async fn get_does_not_create_windows() {
        let store = MemoryWindowStore::new();
        assert!(store.get("nobody:minute").await.is_none());
        assert!(store.get("nobody:minute").await.is_none());
    }
}
