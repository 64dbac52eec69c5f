//! Storage backends for the fingerprint cache and the rate limiter.
//!
//! The orchestrator never touches a map directly. It talks to two small
//! traits, [`ArtifactStore`] and [`WindowStore`], so an in-memory backend can
//! be swapped for a shared one (redis, memcached) without changes above this
//! module. Implementations must make each keyed operation atomic; nothing
//! above relies on ordering across different keys.
//!
//! Time is read from [`tokio::time::Instant`], so tests can drive expiry
//! and window rollover with a paused clock.

mod memory;

pub use memory::{DEFAULT_MAX_ENTRIES, MemoryArtifactStore, MemoryWindowStore};

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::types::Recipe;

/// Key/value store for cached recipes.
///
/// Fail-open: a store may always answer "absent". Expired entries must read
/// as absent and be removed on that read; there is no background sweep.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Look up a live entry.
    async fn get(&self, key: &str) -> Option<Recipe>;

    /// Insert or overwrite an entry (last write wins).
    async fn set(&self, key: &str, recipe: Recipe, ttl: Duration);

    /// Drop every entry.
    async fn clear(&self);
}

/// Counter state for one fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub count: u32,
    pub reset_at: Instant,
}

impl WindowState {
    /// Events counted in the window as of `now` (0 once the window lapsed).
    pub fn live_count(&self, now: Instant) -> u32 {
        if now >= self.reset_at { 0 } else { self.count }
    }
}

/// Store of per-key window counters.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Current state without mutating it.
    async fn get(&self, key: &str) -> Option<WindowState>;

    /// Count one event in the window named `key`.
    ///
    /// Must be atomic per key: if the stored window has lapsed, the count
    /// restarts at 1 with a fresh `reset_at = now + window`; otherwise the
    /// count is incremented in place.
    async fn increment(&self, key: &str, window: Duration) -> WindowState;
}
