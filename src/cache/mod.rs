//! Fingerprint cache for accepted provider recipes.
//!
//! [`RecipeCache`] maps a request [`Fingerprint`] to the recipe a provider
//! produced for it. Only recipes that passed the quality gate are written;
//! fallback output never is. A hit bypasses rate limiting, the provider and
//! the quality gate entirely.
//!
//! Storage goes through an injected [`ArtifactStore`] (in-memory by
//! default), so multiple processes can share a cache by plugging in a
//! remote backend. Fingerprints are SHA-256 based and stable across
//! processes for that reason.

mod fingerprint;

pub use fingerprint::Fingerprint;

use std::sync::Arc;
use std::time::Duration;

use crate::store::{ArtifactStore, DEFAULT_MAX_ENTRIES, MemoryArtifactStore};
use crate::telemetry;
use crate::types::Recipe;

/// Configuration for the fingerprint cache.
///
/// ```rust
/// # use recipe_forge::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(5_000)
///     .ttl(Duration::from_secs(1800));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries for the in-memory store. Default: 10,000.
    pub max_entries: u64,
    /// Default time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the default time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Recipe cache keyed on request fingerprints.
///
/// Emits hit/miss metrics. Cheap to share: clone the `Arc` around it.
pub struct RecipeCache {
    store: Arc<dyn ArtifactStore>,
    default_ttl: Duration,
}

impl RecipeCache {
    /// Cache backed by the in-memory store.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_store(
            Arc::new(MemoryArtifactStore::with_max_entries(config.max_entries)),
            config.ttl,
        )
    }

    /// Cache backed by an injected store.
    pub fn with_store(store: Arc<dyn ArtifactStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Look up a live recipe. Expired entries read as a miss.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<Recipe> {
        match self.store.get(fingerprint.as_str()).await {
            Some(recipe) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(recipe)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store a recipe with the default TTL.
    pub async fn set(&self, fingerprint: &Fingerprint, recipe: Recipe) {
        self.set_with_ttl(fingerprint, recipe, self.default_ttl).await;
    }

    /// Store a recipe with an explicit TTL.
    pub async fn set_with_ttl(&self, fingerprint: &Fingerprint, recipe: Recipe, ttl: Duration) {
        self.store.set(fingerprint.as_str(), recipe, ttl).await;
    }

    /// Evict all entries.
    pub async fn clear(&self) {
        self.store.clear().await;
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
