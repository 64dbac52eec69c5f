//! Per-caller admission control over a minute and an hour window.
//!
//! Checking and counting are separate calls. The orchestrator checks before
//! doing any work and only counts after a billable, accepted provider
//! generation, so cache hits and failed attempts never consume quota.
//!
//! Windows are fixed and roll over lazily: a window's counter is only
//! recomputed when it is touched.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::store::{MemoryWindowStore, WindowStore};

/// Per-caller budgets.
///
/// ```rust
/// # use recipe_forge::RateLimitConfig;
/// let config = RateLimitConfig::new().per_minute(5).per_hour(50);
/// assert_eq!(config.per_minute, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per 60s window. Default: 10.
    pub per_minute: u32,
    /// Requests allowed per 3600s window. Default: 100.
    pub per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: 10,
            per_hour: 100,
        }
    }
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn per_minute(mut self, limit: u32) -> Self {
        self.per_minute = limit;
        self
    }

    pub fn per_hour(mut self, limit: u32) -> Self {
        self.per_hour = limit;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum WindowKind {
    Minute,
    Hour,
}

impl WindowKind {
    const ALL: [WindowKind; 2] = [WindowKind::Minute, WindowKind::Hour];

    fn duration(self) -> Duration {
        match self {
            Self::Minute => Duration::from_secs(60),
            Self::Hour => Duration::from_secs(3600),
        }
    }

    fn key(self, caller: &str) -> String {
        match self {
            Self::Minute => format!("{caller}:minute"),
            Self::Hour => format!("{caller}:hour"),
        }
    }
}

/// Two-window rate limiter over an injected [`WindowStore`].
pub struct RateLimiter {
    store: Arc<dyn WindowStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Limiter backed by the in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(Arc::new(MemoryWindowStore::new()), config)
    }

    /// Limiter backed by an injected store.
    pub fn with_store(store: Arc<dyn WindowStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Whether `caller` has budget left in both windows. Does not mutate.
    pub async fn check_limit(&self, caller: &str) -> bool {
        self.remaining(caller).await > 0
    }

    /// Remaining budget: the smaller of the two windows' remainders.
    pub async fn remaining(&self, caller: &str) -> u32 {
        let now = Instant::now();
        let mut remaining = u32::MAX;
        for kind in WindowKind::ALL {
            let used = self
                .store
                .get(&kind.key(caller))
                .await
                .map_or(0, |state| state.live_count(now));
            remaining = remaining.min(self.limit(kind).saturating_sub(used));
        }
        remaining
    }

    /// Count one billable request against both windows.
    pub async fn increment_usage(&self, caller: &str) {
        for kind in WindowKind::ALL {
            let state = self.store.increment(&kind.key(caller), kind.duration()).await;
            debug!(
                caller,
                window = ?kind,
                count = state.count,
                limit = self.limit(kind),
                "rate window incremented"
            );
        }
    }

    fn limit(&self, kind: WindowKind) -> u32 {
        match kind {
            WindowKind::Minute => self.config.per_minute,
            WindowKind::Hour => self.config.per_hour,
        }
    }
}
