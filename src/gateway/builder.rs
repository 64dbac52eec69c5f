//! Builder for configuring [`RecipeGenerator`] instances

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::RecipeGenerator;
use crate::cache::{CacheConfig, RecipeCache};
use crate::config::ForgeConfig;
use crate::limiter::{RateLimitConfig, RateLimiter};
use crate::providers::{
    BasicFallback, FallbackGenerator, HostedProvider, ProviderKind, RecipeProvider, RetryConfig,
    RetryingRecipeProvider, UsageTracker,
};
use crate::quality::QualityAssessor;
use crate::store::{ArtifactStore, MemoryArtifactStore, WindowStore};
use crate::types::GenerationOptions;
use crate::{ForgeError, Result};

/// Main entry point for creating generator instances.
pub struct RecipeForge;

impl RecipeForge {
    /// Create a new builder for configuring the generator.
    pub fn builder() -> RecipeForgeBuilder {
        RecipeForgeBuilder::new()
    }

    /// Builder pre-populated from a loaded configuration file.
    pub fn from_config(config: &ForgeConfig) -> RecipeForgeBuilder {
        RecipeForgeBuilder::new().config(config)
    }
}

/// Builder for configuring generator instances.
pub struct RecipeForgeBuilder {
    hosted: Option<(ProviderKind, String)>,
    custom_provider: Option<Arc<dyn RecipeProvider>>,
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
    cache_enabled: bool,
    fallback_enabled: bool,
    ai_enabled: bool,
    rate_limits: RateLimitConfig,
    cache: CacheConfig,
    retry: RetryConfig,
    quality_threshold: Option<f64>,
    artifact_store: Option<Arc<dyn ArtifactStore>>,
    window_store: Option<Arc<dyn WindowStore>>,
    fallback: Option<Arc<dyn FallbackGenerator>>,
    usage_tracker: Option<Arc<dyn UsageTracker>>,
}

impl RecipeForgeBuilder {
    pub fn new() -> Self {
        Self {
            hosted: None,
            custom_provider: None,
            base_url: None,
            model: None,
            timeout: None,
            cache_enabled: true,
            fallback_enabled: true,
            ai_enabled: true,
            rate_limits: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            quality_threshold: None,
            artifact_store: None,
            window_store: None,
            fallback: None,
            usage_tracker: None,
        }
    }

    /// Apply every setting from a configuration file.
    ///
    /// A `[provider]` table without a resolvable API key is skipped; `build()`
    /// then applies the missing-provider policy.
    pub fn config(mut self, config: &ForgeConfig) -> Self {
        if let Some(provider) = &config.provider {
            match provider.resolve_api_key() {
                Some(key) => self.hosted = Some((provider.kind, key)),
                None => warn!(
                    provider = provider.kind.name(),
                    env = provider.kind.api_key_env(),
                    "provider configured without an API key"
                ),
            }
            self.model = provider.model.clone().or(self.model);
            self.base_url = provider.base_url.clone().or(self.base_url);
            self.timeout = Some(provider.timeout());
        }
        self.cache_enabled = config.features.cache_enabled;
        self.fallback_enabled = config.features.fallback_enabled;
        self.ai_enabled = config.features.ai_enabled;
        self.rate_limits = config.rate_limits.into();
        self.cache = config.cache.into();
        self.retry = config.retry.into();
        self.quality_threshold = Some(config.quality.threshold);
        self
    }

    /// Configure the Anthropic Messages API.
    pub fn anthropic(mut self, api_key: impl Into<String>) -> Self {
        self.hosted = Some((ProviderKind::Anthropic, api_key.into()));
        self
    }

    /// Configure the OpenAI Chat Completions API.
    pub fn openai(mut self, api_key: impl Into<String>) -> Self {
        self.hosted = Some((ProviderKind::OpenAi, api_key.into()));
        self
    }

    /// Use a custom provider instead of a hosted one. Takes precedence over
    /// [`anthropic`](Self::anthropic) / [`openai`](Self::openai).
    pub fn provider(mut self, provider: Arc<dyn RecipeProvider>) -> Self {
        self.custom_provider = Some(provider);
        self
    }

    /// Override the hosted provider's base URL (proxies, wiremock).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the hosted provider's default model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Per-call provider timeout (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    /// `false` routes every request straight to the fallback generator.
    pub fn ai_enabled(mut self, enabled: bool) -> Self {
        self.ai_enabled = enabled;
        self
    }

    pub fn rate_limits(mut self, limits: RateLimitConfig) -> Self {
        self.rate_limits = limits;
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Wrap the provider in a retry decorator. Off by default.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Minimum quality score for provider recipes (default: 0.6).
    pub fn quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }

    /// Replace the in-memory recipe store.
    pub fn artifact_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.artifact_store = Some(store);
        self
    }

    /// Replace the in-memory rate window store.
    pub fn window_store(mut self, store: Arc<dyn WindowStore>) -> Self {
        self.window_store = Some(store);
        self
    }

    /// Replace the built-in [`BasicFallback`].
    pub fn fallback(mut self, fallback: Arc<dyn FallbackGenerator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn usage_tracker(mut self, tracker: Arc<dyn UsageTracker>) -> Self {
        self.usage_tracker = Some(tracker);
        self
    }

    fn resolve_provider(&mut self) -> Option<Arc<dyn RecipeProvider>> {
        let provider: Arc<dyn RecipeProvider> = match self.custom_provider.take() {
            Some(custom) => custom,
            None => {
                let (kind, key) = self.hosted.take()?;
                let mut hosted = match self.base_url.take() {
                    Some(url) => HostedProvider::with_base_url(kind, key, url),
                    None => HostedProvider::new(kind, key),
                };
                if let Some(model) = self.model.take() {
                    hosted = hosted.with_model(model);
                }
                Arc::new(hosted)
            }
        };
        if self.retry.is_enabled() {
            Some(Arc::new(RetryingRecipeProvider::new(
                provider,
                self.retry.clone(),
            )))
        } else {
            Some(provider)
        }
    }

    /// Build the generator.
    ///
    /// With AI enabled and no provider configured, the generator runs in
    /// fallback-only mode if fallback is permitted; otherwise this fails
    /// with [`ForgeError::ProviderUnavailable`].
    pub fn build(mut self) -> Result<RecipeGenerator> {
        let provider = self.resolve_provider();
        let provider = self.apply_startup_policy(provider, "no provider configured")?;
        Ok(self.assemble(provider))
    }

    /// Build the generator after probing the provider's health.
    ///
    /// An unhealthy provider is treated like a missing one.
    pub async fn build_verified(mut self) -> Result<RecipeGenerator> {
        let mut provider = self.resolve_provider();
        let healthy = match &provider {
            Some(p) if self.ai_enabled => p.is_healthy().await,
            _ => true,
        };
        if !healthy {
            provider = None;
        }
        let provider = self.apply_startup_policy(provider, "provider failed its health check")?;
        Ok(self.assemble(provider))
    }

    fn apply_startup_policy(
        &self,
        provider: Option<Arc<dyn RecipeProvider>>,
        missing: &str,
    ) -> Result<Option<Arc<dyn RecipeProvider>>> {
        if provider.is_some() || !self.ai_enabled {
            return Ok(provider);
        }
        if !self.fallback_enabled {
            return Err(ForgeError::ProviderUnavailable(format!(
                "{missing} and fallback generation is disabled"
            )));
        }
        warn!("{missing}; running in fallback-only mode");
        Ok(None)
    }

    fn assemble(self, provider: Option<Arc<dyn RecipeProvider>>) -> RecipeGenerator {
        let artifact_store = self.artifact_store.unwrap_or_else(|| {
            Arc::new(MemoryArtifactStore::with_max_entries(self.cache.max_entries))
        });
        let limiter = match self.window_store {
            Some(store) => RateLimiter::with_store(store, self.rate_limits),
            None => RateLimiter::new(self.rate_limits),
        };
        let assessor = self
            .quality_threshold
            .map_or_else(QualityAssessor::new, QualityAssessor::with_threshold);
        let mut options = GenerationOptions::new();
        if let Some(timeout) = self.timeout {
            options = options.timeout(timeout);
        }

        info!(
            provider = provider.as_deref().map(|p| p.name()),
            cache_enabled = self.cache_enabled,
            fallback_enabled = self.fallback_enabled,
            ai_enabled = self.ai_enabled,
            "recipe generator ready"
        );

        RecipeGenerator {
            provider,
            fallback: self.fallback.unwrap_or_else(|| Arc::new(BasicFallback::new())),
            usage_tracker: self.usage_tracker,
            cache: RecipeCache::with_store(artifact_store, self.cache.ttl),
            limiter,
            assessor,
            options,
            cache_enabled: self.cache_enabled,
            fallback_enabled: self.fallback_enabled,
            ai_enabled: self.ai_enabled,
        }
    }
}

impl Default for RecipeForgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
