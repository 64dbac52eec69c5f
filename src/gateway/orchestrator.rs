//! The request state machine.
//!
//! ```text
//! RateCheck -> CacheLookup -> ProviderAttempt -> QualityGate -> Accept
//!                                  |                 |
//!                                  +---- failure ----+--> FallbackAttempt
//! ```
//!
//! Steps run strictly in sequence within a request. Only admission denial
//! and an unusable fallback surface as failures; every other problem is
//! logged with its own reason and absorbed by the fallback generator.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::cache::{Fingerprint, RecipeCache};
use crate::limiter::RateLimiter;
use crate::prompt::{build_enhancement_prompt, build_generation_prompt};
use crate::providers::{FallbackGenerator, ProviderResponse, RecipeProvider, UsageTracker};
use crate::quality::QualityAssessor;
use crate::telemetry;
use crate::types::{
    EnhancementKind, GenerationOptions, GenerationRequest, GenerationResult, ProviderStatus,
    Recipe, TokenUsage, UsageMetadata, UsageStats,
};
use crate::ForgeError;

/// Provider name and model reported for fallback output.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// Nominal response time reported for fallback output, in milliseconds.
pub const FALLBACK_RESPONSE_TIME_MS: u64 = 100;

/// Sampling temperature for enhancement calls.
pub const ENHANCE_TEMPERATURE: f32 = 0.5;

/// Why a request was answered by the fallback generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackReason {
    AiDisabled,
    NoProvider,
    /// Provider or quality-gate failure, labelled by [`ForgeError::kind`].
    Failure(&'static str),
}

impl FallbackReason {
    fn label(self) -> &'static str {
        match self {
            Self::AiDisabled => "ai_disabled",
            Self::NoProvider => "no_provider",
            Self::Failure(kind) => kind,
        }
    }
}

/// Orchestrates cache, rate limiting, provider, quality gate and fallback.
///
/// `Send + Sync`; share it behind an `Arc`. Build one with
/// [`RecipeForge::builder()`](super::RecipeForge::builder).
pub struct RecipeGenerator {
    pub(crate) provider: Option<Arc<dyn RecipeProvider>>,
    pub(crate) fallback: Arc<dyn FallbackGenerator>,
    pub(crate) usage_tracker: Option<Arc<dyn UsageTracker>>,
    pub(crate) cache: RecipeCache,
    pub(crate) limiter: RateLimiter,
    pub(crate) assessor: QualityAssessor,
    pub(crate) options: GenerationOptions,
    pub(crate) cache_enabled: bool,
    pub(crate) fallback_enabled: bool,
    pub(crate) ai_enabled: bool,
}

impl RecipeGenerator {
    /// Produce a recipe for `request` on behalf of `caller`.
    #[instrument(skip(self, request), fields(cuisine = %request.cuisine, servings = request.servings))]
    pub async fn generate_recipe(&self, request: &GenerationRequest, caller: &str) -> GenerationResult {
        if !self.ai_enabled {
            return self.fallback_response(request, FallbackReason::AiDisabled, None).await;
        }

        if !self.limiter.check_limit(caller).await {
            metrics::counter!(telemetry::ADMISSION_DENIED_TOTAL).increment(1);
            info!(caller, "rate limit exceeded");
            return ForgeError::AdmissionDenied {
                caller: caller.to_owned(),
            }
            .into();
        }

        let start = Instant::now();
        let fingerprint = Fingerprint::of(request);
        if self.cache_enabled
            && let Some(recipe) = self.cache.get(&fingerprint).await
        {
            debug!(%fingerprint, "cache hit");
            let (provider, model) = match &self.provider {
                Some(p) => (p.name().to_owned(), p.model().to_owned()),
                None => ("cache".to_owned(), "cache".to_owned()),
            };
            return GenerationResult::success(
                recipe,
                UsageMetadata {
                    model,
                    provider,
                    response_time_ms: start.elapsed().as_millis() as u64,
                    cache_hit: true,
                    tokens: None,
                    cost: Some(0.0),
                },
            );
        }

        let Some(provider) = &self.provider else {
            return self.fallback_response(request, FallbackReason::NoProvider, None).await;
        };

        let prompt = build_generation_prompt(request);
        let outcome = provider.generate(&prompt, &self.options).await;
        record_request("generate", provider.name(), start, outcome.is_ok());
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = provider.name(), reason = e.kind(), error = %e, "provider generation failed");
                return self
                    .fallback_response(request, FallbackReason::Failure(e.kind()), Some(&e))
                    .await;
            }
        };
        record_token_usage(provider.name(), &response.usage, response.cost);

        let quality = self.assessor.assess(&response.recipe, request);
        metrics::histogram!(telemetry::QUALITY_SCORE, "provider" => provider.name().to_owned())
            .record(quality.score);
        if !self.assessor.accepts(&quality) {
            let rejection = ForgeError::QualityRejected {
                score: quality.score,
                threshold: self.assessor.threshold(),
            };
            warn!(
                provider = provider.name(),
                score = quality.score,
                issues = ?quality.issues,
                "provider recipe rejected by quality gate"
            );
            return self
                .fallback_response(request, FallbackReason::Failure(rejection.kind()), Some(&rejection))
                .await;
        }

        self.accept(provider.as_ref(), caller, &fingerprint, response).await
    }

    /// Count, cache and track an accepted provider recipe.
    async fn accept(
        &self,
        provider: &dyn RecipeProvider,
        caller: &str,
        fingerprint: &Fingerprint,
        response: ProviderResponse,
    ) -> GenerationResult {
        self.limiter.increment_usage(caller).await;
        if self.cache_enabled {
            self.cache.set(fingerprint, response.recipe.clone()).await;
        }
        if let Some(tracker) = &self.usage_tracker
            && let Err(e) = tracker
                .record_generation(caller, response.usage, response.cost)
                .await
        {
            warn!(caller, error = %e, "usage tracking failed");
        }
        info!(
            provider = provider.name(),
            model = %response.model,
            cost = response.cost,
            "recipe generated"
        );
        GenerationResult::success(
            response.recipe,
            UsageMetadata {
                model: response.model,
                provider: provider.name().to_owned(),
                response_time_ms: response.elapsed.as_millis() as u64,
                cache_hit: false,
                tokens: Some(response.usage),
                cost: Some(response.cost),
            },
        )
    }

    async fn fallback_response(
        &self,
        request: &GenerationRequest,
        reason: FallbackReason,
        cause: Option<&ForgeError>,
    ) -> GenerationResult {
        if !self.fallback_enabled {
            let reason = match cause {
                Some(e) => e.to_string(),
                None => format!("{} and fallback generation is disabled", reason.label()),
            };
            warn!(%reason, "no recipe source available");
            return ForgeError::FallbackUnavailable { reason }.into();
        }
        metrics::counter!(telemetry::FALLBACKS_TOTAL, "reason" => reason.label()).increment(1);
        debug!(reason = reason.label(), "serving fallback recipe");
        let recipe = self.fallback.generate(request).await;
        GenerationResult::success(
            recipe,
            UsageMetadata {
                model: FALLBACK_PROVIDER.to_owned(),
                provider: FALLBACK_PROVIDER.to_owned(),
                response_time_ms: FALLBACK_RESPONSE_TIME_MS,
                cache_hit: false,
                tokens: None,
                cost: None,
            },
        )
    }

    /// Improve an existing recipe with a single provider call.
    ///
    /// Bypasses the cache, the rate limiter and the fallback generator.
    /// The enhanced recipe keeps the original's id and review data.
    #[instrument(skip(self, recipe, kind, feedback), fields(recipe_id = %recipe.id, kind = %kind))]
    pub async fn enhance(
        &self,
        recipe: &Recipe,
        kind: EnhancementKind,
        feedback: Option<&str>,
    ) -> GenerationResult {
        let Some(provider) = self.provider.as_ref().filter(|_| self.ai_enabled) else {
            return ForgeError::ProviderUnavailable("no provider configured for enhancement".into())
                .into();
        };
        let prompt = match build_enhancement_prompt(recipe, kind, feedback) {
            Ok(prompt) => prompt,
            Err(e) => return e.into(),
        };
        let options = self.options.clone().temperature(ENHANCE_TEMPERATURE);

        let start = Instant::now();
        let outcome = provider.generate(&prompt, &options).await;
        record_request("enhance", provider.name(), start, outcome.is_ok());
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "enhancement failed");
                return e.into();
            }
        };
        record_token_usage(provider.name(), &response.usage, response.cost);

        let mut enhanced = response.recipe;
        if !recipe.id.is_empty() {
            enhanced.id.clone_from(&recipe.id);
        }
        enhanced.rating = recipe.rating;
        enhanced.review_count = recipe.review_count;

        GenerationResult::success(
            enhanced,
            UsageMetadata {
                model: response.model,
                provider: provider.name().to_owned(),
                response_time_ms: response.elapsed.as_millis() as u64,
                cache_hit: false,
                tokens: Some(response.usage),
                cost: Some(response.cost),
            },
        )
    }

    /// Remaining budget and configuration snapshot for `caller`.
    ///
    /// Reports configured state only; it does not probe the provider.
    pub async fn usage_stats(&self, caller: &str) -> UsageStats {
        let provider_status = if !self.ai_enabled {
            ProviderStatus::Disabled
        } else if self.provider.is_some() {
            ProviderStatus::Available
        } else {
            ProviderStatus::Unavailable
        };
        UsageStats {
            remaining_requests: self.limiter.remaining(caller).await,
            provider_status,
            cache_enabled: self.cache_enabled,
            ai_enabled: self.ai_enabled,
        }
    }

    /// Drop every cached recipe.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("recipe cache cleared");
    }

    /// Probe the configured provider. `false` when none is configured.
    pub async fn check_health(&self) -> bool {
        match &self.provider {
            Some(provider) => provider.is_healthy().await,
            None => false,
        }
    }

    /// Name of the configured provider, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }
}

fn record_request(operation: &'static str, provider: &str, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "provider" => provider.to_owned(),
        "operation" => operation,
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "provider" => provider.to_owned(),
        "operation" => operation,
    )
    .record(start.elapsed().as_secs_f64());
}

fn record_token_usage(provider: &str, usage: &TokenUsage, cost: f64) {
    metrics::counter!(telemetry::TOKENS_TOTAL,
        "provider" => provider.to_owned(),
        "direction" => "input",
    )
    .increment(u64::from(usage.input_tokens));
    metrics::counter!(telemetry::TOKENS_TOTAL,
        "provider" => provider.to_owned(),
        "direction" => "output",
    )
    .increment(u64::from(usage.output_tokens));
    metrics::histogram!(telemetry::COST_USD, "provider" => provider.to_owned()).record(cost);
}
