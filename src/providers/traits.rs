//! Provider and collaborator traits.
//!
//! The orchestrator depends on three seams:
//! - [`RecipeProvider`]: a hosted model that turns a prompt into a recipe
//! - [`FallbackGenerator`]: a local, deterministic generator that never fails
//! - [`UsageTracker`]: a sink for accepted, billable generations
//!
//! Decorators such as [`RetryingRecipeProvider`](super::RetryingRecipeProvider)
//! wrap a `RecipeProvider` and are themselves providers.

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::types::{GenerationOptions, GenerationRequest, Recipe, TokenUsage};

/// A successful provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub recipe: Recipe,
    pub usage: TokenUsage,
    /// Estimated cost in USD, from the provider's rate table.
    pub cost: f64,
    /// Model that served the call.
    pub model: String,
    /// Wall time of the call.
    pub elapsed: Duration,
}

/// Hosted model that generates recipes from structured prompts.
///
/// Implementations must return token counts and cost on every success,
/// and fold network, timeout and provider errors into a failed `Result`
/// rather than panicking.
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Provider name for logging/metrics (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Default model identifier.
    fn model(&self) -> &str;

    /// Issue `prompt` and parse the answer into a recipe.
    async fn generate(&self, prompt: &str, options: &GenerationOptions)
    -> Result<ProviderResponse>;

    /// Cheap liveness probe. Never errors; any failure reads as `false`.
    async fn is_healthy(&self) -> bool;
}

/// Local generator used when the provider is absent, failing or rejected.
#[async_trait]
pub trait FallbackGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Recipe;
}

/// Records accepted provider generations against a caller.
///
/// Errors are logged by the orchestrator and never change its response.
#[async_trait]
pub trait UsageTracker: Send + Sync {
    async fn record_generation(&self, caller: &str, tokens: TokenUsage, cost: f64) -> Result<()>;
}
