//! recipe-forge - Orchestration layer for LLM recipe generation
//!
//! This crate mediates access to an expensive, unreliable, rate-limited
//! hosted model on behalf of many concurrent callers. A request flows
//! through a per-caller rate limiter, a fingerprint cache, the provider,
//! and a quality gate; anything that goes wrong after admission is
//! answered by a deterministic local fallback generator.
//!
//! # Example
//!
//! ```rust,no_run
//! use recipe_forge::{GenerationRequest, RecipeForge};
//!
//! #[tokio::main]
//! async fn main() -> recipe_forge::Result<()> {
//!     let forge = RecipeForge::builder()
//!         .anthropic("sk-ant-your-key")
//!         .build()?;
//!
//!     let request = GenerationRequest::new(["chicken", "rice"], "asian", 2)
//!         .max_time(45)
//!         .dietary("gluten-free");
//!     let result = forge.generate_recipe(&request, "user-42").await;
//!
//!     if let Some(recipe) = result.recipe {
//!         println!("{}", recipe.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Fallback-only mode
//!
//! With no provider configured (or `ai_enabled(false)`), every request is
//! served by the [`FallbackGenerator`], so the crate is usable offline:
//!
//! ```rust
//! use recipe_forge::{GenerationRequest, RecipeForge};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let forge = RecipeForge::builder().ai_enabled(false).build().unwrap();
//!     let request = GenerationRequest::new(["tofu"], "thai", 2);
//!     let result = forge.generate_recipe(&request, "anon").await;
//!     assert_eq!(result.usage.unwrap().provider, "fallback");
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod prompt;
pub mod providers;
pub mod quality;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, Fingerprint, RecipeCache};
pub use config::ForgeConfig;
pub use error::{ForgeError, Result};
pub use gateway::{RecipeForge, RecipeForgeBuilder, RecipeGenerator};
pub use limiter::{RateLimitConfig, RateLimiter};
pub use providers::{
    BasicFallback, FallbackGenerator, HostedProvider, ProviderKind, ProviderResponse,
    RecipeProvider, RetryConfig, RetryingRecipeProvider, UsageTracker,
};
pub use quality::{QualityAssessor, QualityFactors, QualityScore};
pub use store::{ArtifactStore, MemoryArtifactStore, MemoryWindowStore, WindowState, WindowStore};

// Re-export all types
pub use types::{
    Amount, Difficulty, EnhancementKind, FailureKind, GenerationFailure, GenerationOptions,
    GenerationRequest, GenerationResult, Instruction, Nutrition, Preferences, ProviderStatus,
    Recipe, RecipeIngredient, TokenUsage, UsageMetadata, UsageStats,
};
