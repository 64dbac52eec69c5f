//! Telemetry metric name constants.
//!
//! Centralised metric names for recipe-forge operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `recipe_forge_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "anthropic", "openai", "fallback")
//! - `operation`: "generate" or "enhance"
//! - `status`: outcome: "ok" or "error"
//! - `direction`: token direction: "input" or "output"
//! - `reason`: why a fallback was taken (see [`ForgeError::kind`](crate::ForgeError::kind))

/// Total provider calls.
///
/// Labels: `provider`, `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "recipe_forge_requests_total";

/// Provider call duration in seconds.
///
/// Labels: `provider`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "recipe_forge_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "recipe_forge_retries_total";

/// Total tokens consumed.
///
/// Labels: `provider`, `direction` ("input" | "output").
pub const TOKENS_TOTAL: &str = "recipe_forge_tokens_total";

/// Estimated spend in USD, as a histogram of per-call cost.
///
/// Labels: `provider`.
pub const COST_USD: &str = "recipe_forge_cost_usd";

/// Total fingerprint cache hits.
pub const CACHE_HITS_TOTAL: &str = "recipe_forge_cache_hits_total";

/// Total fingerprint cache misses (including expired entries).
pub const CACHE_MISSES_TOTAL: &str = "recipe_forge_cache_misses_total";

/// Requests refused by the per-caller rate limiter.
pub const ADMISSION_DENIED_TOTAL: &str = "recipe_forge_admission_denied_total";

/// Requests answered by the fallback generator.
///
/// Labels: `reason` ("ai_disabled" | "no_provider" | "generation_failed" |
/// "parse_error" | "quality_rejected" | ...).
pub const FALLBACKS_TOTAL: &str = "recipe_forge_fallbacks_total";

/// Quality score distribution for provider-produced recipes.
///
/// Labels: `provider`.
pub const QUALITY_SCORE: &str = "recipe_forge_quality_score";
