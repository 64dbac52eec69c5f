//! Tests for metrics emitted by the generation pipeline.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use recipe_forge::telemetry;
use recipe_forge::{
    Difficulty, ForgeError, GenerationOptions, GenerationRequest, Instruction, ProviderResponse,
    RateLimitConfig, Recipe, RecipeForge, RecipeGenerator, RecipeIngredient, RecipeProvider,
    Result, RetryConfig, TokenUsage,
};

// ============================================================================
// Mock providers
// ============================================================================

struct MockRecipeProvider {
    failures_left: AtomicU32,
}

impl MockRecipeProvider {
    fn healthy() -> Arc<Self> {
        Self::failing(0)
    }

    fn failing(times: u32) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicU32::new(times),
        })
    }
}

#[async_trait]
impl RecipeProvider for MockRecipeProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<ProviderResponse> {
        if self.failures_left.load(Ordering::Relaxed) > 0 {
            self.failures_left.fetch_sub(1, Ordering::Relaxed);
            return Err(ForgeError::Http("connection refused".into()));
        }
        let step = "Toss the rice and chicken in a hot pan until everything is glossy.";
        Ok(ProviderResponse {
            recipe: Recipe {
                id: "r1".into(),
                title: "Chicken Rice".into(),
                description: String::new(),
                cuisine: "asian".into(),
                servings: 2,
                prep_time: 5,
                cook_time: 10,
                total_time: 15,
                difficulty: Difficulty::Easy,
                ingredients: vec![RecipeIngredient::new("chicken"), RecipeIngredient::new("rice")],
                instructions: vec![Instruction::new(1, step)],
                nutrition: None,
                dietary_info: vec![],
                tips: vec![],
                tags: vec![],
                rating: 0.0,
                review_count: 0,
            },
            usage: TokenUsage::new(10, 20),
            cost: 0.0005,
            model: "mock-model".into(),
            elapsed: Duration::from_millis(3),
        })
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    counter_matching(snapshot, name, |_| true)
}

/// Sum counter values for a metric name whose labels include `label=value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    counter_matching(snapshot, name, |key| {
        key.key()
            .labels()
            .any(|l| l.key() == label && l.value() == value)
    })
}

fn counter_matching(
    snapshot: &SnapshotVec,
    name: &str,
    filter: impl Fn(&metrics_util::CompositeKey) -> bool,
) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter && key.key().name() == name && filter(key)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn request() -> GenerationRequest {
    GenerationRequest::new(["chicken", "rice"], "asian", 2)
}

/// Run `generate_recipe` `times` times inside a local recorder scope.
///
/// `block_in_place` keeps the sync `with_local_recorder` closure on the
/// current thread while `block_on` drives the async work.
fn record(generator: &RecipeGenerator, times: usize) -> SnapshotVec {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                for _ in 0..times {
                    generator.generate_recipe(&request(), "u1").await;
                }
            })
        })
    });

    snapshotter.snapshot().into_vec()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn accepted_generation_records_request_token_and_cache_metrics() {
    let generator = RecipeForge::builder()
        .provider(MockRecipeProvider::healthy())
        .build()
        .unwrap();

    let snapshot = record(&generator, 2);

    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "ok"),
        1,
        "second call is a cache hit and never reaches the provider"
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "operation", "generate"),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::TOKENS_TOTAL, "direction", "input"),
        10
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::TOKENS_TOTAL, "direction", "output"),
        20
    );
    assert!(has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS));
    assert!(has_histogram(&snapshot, telemetry::COST_USD));
    assert!(has_histogram(&snapshot, telemetry::QUALITY_SCORE));
    assert_eq!(counter_total(&snapshot, telemetry::FALLBACKS_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn provider_failure_records_error_and_fallback_reason() {
    let generator = RecipeForge::builder()
        .provider(MockRecipeProvider::failing(1))
        .build()
        .unwrap();

    let snapshot = record(&generator, 1);

    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "error"),
        1
    );
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::FALLBACKS_TOTAL,
            "reason",
            "generation_failed"
        ),
        1
    );
    assert!(!has_histogram(&snapshot, telemetry::QUALITY_SCORE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn disabled_ai_records_fallback_without_touching_the_cache() {
    let generator = RecipeForge::builder()
        .provider(MockRecipeProvider::healthy())
        .ai_enabled(false)
        .build()
        .unwrap();

    let snapshot = record(&generator, 1);

    assert_eq!(
        counter_with_label(&snapshot, telemetry::FALLBACKS_TOTAL, "reason", "ai_disabled"),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 0);
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn admission_denial_is_counted() {
    let generator = RecipeForge::builder()
        .provider(MockRecipeProvider::healthy())
        .rate_limits(RateLimitConfig::new().per_minute(0))
        .build()
        .unwrap();

    let snapshot = record(&generator, 2);

    assert_eq!(counter_total(&snapshot, telemetry::ADMISSION_DENIED_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 0);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn retries_are_counted_per_provider() {
    let generator = RecipeForge::builder()
        .provider(MockRecipeProvider::failing(1))
        .retry(
            RetryConfig::new()
                .max_attempts(3)
                .initial_delay(Duration::from_millis(1)),
        )
        .build()
        .unwrap();

    let snapshot = record(&generator, 1);

    assert_eq!(
        counter_with_label(&snapshot, telemetry::RETRIES_TOTAL, "provider", "mock"),
        1
    );
    // The decorator is invisible to the orchestrator: one logical request.
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "ok"),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let generator = RecipeForge::builder()
        .provider(MockRecipeProvider::healthy())
        .build()
        .unwrap();
    assert!(generator.generate_recipe(&request(), "u1").await.success);
}
