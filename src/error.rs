//! recipe-forge error types

use std::time::Duration;

/// recipe-forge error types
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    // Request-level failures (surfaced to callers)
    /// Caller has no remaining budget in one of its rate windows.
    #[error("rate limit exceeded for caller '{caller}'")]
    AdmissionDenied { caller: String },

    /// Provider and fallback both unusable for this request.
    #[error("recipe generation is unavailable: {reason}")]
    FallbackUnavailable { reason: String },

    // Recoverable generation failures (absorbed by the fallback path)
    /// Provider could not be constructed or failed its health probe.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider call errored or timed out. Wraps the transport-level cause.
    #[error("generation failed on {provider} after {}ms: {source}", .elapsed.as_millis())]
    GenerationFailed {
        provider: String,
        elapsed: Duration,
        #[source]
        source: Box<ForgeError>,
    },

    /// Provider answered with content that is not a usable recipe.
    #[error("unparseable response from {provider}: {message}")]
    Parse { provider: String, message: String },

    /// Provider recipe scored below the acceptance threshold.
    #[error("quality score {score:.2} below threshold {threshold:.2}")]
    QualityRejected { score: f64, threshold: f64 },

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by provider, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("no provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ForgeError {
    /// Whether a retry of the same provider call may succeed.
    ///
    /// Network failures, timeouts, provider throttling and 5xx responses are
    /// transient. Everything else (auth, parse, quality, configuration) is
    /// permanent for the purpose of retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } | Self::Timeout(_) | Self::EmptyResponse => {
                true
            }
            Self::Api { status, .. } => *status >= 500,
            Self::GenerationFailed { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Provider-supplied backoff hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::GenerationFailed { source, .. } => source.retry_after(),
            _ => None,
        }
    }

    /// Short stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AdmissionDenied { .. } => "admission_denied",
            Self::FallbackUnavailable { .. } => "fallback_unavailable",
            Self::ProviderUnavailable(_) | Self::NoProvider => "provider_unavailable",
            Self::GenerationFailed { .. }
            | Self::Http(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::Timeout(_)
            | Self::AuthenticationFailed
            | Self::EmptyResponse => "generation_failed",
            Self::Parse { .. } | Self::Json(_) => "parse_error",
            Self::QualityRejected { .. } => "quality_rejected",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForgeError::Http(format!("timeout: {err}"))
        } else {
            ForgeError::Http(err.to_string())
        }
    }
}

/// Result type alias for recipe-forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;
