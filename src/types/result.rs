//! Uniform response shapes returned by the orchestrator.

use serde::{Deserialize, Serialize};

use super::{Recipe, UsageMetadata};
use crate::ForgeError;

/// Outcome of `generate_recipe` or `enhance`.
///
/// Every path yields this shape: either `success` with a recipe and usage,
/// or a structured failure with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GenerationFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetadata>,
}

impl GenerationResult {
    pub fn success(recipe: Recipe, usage: UsageMetadata) -> Self {
        Self {
            success: true,
            recipe: Some(recipe),
            error: None,
            usage: Some(usage),
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            recipe: None,
            error: Some(GenerationFailure {
                kind,
                message: message.into(),
            }),
            usage: None,
        }
    }

    /// The failure kind, if this result is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

impl From<ForgeError> for GenerationResult {
    fn from(err: ForgeError) -> Self {
        let kind = match &err {
            ForgeError::AdmissionDenied { .. } => FailureKind::AdmissionDenied,
            ForgeError::FallbackUnavailable { .. } => FailureKind::FallbackUnavailable,
            ForgeError::ProviderUnavailable(_) | ForgeError::NoProvider => {
                FailureKind::ProviderUnavailable
            }
            ForgeError::Parse { .. } | ForgeError::Json(_) => FailureKind::ParseError,
            _ => FailureKind::GenerationFailed,
        };
        Self::failure(kind, err.to_string())
    }
}

/// A structured request-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Failure categories visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rate limit exceeded.
    AdmissionDenied,
    /// Provider unusable and fallback disabled.
    FallbackUnavailable,
    /// No provider configured (enhancement only).
    ProviderUnavailable,
    /// Provider call failed (enhancement only).
    GenerationFailed,
    /// Provider output unparseable (enhancement only).
    ParseError,
}

/// Snapshot returned by `usage_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub remaining_requests: u32,
    pub provider_status: ProviderStatus,
    pub cache_enabled: bool,
    pub ai_enabled: bool,
}

/// Whether provider generation is currently possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// A provider is configured and AI generation is on.
    Available,
    /// AI generation switched off by configuration.
    Disabled,
    /// No provider configured; requests go to the fallback.
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_error_maps_to_admission_kind() {
        let result: GenerationResult = ForgeError::AdmissionDenied {
            caller: "u1".into(),
        }
        .into();
        assert!(!result.success);
        assert_eq!(result.failure_kind(), Some(FailureKind::AdmissionDenied));
        assert!(result.error.unwrap().message.contains("u1"));
    }

    #[test]
    fn failure_serializes_snake_case_kind() {
        let result = GenerationResult::failure(FailureKind::FallbackUnavailable, "down");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"]["kind"], "fallback_unavailable");
        assert!(json.get("recipe").is_none());
    }
}
