//! Hosted LLM clients: Anthropic Messages and OpenAI Chat Completions.
//!
//! Both speak JSON over HTTPS through a shared [`reqwest::Client`]. The base
//! URL is overridable so tests can point a client at a wiremock server.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::parse::parse_recipe;
use super::pricing::{self, Pricing};
use super::schema;
use super::traits::{ProviderResponse, RecipeProvider};
use crate::types::{GenerationOptions, TokenUsage};
use crate::{ForgeError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Deadline for the health probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Which hosted API a [`HostedProvider`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-5-sonnet-20241022",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAi => "https://api.openai.com",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn pricing(&self) -> Pricing {
        match self {
            Self::Anthropic => pricing::ANTHROPIC,
            Self::OpenAi => pricing::OPENAI,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(ForgeError::Configuration(format!(
                "unknown provider '{other}' (expected 'anthropic' or 'openai')"
            ))),
        }
    }
}

/// Client for a hosted recipe model.
#[derive(Clone)]
pub struct HostedProvider {
    kind: ProviderKind,
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

/// Raw text and accounting from one completion.
struct Completion {
    text: String,
    usage: TokenUsage,
    model: String,
}

impl HostedProvider {
    /// Client for `kind` against its public endpoint.
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self::with_base_url(kind, api_key, kind.default_base_url())
    }

    /// Client with a custom base URL (for testing with wiremock, or a proxy).
    pub fn with_base_url(
        kind: ProviderKind,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            kind,
            api_key: api_key.into(),
            model: kind.default_model().to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            http: Client::new(),
        }
    }

    pub fn anthropic(api_key: impl Into<String>) -> Self {
        Self::new(ProviderKind::Anthropic, api_key)
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(ProviderKind::OpenAi, api_key)
    }

    /// Override the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.kind {
            ProviderKind::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            ProviderKind::OpenAi => request.bearer_auth(&self.api_key),
        }
    }

    async fn complete(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        match self.kind {
            ProviderKind::Anthropic => self.complete_anthropic(model, system, prompt, options).await,
            ProviderKind::OpenAi => self.complete_openai(model, system, prompt, options).await,
        }
    }

    async fn complete_anthropic(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = AnthropicRequest {
            model,
            max_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
            system,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let url = format!("{}/v1/messages", self.base_url);
        let response = self.authorize(self.http.post(&url)).json(&body).send().await?;
        let response = check_status(response).await?;
        let parsed: AnthropicResponse = response.json().await?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        if text.trim().is_empty() {
            return Err(ForgeError::EmptyResponse);
        }
        Ok(Completion {
            text,
            usage: TokenUsage::new(parsed.usage.input_tokens, parsed.usage.output_tokens),
            model: parsed.model.unwrap_or_else(|| model.to_owned()),
        })
    }

    async fn complete_openai(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = OpenAiRequest {
            model,
            max_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self.authorize(self.http.post(&url)).json(&body).send().await?;
        let response = check_status(response).await?;
        let parsed: OpenAiResponse = response.json().await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ForgeError::EmptyResponse)?;
        Ok(Completion {
            text,
            usage: TokenUsage::new(parsed.usage.prompt_tokens, parsed.usage.completion_tokens),
            model: parsed.model.unwrap_or_else(|| model.to_owned()),
        })
    }
}

#[async_trait]
impl RecipeProvider for HostedProvider {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(
        skip(self, prompt, options),
        fields(provider = self.kind.name(), model = options.model.as_deref().unwrap_or(&self.model))
    )]
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<ProviderResponse> {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let system = options
            .system_prompt
            .clone()
            .unwrap_or_else(schema::default_system_prompt);
        let deadline = options.timeout_or_default();

        let start = Instant::now();
        let outcome =
            match tokio::time::timeout(deadline, self.complete(model, &system, prompt, options))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ForgeError::Timeout(deadline)),
            };
        let elapsed = start.elapsed();

        let completion = outcome.map_err(|source| {
            warn!(elapsed_ms = elapsed.as_millis() as u64, error = %source, "provider call failed");
            ForgeError::GenerationFailed {
                provider: self.name().to_owned(),
                elapsed,
                source: Box::new(source),
            }
        })?;

        let recipe = parse_recipe(self.name(), &completion.text)?;
        let cost = self.kind.pricing().cost(&completion.usage);
        debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            cost,
            "provider call succeeded"
        );
        Ok(ProviderResponse {
            recipe,
            usage: completion.usage,
            cost,
            model: completion.model,
            elapsed,
        })
    }

    /// Probes `GET /v1/models`, which is authenticated but spends no tokens.
    async fn is_healthy(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        let probe = self.authorize(self.http.get(&url)).send();
        match tokio::time::timeout(HEALTH_TIMEOUT, probe).await {
            Ok(Ok(response)) if response.status().is_success() => true,
            Ok(Ok(response)) => {
                warn!(provider = self.name(), status = response.status().as_u16(), "health probe rejected");
                false
            }
            Ok(Err(e)) => {
                warn!(provider = self.name(), error = %e, "health probe failed");
                false
            }
            Err(_) => {
                warn!(provider = self.name(), "health probe timed out");
                false
            }
        }
    }
}

/// Map non-success statuses onto the error taxonomy.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 | 403 => Err(ForgeError::AuthenticationFailed),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(ForgeError::RateLimited { retry_after })
        }
        code => {
            let message = response.text().await.unwrap_or_default();
            Err(ForgeError::Api {
                status: code,
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            })
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<AnthropicBlock>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: OpenAiUsage,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
