//! Wiremock integration tests for HostedProvider.
//!
//! These tests verify request shape, response parsing, cost accounting and
//! error mapping for both hosted APIs using mocked responses.

use std::time::Duration;

use recipe_forge::{ForgeError, GenerationOptions, HostedProvider, ProviderKind, RecipeProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn recipe_text() -> String {
    json!({
        "title": "Chicken Fried Rice",
        "description": "Weeknight fried rice.",
        "prepTime": 10,
        "cookTime": 15,
        "ingredients": [
            {"name": "chicken", "amount": 300, "unit": "g"},
            {"name": "rice", "amount": 2, "unit": "cups"}
        ],
        "instructions": [
            {"step": 1, "instruction": "Cook the rice and spread it on a tray to cool completely."},
            {"step": 2, "instruction": "Stir-fry the diced chicken in a hot wok until golden."}
        ]
    })
    .to_string()
}

fn anthropic_body(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 1200, "output_tokens": 800}
    })
}

fn openai_body(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 1000, "completion_tokens": 500, "total_tokens": 1500}
    })
}

#[tokio::test]
async fn anthropic_success_parses_recipe_and_prices_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test_key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({"max_tokens": 2000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_body(&recipe_text())))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HostedProvider::with_base_url(ProviderKind::Anthropic, "test_key", server.uri());
    let response = provider
        .generate("make dinner", &GenerationOptions::default())
        .await
        .expect("generate should succeed");

    assert_eq!(response.recipe.title, "Chicken Fried Rice");
    assert_eq!(response.recipe.total_time, 25);
    assert!(!response.recipe.id.is_empty());
    assert_eq!(response.usage.input_tokens, 1200);
    assert_eq!(response.usage.output_tokens, 800);
    // 1200 * $3/M + 800 * $15/M
    assert!((response.cost - 0.0156).abs() < 1e-9);
    assert_eq!(response.model, "claude-3-5-sonnet-20241022");
}

#[tokio::test]
async fn openai_success_uses_bearer_auth_and_system_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test_key"))
        .and(body_partial_json(json!({"model": "gpt-4o", "temperature": 0.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(&recipe_text())))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HostedProvider::with_base_url(ProviderKind::OpenAi, "test_key", server.uri());
    let options = GenerationOptions::new().model("gpt-4o").temperature(0.5);
    let response = provider.generate("make dinner", &options).await.unwrap();

    assert_eq!(response.recipe.ingredients.len(), 2);
    assert_eq!(response.usage.input_tokens, 1000);
    // 1000 * $0.15/M + 500 * $0.60/M
    assert!((response.cost - 0.00045).abs() < 1e-12);
}

#[tokio::test]
async fn prose_wrapped_json_is_accepted() {
    let server = MockServer::start().await;
    let text = format!("Here is a lovely recipe:\n\n{}\n\nEnjoy your meal!", recipe_text());
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_body(&text)))
        .mount(&server)
        .await;

    let provider = HostedProvider::with_base_url(ProviderKind::Anthropic, "k", server.uri());
    let response = provider.generate("p", &GenerationOptions::default()).await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn non_json_answer_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(anthropic_body("Sorry, I can only talk about cooking.")),
        )
        .mount(&server)
        .await;

    let provider = HostedProvider::with_base_url(ProviderKind::Anthropic, "k", server.uri());
    let err = provider
        .generate("p", &GenerationOptions::default())
        .await
        .unwrap_err();
    match err {
        ForgeError::Parse { provider, .. } => assert_eq!(provider, "anthropic"),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limited_response_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let provider = HostedProvider::with_base_url(ProviderKind::OpenAi, "k", server.uri());
    let err = provider
        .generate("p", &GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        ForgeError::GenerationFailed { provider, source, .. }
            if provider == "openai" && matches!(**source, ForgeError::RateLimited { .. })
    ));
    assert!(err.is_transient());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn server_error_is_transient_and_auth_error_is_not() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "good"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "bad"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let overloaded = HostedProvider::with_base_url(ProviderKind::Anthropic, "good", server.uri());
    let err = overloaded
        .generate("p", &GenerationOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("overloaded"));

    let unauthorized = HostedProvider::with_base_url(ProviderKind::Anthropic, "bad", server.uri());
    let err = unauthorized
        .generate("p", &GenerationOptions::default())
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    assert!(matches!(
        err,
        ForgeError::GenerationFailed { source, .. } if matches!(*source, ForgeError::AuthenticationFailed)
    ));
}

#[tokio::test]
async fn slow_provider_times_out_with_elapsed_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(anthropic_body(&recipe_text()))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let provider = HostedProvider::with_base_url(ProviderKind::Anthropic, "k", server.uri());
    let options = GenerationOptions::new().timeout(Duration::from_millis(200));
    let err = provider.generate("p", &options).await.unwrap_err();

    match err {
        ForgeError::GenerationFailed {
            provider,
            elapsed,
            source,
        } => {
            assert_eq!(provider, "anthropic");
            assert!(elapsed >= Duration::from_millis(200));
            assert!(matches!(*source, ForgeError::Timeout(_)));
        }
        other => panic!("expected GenerationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_completion_is_a_generation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body("   ")))
        .mount(&server)
        .await;

    let provider = HostedProvider::with_base_url(ProviderKind::OpenAi, "k", server.uri());
    let err = provider
        .generate("p", &GenerationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ForgeError::GenerationFailed { source, .. } if matches!(*source, ForgeError::EmptyResponse)
    ));
}

#[tokio::test]
async fn health_probe_reflects_models_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer bad"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let healthy = HostedProvider::with_base_url(ProviderKind::OpenAi, "good", server.uri());
    let unhealthy = HostedProvider::with_base_url(ProviderKind::OpenAi, "bad", server.uri());
    assert!(healthy.is_healthy().await);
    assert!(!unhealthy.is_healthy().await);

    // Nothing listening: still never errors.
    let unreachable = HostedProvider::with_base_url(ProviderKind::OpenAi, "k", "http://127.0.0.1:9");
    assert!(!unreachable.is_healthy().await);
}
