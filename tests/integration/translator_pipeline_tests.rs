/*!
 * Translator endpoint selection against a mock HTTP server
 */

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use subctx::errors::ApiErrorKind;
use subctx::providers::{CacheMode, RetryMode};
use subctx::translation::{EndpointState, SubtitleTranslator};
use crate::common;

async fn mount_chat(server: &MockServer, text: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(common::CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::chat_body(text)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_responses(server: &MockServer, template: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(common::RESPONSES_PATH))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn bodies_for(server: &MockServer, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_translate_responsesAvailable_shouldUseCachedEndpointWithContext() {
    let server = MockServer::start().await;
    mount_responses(&server, ResponseTemplate::new(200).set_body_json(common::responses_body("Salut")), 2).await;
    mount_chat(&server, "unused", 0).await;

    let mut translator = SubtitleTranslator::from_config(&common::test_config(&server, "fr"));
    translator.translate("Hello").await.unwrap();
    let second = translator.translate("How are you?").await.unwrap();

    assert_eq!(second.translated, "Salut");
    assert_eq!(translator.endpoint_state(), EndpointState::TryCached);

    let bodies = bodies_for(&server, common::RESPONSES_PATH).await;
    assert_eq!(bodies[0]["max_output_tokens"], 1000);
    let user_parts = bodies[1]["input"][1]["content"].as_array().unwrap();
    assert_eq!(user_parts.len(), 3);
    assert_eq!(user_parts[1]["text"], "Context entry (older to newer): {Hello}");
    assert_eq!(user_parts[1]["cache_control"], json!({"type": "ephemeral"}));
    assert_eq!(user_parts[2]["text"], "Subtitle to translate: {How are you?}");
}

#[tokio::test]
async fn test_translate_responsesNotFound_shouldFallBackForRestOfSession() {
    let server = MockServer::start().await;
    mount_responses(
        &server,
        ResponseTemplate::new(404).set_body_json(json!({"error": {"message": "Unknown endpoint"}})),
        1,
    )
    .await;
    mount_chat(&server, "Hallo", 3).await;

    let mut translator = SubtitleTranslator::from_config(&common::test_config(&server, "de"));
    for line in ["one", "two", "three"] {
        assert_eq!(translator.translate(line).await.unwrap().translated, "Hallo");
    }

    assert_eq!(translator.endpoint_state(), EndpointState::ChatOnly);
    assert_eq!(translator.stats().chat_endpoint, 3);
}

#[tokio::test]
async fn test_translate_responsesShapeMismatch_shouldFallBackForRestOfSession() {
    let server = MockServer::start().await;
    mount_responses(&server, ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})), 1).await;
    mount_chat(&server, "Hola", 2).await;

    let mut translator = SubtitleTranslator::from_config(&common::test_config(&server, "es"));
    translator.translate("one").await.unwrap();
    translator.translate("two").await.unwrap();

    assert_eq!(translator.endpoint_state(), EndpointState::ChatOnly);
}

#[tokio::test]
async fn test_translate_cacheOff_shouldSendContextInChatPrompt() {
    let server = MockServer::start().await;
    mount_responses(&server, ResponseTemplate::new(200).set_body_json(common::responses_body("x")), 0).await;
    mount_chat(&server, "Ciao", 2).await;

    let mut config = common::test_config(&server, "it");
    config.context_cache_mode = CacheMode::Off;
    let mut translator = SubtitleTranslator::from_config(&config);
    translator.translate("Good evening").await.unwrap();
    translator.translate("Nice to meet you").await.unwrap();

    let bodies = bodies_for(&server, common::CHAT_PATH).await;
    let first_prompt = bodies[0]["messages"][1]["content"].as_str().unwrap();
    let second_prompt = bodies[1]["messages"][1]["content"].as_str().unwrap();

    assert!(!first_prompt.contains("[Subtitle context]"));
    assert!(second_prompt.contains("[Subtitle context](DO NOT OUTPUT!):\n{Good evening}"));
    assert!(second_prompt.contains("Source language: Auto Detect"));
    assert!(second_prompt.contains("Target language: it"));
    assert!(second_prompt.ends_with("[Subtitle to translate]:\n{Nice to meet you}"));
}

#[tokio::test]
async fn test_translate_rtlTarget_shouldPrependMarker() {
    let server = MockServer::start().await;
    mount_responses(&server, ResponseTemplate::new(200).set_body_json(common::responses_body(" שלום \n")), 1).await;

    let mut translator = SubtitleTranslator::from_config(&common::test_config(&server, "he"));
    let result = translator.translate("Hello").await.unwrap();

    assert_eq!(result.translated, "\u{202B}שלום");
    assert_eq!(result.original, "Hello");
}

#[tokio::test]
async fn test_translate_chatFailure_shouldSurfaceApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::CHAT_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "Invalid API key"}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = common::test_config(&server, "fr");
    config.context_cache_mode = CacheMode::Off;
    let mut translator = SubtitleTranslator::from_config(&config);

    let err = translator.translate("Hello").await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Provider { status: 401 });
    assert_eq!(err.to_string(), "Invalid API key");
}

#[tokio::test]
async fn test_translate_responsesNotFoundUnderRetryForever_shouldFallBackWithoutLooping() {
    let server = MockServer::start().await;
    mount_responses(
        &server,
        ResponseTemplate::new(404).set_body_json(json!({"error": {"message": "Unknown endpoint"}})),
        1,
    )
    .await;
    mount_chat(&server, "Bonjour", 2).await;

    let mut config = common::test_config(&server, "fr");
    config.retry_mode = RetryMode::RetryForever;
    config.delay_ms = 1;
    let mut translator = SubtitleTranslator::from_config(&config);

    let first = tokio::time::timeout(Duration::from_secs(5), translator.translate("Hello"))
        .await
        .expect("translation should not hang on the caching endpoint")
        .unwrap();
    let second = translator.translate("Again").await.unwrap();

    assert_eq!(first.translated, "Bonjour");
    assert_eq!(second.translated, "Bonjour");
    assert_eq!(translator.endpoint_state(), EndpointState::ChatOnly);
    assert_eq!(translator.stats().chat_endpoint, 2);
}

#[tokio::test]
async fn test_translate_responsesNotFoundUnderDelayEveryAttempt_shouldFallBack() {
    let server = MockServer::start().await;
    mount_responses(&server, ResponseTemplate::new(404), 1).await;
    mount_chat(&server, "Hola", 1).await;

    let mut config = common::test_config(&server, "es");
    config.retry_mode = RetryMode::DelayEveryAttempt;
    config.delay_ms = 1;
    let mut translator = SubtitleTranslator::from_config(&config);

    let result = tokio::time::timeout(Duration::from_secs(5), translator.translate("Hello"))
        .await
        .expect("translation should not hang on the caching endpoint")
        .unwrap();

    assert_eq!(result.translated, "Hola");
    assert_eq!(translator.endpoint_state(), EndpointState::ChatOnly);
}
