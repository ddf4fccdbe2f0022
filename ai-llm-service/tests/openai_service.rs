use ai_llm_service::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    services::open_ai_service::OpenAiService,
    types::ChatMessage,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn cfg(endpoint: &str, model: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: model.into(),
        endpoint: endpoint.into(),
        api_key: Some("sk-test".into()),
        max_tokens: Some(150),
        temperature: Some(0.0),
        top_p: Some(0.1),
        timeout_secs: Some(5),
    }
}

#[tokio::test]
async fn chat_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 150,
            "messages": [
                { "role": "system", "content": "be nice" },
                { "role": "user", "content": "hola" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "role": "assistant", "content": "¡Hola! 😊" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let svc = OpenAiService::new(cfg(&server.uri(), "gpt-3.5-turbo")).unwrap();
    let out = svc
        .chat(&[ChatMessage::system("be nice"), ChatMessage::user("hola")])
        .await
        .unwrap();
    assert_eq!(out, "¡Hola! 😊");
}

#[tokio::test]
async fn chat_surfaces_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(cfg(&server.uri(), "gpt-3.5-turbo")).unwrap();
    let err = svc.chat(&[ChatMessage::user("hola")]).await.unwrap_err();
    match err {
        AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::HttpStatus(h),
            ..
        }) => {
            assert_eq!(h.status.as_u16(), 429);
            assert_eq!(h.snippet, "rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn chat_without_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(cfg(&server.uri(), "gpt-3.5-turbo")).unwrap();
    let err = svc.chat(&[ChatMessage::user("hola")]).await.unwrap_err();
    assert!(matches!(
        err,
        AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::EmptyChoices,
            ..
        })
    ));
}

#[tokio::test]
async fn embeddings_return_first_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({
            "model": "text-embedding-ada-002",
            "input": "eSIM Japan 5GB"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "embedding": [0.25, -0.5, 1.0] } ]
        })))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(cfg(&server.uri(), "text-embedding-ada-002")).unwrap();
    let v = svc.embeddings("eSIM Japan 5GB").await.unwrap();
    assert_eq!(v, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn blank_embedding_input_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let svc = OpenAiService::new(cfg(&server.uri(), "text-embedding-ada-002")).unwrap();
    let err = svc.embeddings("   ").await.unwrap_err();
    assert!(matches!(
        err,
        AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::InvalidInput(_),
            ..
        })
    ));
}
