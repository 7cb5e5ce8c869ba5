use llm::{
    ChatMessage, ChatModel, ChatPayload, ChatRequest, ClaudeProvider, ContentBlock,
    DeepSeekProvider, GeminiProvider, LlmError, OpenAIProvider, ProviderKind, TransportErrorKind,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hello() -> ChatRequest {
    ChatRequest::new(&[ChatMessage::user("hello".into())])
}

fn openai_reply(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
    })
}

#[tokio::test]
async fn openai_success_sends_bearer_and_returns_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-4o", "max_completion_tokens": 5000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("Hi from GPT")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(&server.uri(), "sk-test").unwrap();
    let reply = provider.chat_model("gpt-4o").chat(&hello()).await.unwrap();
    assert_eq!(reply.get_text(), "Hi from GPT");
    assert_eq!(reply.role, llm::Role::Assistant);
}

#[tokio::test]
async fn openai_401_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(&server.uri(), "sk-bad").unwrap();
    let err = provider.chat_model("gpt-4o").chat(&hello()).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Authentication));
    let message = err.to_string();
    assert!(message.contains("OpenAI API authentication error (401)"));
    assert!(message.contains("Incorrect API key provided"));
    assert!(err.remediation().is_none());
}

#[tokio::test]
async fn openai_429_carries_generic_remediation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"message": "Rate limit reached"})))
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(&server.uri(), "sk-test").unwrap();
    let err = provider.chat_model("gpt-4o").chat(&hello()).await.unwrap_err();

    assert_eq!(err.transport_kind(), Some(TransportErrorKind::RateLimited));
    assert!(err.to_string().contains("Rate limit reached"));
    assert!(err.remediation().unwrap().contains("try again later"));
}

#[tokio::test]
async fn server_error_without_json_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let provider = DeepSeekProvider::new(&server.uri(), "ds-key").unwrap();
    let err = provider.chat_model("deepseek-chat").chat(&hello()).await.unwrap_err();
    assert_eq!(err.to_string(), "DeepSeek API error: 503 - Service Unavailable");
}

#[tokio::test]
async fn success_with_unexpected_shape_is_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new(&server.uri(), "sk-test").unwrap();
    let err = provider.chat_model("gpt-4o").chat(&hello()).await.unwrap_err();
    assert!(matches!(
        err,
        LlmError::ResponseFormat {
            provider: ProviderKind::OpenAI,
            ..
        }
    ));
}

#[tokio::test]
async fn claude_sends_key_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({"max_tokens": 5000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Hi from Claude"}],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ClaudeProvider::new(&server.uri(), "sk-ant-test").unwrap();
    let reply = provider
        .chat_model("claude-sonnet-4-5-20250929")
        .chat(&hello())
        .await
        .unwrap();
    assert_eq!(reply.get_text(), "Hi from Claude");
}

#[tokio::test]
async fn claude_403_is_permission_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "type": "error",
            "error": {"type": "permission_error", "message": "Key lacks access"}
        })))
        .mount(&server)
        .await;

    let provider = ClaudeProvider::new(&server.uri(), "sk-ant-test").unwrap();
    let err = provider.chat_model("claude-3-haiku").chat(&hello()).await.unwrap_err();
    assert_eq!(err.transport_kind(), Some(TransportErrorKind::Permission));
    assert!(err.to_string().contains("Key lacks access"));
}

#[tokio::test]
async fn gemini_key_travels_in_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .and(query_param("key", "AIza-test"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
            "generationConfig": {"topK": 40, "maxOutputTokens": 2000}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hi from Gemini"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(&server.uri(), "AIza-test");
    let reply = provider.chat_model("gemini-1.5-pro").chat(&hello()).await.unwrap();
    assert_eq!(reply.get_text(), "Hi from Gemini");
}

#[tokio::test]
async fn gemini_429_is_quota_error_with_docs_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(&server.uri(), "AIza-test");
    let err = provider.chat_model("gemini-1.5-pro").chat(&hello()).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Gemini API quota exceeded (429)"));
    assert!(message.contains("Resource has been exhausted"));
    assert!(!message.contains("AIza-test"));
    assert!(
        err.remediation()
            .unwrap()
            .contains("https://ai.google.dev/gemini-api/docs/rate-limits")
    );
}

#[tokio::test]
async fn deepseek_never_sends_image_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer ds-key"))
        .and(body_partial_json(json!({"max_tokens": 5000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("Hi from DeepSeek")))
        .mount(&server)
        .await;

    let image = ContentBlock::Image {
        name: "photo.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        data: "/9j/4AAQSkZJRg==".to_string(),
    };
    let request = ChatRequest::with_prompt(std::iter::empty(), ChatPayload::with_images("what is it?", vec![image]));

    let provider = DeepSeekProvider::new(&server.uri(), "ds-key").unwrap();
    let reply = provider.chat_model("deepseek-chat").chat(&request).await.unwrap();
    assert_eq!(reply.get_text(), "Hi from DeepSeek");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let raw = body.to_string();
    assert!(!raw.contains("/9j/4AAQSkZJRg=="));
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("photo.jpg"));
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    // Port 9 (discard) on localhost is almost never listening
    let provider = OpenAIProvider::new("http://127.0.0.1:9", "sk-test").unwrap();
    let err = provider.chat_model("gpt-4o").chat(&hello()).await.unwrap_err();
    assert!(matches!(
        err,
        LlmError::Network {
            provider: ProviderKind::OpenAI,
            ..
        }
    ));
}
