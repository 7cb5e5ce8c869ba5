use super::api::ChatCompletionRequest;
use crate::client::Client;
use crate::{ChatMessage, ChatModel, ChatRequest, LlmError, PreparedRequest, ProviderKind};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

pub struct OpenAIChatModel {
    client: Client,
    base_url: String,
    auth: HeaderValue,
    model_name: String,
}

impl OpenAIChatModel {
    pub(crate) fn new(client: Client, base_url: String, auth: HeaderValue, model_name: String) -> Self {
        OpenAIChatModel {
            client,
            base_url,
            auth,
            model_name,
        }
    }

    /// Build the HTTP call for `request` without sending it.
    pub fn build_request(&self, request: &ChatRequest) -> Result<PreparedRequest, LlmError> {
        let api_request = ChatCompletionRequest::from_request(&self.model_name, request);
        let body = serde_json::to_value(&api_request).map_err(|source| LlmError::Serialization {
            provider: ProviderKind::OpenAI,
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth.clone());

        Ok(PreparedRequest {
            url: format!("{}/chat/completions", self.base_url),
            headers,
            body,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage, LlmError> {
        let prepared = self.build_request(request)?;
        self.client.chat(&self.model_name, &prepared).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpenAIProvider;

    #[test]
    fn test_request_targets_chat_completions_with_bearer() {
        let provider = OpenAIProvider::new("https://proxy.example/", "sk-test").unwrap();
        let prepared = provider
            .chat_model("gpt-4o")
            .build_request(&ChatRequest::new(&[ChatMessage::user("hi".into())]))
            .unwrap();

        assert_eq!(prepared.url, "https://proxy.example/v1/chat/completions");
        assert_eq!(prepared.header("authorization"), Some("Bearer sk-test"));
        assert_eq!(prepared.header("content-type"), Some("application/json"));
        assert_eq!(prepared.body["model"], "gpt-4o");
    }

    #[test]
    fn test_invalid_key_rejected() {
        let err = OpenAIProvider::new("https://api.openai.com", "bad\nkey").err().unwrap();
        assert!(matches!(err, LlmError::InvalidApiKey { provider: ProviderKind::OpenAI }));
    }
}
