use super::api::{ANTHROPIC_VERSION, MessagesRequest};
use crate::client::Client;
use crate::{ChatMessage, ChatModel, ChatRequest, LlmError, PreparedRequest, ProviderKind};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

pub struct ClaudeChatModel {
    client: Client,
    base_url: String,
    api_key: HeaderValue,
    model_name: String,
}

impl ClaudeChatModel {
    pub(crate) fn new(client: Client, base_url: String, api_key: HeaderValue, model_name: String) -> Self {
        ClaudeChatModel {
            client,
            base_url,
            api_key,
            model_name,
        }
    }

    pub fn build_request(&self, request: &ChatRequest) -> Result<PreparedRequest, LlmError> {
        let api_request = MessagesRequest::from_request(&self.model_name, request);
        let body = serde_json::to_value(&api_request).map_err(|source| LlmError::Serialization {
            provider: ProviderKind::Claude,
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", self.api_key.clone());
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));

        Ok(PreparedRequest {
            url: format!("{}/messages", self.base_url),
            headers,
            body,
        })
    }
}

#[async_trait]
impl ChatModel for ClaudeChatModel {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage, LlmError> {
        let prepared = self.build_request(request)?;
        self.client.chat(&self.model_name, &prepared).await
    }
}
