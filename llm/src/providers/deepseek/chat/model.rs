use super::api::from_request;
use crate::client::Client;
use crate::{ChatMessage, ChatModel, ChatRequest, LlmError, PreparedRequest, ProviderKind};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

pub struct DeepSeekChatModel {
    client: Client,
    base_url: String,
    auth: HeaderValue,
    model_name: String,
}

impl DeepSeekChatModel {
    pub(crate) fn new(client: Client, base_url: String, auth: HeaderValue, model_name: String) -> Self {
        DeepSeekChatModel {
            client,
            base_url,
            auth,
            model_name,
        }
    }

    pub fn build_request(&self, request: &ChatRequest) -> Result<PreparedRequest, LlmError> {
        let body = serde_json::to_value(from_request(&self.model_name, request)).map_err(|source| {
            LlmError::Serialization {
                provider: ProviderKind::DeepSeek,
                source,
            }
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
impl ChatModel for DeepSeekChatModel {
    fn provider(&self) -> ProviderKind {
        ProviderKind::DeepSeek
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage, LlmError> {
        let prepared = self.build_request(request)?;
        self.client.chat(&self.model_name, &prepared).await
    }
}
