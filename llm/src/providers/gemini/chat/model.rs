use super::api::{GenerateContentRequest, GenerationConfig};
use crate::client::Client;
use crate::{ChatMessage, ChatModel, ChatRequest, LlmError, PreparedRequest, ProviderKind};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

pub struct GeminiChatModel {
    client: Client,
    base_url: String,
    api_key: String,
    model_name: String,
    generation_config: GenerationConfig,
}

impl GeminiChatModel {
    pub(crate) fn new(
        client: Client,
        base_url: String,
        api_key: String,
        model_name: String,
        generation_config: GenerationConfig,
    ) -> Self {
        GeminiChatModel {
            client,
            base_url,
            api_key,
            model_name,
            generation_config,
        }
    }

    /// The key travels as a `key` query parameter on the per-model endpoint.
    fn endpoint(&self) -> Result<Url, LlmError> {
        let raw = format!("{}/models/{}:generateContent", self.base_url, self.model_name);
        let mut url = Url::parse(&raw).map_err(|_| LlmError::InvalidBaseUrl {
            provider: ProviderKind::Gemini,
            url: self.base_url.clone(),
        })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    pub fn build_request(&self, request: &ChatRequest) -> Result<PreparedRequest, LlmError> {
        let api_request = GenerateContentRequest::from_request(request, &self.generation_config);
        let body = serde_json::to_value(&api_request).map_err(|source| LlmError::Serialization {
            provider: ProviderKind::Gemini,
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(PreparedRequest {
            url: self.endpoint()?.to_string(),
            headers,
            body,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
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
    use crate::{ChatMessage, ChatRequest, GeminiProvider, LlmError, ProviderKind};

    #[test]
    fn test_key_in_query_not_headers() {
        let prepared = GeminiProvider::default("AIza-test")
            .chat_model("gemini-1.5-pro")
            .build_request(&ChatRequest::new(&[ChatMessage::user("hi".into())]))
            .unwrap();

        assert_eq!(
            prepared.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent?key=AIza-test"
        );
        assert_eq!(
            prepared.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert!(prepared.header("authorization").is_none());
        assert!(prepared.header("x-goog-api-key").is_none());
    }

    #[test]
    fn test_unparseable_base_url() {
        let err = GeminiProvider::new("not a url", "k")
            .chat_model("gemini-1.5-pro")
            .build_request(&ChatRequest::new(&[ChatMessage::user("hi".into())]))
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidBaseUrl { provider: ProviderKind::Gemini, .. }));
    }
}
