use crate::client::Client;
use crate::{ChatModel, LlmError, ModelProvider, ProviderKind};
use reqwest::header::HeaderValue;
use std::sync::Arc;

use super::chat::OpenAIChatModel;

/// `Authorization: Bearer <key>`, marked sensitive so it never shows in debug output.
pub(crate) fn bearer_header(provider: ProviderKind, api_key: &str) -> Result<HeaderValue, LlmError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|_| LlmError::InvalidApiKey { provider })?;
    value.set_sensitive(true);
    Ok(value)
}

#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    auth: HeaderValue,
}

impl OpenAIProvider {
    pub fn default(api_key: &str) -> Result<Self, LlmError> {
        Self::new("https://api.openai.com", api_key)
    }

    /// `base_url` is the service root; the `/v1` API prefix is appended.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, LlmError> {
        Ok(OpenAIProvider {
            client: Client::new(ProviderKind::OpenAI),
            base_url: format!("{}/v1", base_url.trim_end_matches('/')),
            auth: bearer_header(ProviderKind::OpenAI, api_key)?,
        })
    }

    pub fn chat_model(&self, model_name: &str) -> OpenAIChatModel {
        OpenAIChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            self.auth.clone(),
            model_name.to_string(),
        )
    }
}

impl ModelProvider for OpenAIProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn create_chat_model(&self, model_name: &str) -> Arc<dyn ChatModel + Send + Sync> {
        Arc::new(self.chat_model(model_name))
    }
}
