use crate::client::Client;
use crate::{ChatModel, LlmError, ModelProvider, ProviderKind};
use reqwest::header::HeaderValue;
use std::sync::Arc;

use super::chat::ClaudeChatModel;

#[derive(Clone)]
pub struct ClaudeProvider {
    client: Client,
    base_url: String,
    api_key: HeaderValue,
}

impl ClaudeProvider {
    pub fn default(api_key: &str) -> Result<Self, LlmError> {
        Self::new("https://api.anthropic.com", api_key)
    }

    pub fn new(base_url: &str, api_key: &str) -> Result<Self, LlmError> {
        let mut key = HeaderValue::from_str(api_key).map_err(|_| LlmError::InvalidApiKey {
            provider: ProviderKind::Claude,
        })?;
        key.set_sensitive(true);

        Ok(ClaudeProvider {
            client: Client::new(ProviderKind::Claude),
            base_url: format!("{}/v1", base_url.trim_end_matches('/')),
            api_key: key,
        })
    }

    pub fn chat_model(&self, model_name: &str) -> ClaudeChatModel {
        ClaudeChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            self.api_key.clone(),
            model_name.to_string(),
        )
    }
}

impl ModelProvider for ClaudeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn create_chat_model(&self, model_name: &str) -> Arc<dyn ChatModel + Send + Sync> {
        Arc::new(self.chat_model(model_name))
    }
}
