use crate::client::Client;
use crate::providers::openai::bearer_header;
use crate::{ChatModel, LlmError, ModelProvider, ProviderKind};
use reqwest::header::HeaderValue;
use std::sync::Arc;

use super::chat::DeepSeekChatModel;

#[derive(Clone)]
pub struct DeepSeekProvider {
    client: Client,
    base_url: String,
    auth: HeaderValue,
}

impl DeepSeekProvider {
    pub fn default(api_key: &str) -> Result<Self, LlmError> {
        Self::new("https://api.deepseek.com", api_key)
    }

    pub fn new(base_url: &str, api_key: &str) -> Result<Self, LlmError> {
        Ok(DeepSeekProvider {
            client: Client::new(ProviderKind::DeepSeek),
            base_url: format!("{}/v1", base_url.trim_end_matches('/')),
            auth: bearer_header(ProviderKind::DeepSeek, api_key)?,
        })
    }

    pub fn chat_model(&self, model_name: &str) -> DeepSeekChatModel {
        DeepSeekChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            self.auth.clone(),
            model_name.to_string(),
        )
    }
}

impl ModelProvider for DeepSeekProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DeepSeek
    }

    fn create_chat_model(&self, model_name: &str) -> Arc<dyn ChatModel + Send + Sync> {
        Arc::new(self.chat_model(model_name))
    }
}
