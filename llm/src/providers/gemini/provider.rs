use crate::client::Client;
use crate::{ChatModel, ModelProvider, ProviderKind};
use std::sync::Arc;

use super::chat::GeminiChatModel;
use super::chat::api::GenerationConfig;

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    generation_config: GenerationConfig,
}

impl GeminiProvider {
    pub fn default(api_key: &str) -> Self {
        Self::new("https://generativelanguage.googleapis.com/v1beta", api_key)
    }

    /// `base_url` includes the API version; models live under `{base_url}/models`.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        GeminiProvider {
            client: Client::new(ProviderKind::Gemini),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            generation_config: GenerationConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, generation_config: GenerationConfig) -> Self {
        self.generation_config = generation_config;
        self
    }

    pub fn chat_model(&self, model_name: &str) -> GeminiChatModel {
        GeminiChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            self.api_key.clone(),
            model_name.to_string(),
            self.generation_config.clone(),
        )
    }
}

impl ModelProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn create_chat_model(&self, model_name: &str) -> Arc<dyn ChatModel + Send + Sync> {
        Arc::new(self.chat_model(model_name))
    }
}
