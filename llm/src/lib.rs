use async_trait::async_trait;
use std::sync::Arc;

pub mod api;
mod client;
pub mod error;
pub mod providers;
pub mod traffic_log;

pub use api::*;
pub use client::PreparedRequest;
pub use error::{LlmError, TransportErrorKind};
pub use providers::{
    ClaudeChatModel, ClaudeProvider, DeepSeekChatModel, DeepSeekProvider, GeminiChatModel,
    GeminiProvider, GeneralModelProvider, GenerationConfig, OpenAIChatModel, OpenAIProvider,
    ProviderKind, UnknownProvider, parse_response,
};

#[async_trait]
pub trait ChatModel {
    /// Which provider serves this model
    fn provider(&self) -> ProviderKind;

    fn name(&self) -> &str;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage, LlmError>;
}

// Blanket implementation for Arc<dyn ChatModel> to make it easier to work with
#[async_trait]
impl ChatModel for Arc<dyn ChatModel + Send + Sync> {
    fn provider(&self) -> ProviderKind {
        (**self).provider()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage, LlmError> {
        (**self).chat(request).await
    }
}

pub trait ModelProvider {
    fn kind(&self) -> ProviderKind;

    /// Create a chat model by name, returned as Arc for sharing across tasks
    fn create_chat_model(&self, model_name: &str) -> Arc<dyn ChatModel + Send + Sync>;
}
