pub(crate) mod claude;
pub(crate) mod deepseek;
pub(crate) mod gemini;
pub(crate) mod openai;

pub use claude::{ClaudeChatModel, ClaudeProvider};
pub use deepseek::{DeepSeekChatModel, DeepSeekProvider};
pub use gemini::{GeminiChatModel, GeminiProvider, GenerationConfig};
pub use openai::{OpenAIChatModel, OpenAIProvider};

use crate::{ChatModel, LlmError, ModelProvider};
use config::Settings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    DeepSeek,
    Gemini,
    Claude,
}

impl ProviderKind {
    /// Every provider, in the order results are presented.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAI,
        ProviderKind::DeepSeek,
        ProviderKind::Gemini,
        ProviderKind::Claude,
    ];

    /// Stable lowercase identifier used in settings files and CLI flags.
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Claude => "claude",
        }
    }

    pub fn api_key_env_vars(self) -> &'static [&'static str] {
        match self {
            ProviderKind::OpenAI => &["OPENAI_API_KEY"],
            ProviderKind::DeepSeek => &["DEEPSEEK_API_KEY"],
            ProviderKind::Gemini => &["GEMINI_API_KEY"],
            ProviderKind::Claude => &["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"],
        }
    }

    pub fn base_url_env_var(self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_BASE_URL",
            ProviderKind::DeepSeek => "DEEPSEEK_BASE_URL",
            ProviderKind::Gemini => "GEMINI_BASE_URL",
            ProviderKind::Claude => "CLAUDE_BASE_URL",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4o",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::Gemini => "gemini-1.5-pro",
            ProviderKind::Claude => "claude-sonnet-4-5-20250929",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Claude => "Claude",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Extract the reply text from a provider's response body.
///
/// Each provider nests the text differently; a body without the expected
/// field is a [`LlmError::ResponseFormat`].
pub fn parse_response(provider: ProviderKind, body: &serde_json::Value) -> Result<String, LlmError> {
    match provider {
        ProviderKind::OpenAI | ProviderKind::DeepSeek => openai::chat::api::parse_response(provider, body),
        ProviderKind::Gemini => gemini::chat::api::parse_response(body),
        ProviderKind::Claude => claude::chat::api::parse_response(body),
    }
}

pub enum GeneralModelProvider {
    OpenAI(OpenAIProvider),
    DeepSeek(DeepSeekProvider),
    Gemini(GeminiProvider),
    Claude(ClaudeProvider),
}

impl GeneralModelProvider {
    /// Build a provider for `kind`, using `base_url` when given instead of the public endpoint.
    pub fn new(kind: ProviderKind, base_url: Option<&str>, api_key: &str) -> Result<Self, LlmError> {
        Ok(match (kind, base_url) {
            (ProviderKind::OpenAI, Some(url)) => Self::OpenAI(OpenAIProvider::new(url, api_key)?),
            (ProviderKind::OpenAI, None) => Self::OpenAI(OpenAIProvider::default(api_key)?),
            (ProviderKind::DeepSeek, Some(url)) => Self::DeepSeek(DeepSeekProvider::new(url, api_key)?),
            (ProviderKind::DeepSeek, None) => Self::DeepSeek(DeepSeekProvider::default(api_key)?),
            (ProviderKind::Gemini, Some(url)) => Self::Gemini(GeminiProvider::new(url, api_key)),
            (ProviderKind::Gemini, None) => Self::Gemini(GeminiProvider::default(api_key)),
            (ProviderKind::Claude, Some(url)) => Self::Claude(ClaudeProvider::new(url, api_key)?),
            (ProviderKind::Claude, None) => Self::Claude(ClaudeProvider::default(api_key)?),
        })
    }

    /// Build a provider from the API key and base URL found in settings or the environment.
    pub fn from_settings(kind: ProviderKind, settings: &Settings) -> Result<Self, LlmError> {
        let api_key = settings
            .api_key(kind.id(), kind.api_key_env_vars())
            .ok_or(LlmError::MissingApiKey { provider: kind })?;
        let base_url = settings.base_url(kind.id(), kind.base_url_env_var());
        Self::new(kind, base_url.as_deref(), &api_key)
    }

    /// The model configured in settings for this provider, or its default.
    pub fn model_from_settings(&self, settings: &Settings) -> Arc<dyn ChatModel + Send + Sync> {
        let kind = self.kind();
        self.create_chat_model(settings.model_or(kind.id(), kind.default_model()))
    }
}

impl ModelProvider for GeneralModelProvider {
    fn kind(&self) -> ProviderKind {
        match self {
            Self::OpenAI(p) => p.kind(),
            Self::DeepSeek(p) => p.kind(),
            Self::Gemini(p) => p.kind(),
            Self::Claude(p) => p.kind(),
        }
    }

    fn create_chat_model(&self, model_name: &str) -> Arc<dyn ChatModel + Send + Sync> {
        match self {
            Self::OpenAI(p) => p.create_chat_model(model_name),
            Self::DeepSeek(p) => p.create_chat_model(model_name),
            Self::Gemini(p) => p.create_chat_model(model_name),
            Self::Claude(p) => p.create_chat_model(model_name),
        }
    }
}
