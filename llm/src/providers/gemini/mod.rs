pub(crate) mod chat;
mod provider;

pub use chat::GeminiChatModel;
pub use chat::api::GenerationConfig;
pub use provider::GeminiProvider;
