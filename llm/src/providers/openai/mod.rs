pub(crate) mod chat;
mod provider;

pub use chat::OpenAIChatModel;
pub use provider::OpenAIProvider;
pub(crate) use provider::bearer_header;
