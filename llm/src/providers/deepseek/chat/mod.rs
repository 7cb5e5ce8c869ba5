pub(crate) mod api;
mod model;

pub use model::DeepSeekChatModel;
