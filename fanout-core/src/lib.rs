//! Conversation store, concurrent provider dispatch and the chat session
//! that ties them to pending attachments.

pub mod dispatch;
pub mod error;
pub mod session;
pub mod store;

pub use dispatch::{
    DispatchCoordinator, DispatchOutcome, DispatchReport, compose_display, compose_outbound,
    error_turn,
};
pub use error::ValidationError;
pub use session::ChatSession;
pub use store::{ConversationStore, DEFAULT_HISTORY_LIMIT};
