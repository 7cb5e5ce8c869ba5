use fanout_ext::AttachmentError;
use thiserror::Error;

/// Preconditions checked before any request leaves the process.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("select at least one provider")]
    NoProvidersSelected,

    #[error("enter a message or attach a file")]
    EmptyMessage,

    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
