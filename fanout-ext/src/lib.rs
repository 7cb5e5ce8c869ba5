//! Attachment handling for Fanout: validation, media dispatch and document text extraction.

pub mod attachments;
pub mod error;
pub mod extract;
pub mod format;
pub mod mime;
pub mod set;

pub use attachments::{
    Attachment, AttachmentContent, AttachmentId, AttachmentProcessor, ExtractionStatus, RawFile,
};
pub use error::{AttachmentError, ExtractionError};
pub use extract::{DefaultExtractor, DocumentExtractor, DocumentKind};
pub use format::format_file_size;
pub use mime::AttachmentKind;
pub use set::{AttachmentSet, BatchOutcome, MAX_ATTACHMENTS, MAX_FILE_SIZE, validate_file};
