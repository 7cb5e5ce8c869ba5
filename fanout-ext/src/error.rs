use thiserror::Error;

/// Reasons a file is refused before it becomes an attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("file {name} exceeds the {limit}-byte limit ({size} bytes)")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("at most {max} files can be attached ({held} held, {incoming} more requested)")]
    TooManyAttachments {
        held: usize,
        incoming: usize,
        max: usize,
    },

    #[error("unsupported file type: {name} ({mime_type})")]
    UnsupportedType { name: String, mime_type: String },

    #[error("no attachment with id {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Document text extraction failures. These never reach callers of the
/// processor; they are folded into placeholder content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no extractor is available for {0}")]
    Unavailable(String),

    #[error("unsupported document format: {0}")]
    Unsupported(String),

    #[error("extraction failed: {0}")]
    Failed(String),

    #[error("document contains no extractable text")]
    Empty,
}
