use crate::extract::{DefaultExtractor, DocumentExtractor, DocumentKind};
use crate::format::format_file_size;
use crate::mime::{self, AttachmentKind};
use crate::{AttachmentError, ExtractionError};
use base64::Engine;
use llm::ContentBlock;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A file as supplied by the user, before validation.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    /// Declared media type. Empty means unknown.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        RawFile {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its media type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| AttachmentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime::infer_from_name(&name).to_string();
        Ok(RawFile::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The declared type, or one inferred from the filename when none was declared.
    pub fn effective_mime_type(&self) -> String {
        if self.mime_type.trim().is_empty() {
            mime::infer_from_name(&self.name).to_string()
        } else {
            self.mime_type.trim().to_ascii_lowercase()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentId(String);

impl AttachmentId {
    pub fn new() -> Self {
        AttachmentId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttachmentId {
    fn from(id: &str) -> Self {
        AttachmentId(id.to_string())
    }
}

/// The one authoritative form of an attachment's content.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentContent {
    /// Verbatim text of a text file, or extracted document text with its header.
    Text(String),
    /// Base64 image data plus the description used in text-only contexts.
    Image { data: String, description: String },
    /// Descriptive text standing in for content that was not extracted.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    Success,
    /// Only a description was produced; extraction is not attempted for this kind.
    BestEffort,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub kind: AttachmentKind,
    pub content: AttachmentContent,
    pub extraction: ExtractionStatus,
}

impl Attachment {
    /// Text folded into the outbound message for this attachment.
    pub fn transcript(&self) -> &str {
        match &self.content {
            AttachmentContent::Text(text) | AttachmentContent::Placeholder(text) => text,
            AttachmentContent::Image { description, .. } => description,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.content, AttachmentContent::Image { .. })
    }

    /// Structured image block for providers that accept images.
    pub fn image_block(&self) -> Option<ContentBlock> {
        match &self.content {
            AttachmentContent::Image { data, .. } => Some(ContentBlock::Image {
                name: self.name.clone(),
                mime_type: self.mime_type.clone(),
                data: data.clone(),
            }),
            _ => None,
        }
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }
}

/// Turns raw files into attachments, extracting document text where possible.
#[derive(Clone)]
pub struct AttachmentProcessor {
    extractor: Arc<dyn DocumentExtractor>,
}

impl Default for AttachmentProcessor {
    fn default() -> Self {
        Self::new(Arc::new(DefaultExtractor))
    }
}

impl AttachmentProcessor {
    pub fn new(extractor: Arc<dyn DocumentExtractor>) -> Self {
        AttachmentProcessor { extractor }
    }

    /// Build the attachment for an already validated file. Extraction
    /// problems degrade to placeholder content and never fail the call.
    pub async fn process(&self, file: RawFile) -> Attachment {
        let mime_type = file.effective_mime_type();
        let kind = AttachmentKind::classify(&mime_type);
        let size = file.size();
        let header = Header {
            kind,
            name: &file.name,
            mime_type: &mime_type,
            size,
        };

        let (content, extraction) = match kind {
            AttachmentKind::Text => (
                AttachmentContent::Text(String::from_utf8_lossy(&file.bytes).into_owned()),
                ExtractionStatus::Success,
            ),
            AttachmentKind::Image => (
                AttachmentContent::Image {
                    data: base64::engine::general_purpose::STANDARD.encode(&file.bytes),
                    description: format!(
                        "{}\nThis is an image file; please analyze it based on the image content.",
                        header
                    ),
                },
                ExtractionStatus::Success,
            ),
            AttachmentKind::Pdf => self.extract(&header, &file.bytes, DocumentKind::Pdf).await,
            AttachmentKind::Word => self.extract(&header, &file.bytes, DocumentKind::Word).await,
            AttachmentKind::Spreadsheet => {
                self.extract(&header, &file.bytes, DocumentKind::Spreadsheet).await
            }
            AttachmentKind::Audio | AttachmentKind::Video => {
                let noun = if kind == AttachmentKind::Audio { "an audio" } else { "a video" };
                (
                    AttachmentContent::Placeholder(format!(
                        "{}\nThis is {} file; please analyze it based on the media content.",
                        header, noun
                    )),
                    ExtractionStatus::BestEffort,
                )
            }
            AttachmentKind::Other => (
                AttachmentContent::Placeholder(header.to_string()),
                ExtractionStatus::BestEffort,
            ),
        };

        debug!(name = %file.name, mime_type, ?kind, ?extraction, "Processed attachment");

        Attachment {
            id: AttachmentId::new(),
            name: file.name,
            mime_type,
            size,
            kind,
            content,
            extraction,
        }
    }

    async fn extract(
        &self,
        header: &Header<'_>,
        bytes: &[u8],
        kind: DocumentKind,
    ) -> (AttachmentContent, ExtractionStatus) {
        let extractor = Arc::clone(&self.extractor);
        let owned = bytes.to_vec();

        // Extraction libraries are synchronous and may panic on malformed input
        let result = tokio::task::spawn_blocking(move || extractor.extract(&owned, kind))
            .await
            .unwrap_or_else(|e| Err(ExtractionError::Failed(format!("extractor panicked: {}", e))));

        let (content_label, failure_note) = match kind {
            DocumentKind::Spreadsheet => (
                "Spreadsheet content",
                "Note: the spreadsheet content could not be read directly. Please copy the table data manually for analysis.",
            ),
            DocumentKind::Pdf => (
                "Document content",
                "Note: the PDF content could not be read directly. Please copy the document text manually for analysis.",
            ),
            DocumentKind::Word => (
                "Document content",
                "Note: the Word document content could not be read directly. Please copy the document text manually for analysis.",
            ),
        };

        match result {
            Ok(text) => (
                AttachmentContent::Text(format!("{}\n\n{}:\n{}", header, content_label, text)),
                ExtractionStatus::Success,
            ),
            Err(e) => {
                warn!(name = header.name, error = %e, "Document extraction failed, using placeholder");
                (
                    AttachmentContent::Placeholder(format!("{}\n\n{}", header, failure_note)),
                    ExtractionStatus::Failed(e.to_string()),
                )
            }
        }
    }
}

/// `[<Kind> file: name]` followed by type and size lines.
struct Header<'a> {
    kind: AttachmentKind,
    name: &'a str,
    mime_type: &'a str,
    size: u64,
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AttachmentKind::Other => write!(f, "[File: {}]", self.name)?,
            kind => write!(f, "[{} file: {}]", kind.label(), self.name)?,
        }
        write!(
            f,
            "\nFile type: {}\nFile size: {}",
            self.mime_type,
            format_file_size(self.size)
        )
    }
}
