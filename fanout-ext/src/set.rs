use crate::attachments::{Attachment, AttachmentId, AttachmentProcessor, RawFile};
use crate::{AttachmentError, mime};
use futures::future::join_all;
use tracing::{debug, info};

/// Largest accepted file, 50 MiB.
pub const MAX_FILE_SIZE: u64 = 52_428_800;
/// Most attachments held at once.
pub const MAX_ATTACHMENTS: usize = 10;

/// Check size and media type of a single file.
pub fn validate_file(file: &RawFile) -> Result<(), AttachmentError> {
    let size = file.size();
    if size > MAX_FILE_SIZE {
        return Err(AttachmentError::FileTooLarge {
            name: file.name.clone(),
            size,
            limit: MAX_FILE_SIZE,
        });
    }

    let mime_type = file.effective_mime_type();
    if !mime::is_allowed(&mime_type) {
        return Err(AttachmentError::UnsupportedType {
            name: file.name.clone(),
            mime_type,
        });
    }
    Ok(())
}

/// Result of an upload batch: accepted attachments and the files skipped
/// for their own size or type problems.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<AttachmentId>,
    pub rejected: Vec<(String, AttachmentError)>,
}

/// Attachments waiting to be sent, in upload order.
#[derive(Debug, Default)]
pub struct AttachmentSet {
    items: Vec<Attachment>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every file on its own, then accept the valid remainder as a
    /// whole. If the remainder would push the set past the limit nothing is
    /// added.
    pub async fn add_batch(
        &mut self,
        processor: &AttachmentProcessor,
        files: Vec<RawFile>,
    ) -> Result<BatchOutcome, AttachmentError> {
        let mut outcome = BatchOutcome::default();
        let mut valid = Vec::with_capacity(files.len());
        for file in files {
            match validate_file(&file) {
                Ok(()) => valid.push(file),
                Err(e) => {
                    debug!(name = %file.name, error = %e, "Skipping attachment");
                    outcome.rejected.push((file.name, e));
                }
            }
        }

        if self.items.len() + valid.len() > MAX_ATTACHMENTS {
            return Err(AttachmentError::TooManyAttachments {
                held: self.items.len(),
                incoming: valid.len(),
                max: MAX_ATTACHMENTS,
            });
        }

        let processed = join_all(valid.into_iter().map(|file| processor.process(file))).await;
        for attachment in processed {
            outcome.accepted.push(attachment.id.clone());
            self.items.push(attachment);
        }

        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            held = self.items.len(),
            "Processed upload batch"
        );
        Ok(outcome)
    }

    /// Add a single file, reporting its own validation error directly.
    pub async fn add(
        &mut self,
        processor: &AttachmentProcessor,
        file: RawFile,
    ) -> Result<AttachmentId, AttachmentError> {
        validate_file(&file)?;
        if self.items.len() >= MAX_ATTACHMENTS {
            return Err(AttachmentError::TooManyAttachments {
                held: self.items.len(),
                incoming: 1,
                max: MAX_ATTACHMENTS,
            });
        }

        let attachment = processor.process(file).await;
        let id = attachment.id.clone();
        self.items.push(attachment);
        Ok(id)
    }

    /// Ingest a pasted image, named `screenshot_<unix millis>.<subtype>`.
    /// An empty type is taken as PNG; anything outside `image/*` is refused.
    pub async fn paste_image(
        &mut self,
        processor: &AttachmentProcessor,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AttachmentId, AttachmentError> {
        let mime_type = if mime_type.is_empty() {
            "image/png".to_string()
        } else {
            mime_type.to_ascii_lowercase()
        };
        let timestamp = chrono::Utc::now().timestamp_millis();
        let Some(subtype) = mime_type
            .strip_prefix("image/")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
        else {
            return Err(AttachmentError::UnsupportedType {
                name: format!("screenshot_{}", timestamp),
                mime_type,
            });
        };
        let name = format!("screenshot_{}.{}", timestamp, subtype);
        self.add(processor, RawFile::new(name, mime_type.as_str(), bytes)).await
    }

    pub fn remove(&mut self, id: &AttachmentId) -> Result<Attachment, AttachmentError> {
        let index = self
            .items
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| AttachmentError::NotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: &AttachmentId) -> Option<&Attachment> {
        self.items.iter().find(|a| &a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
