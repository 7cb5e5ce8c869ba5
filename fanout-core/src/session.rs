//! A chat session: pending attachments plus the coordinator that sends them.

use crate::dispatch::{DispatchCoordinator, DispatchReport};
use crate::ValidationError;
use fanout_ext::{
    Attachment, AttachmentId, AttachmentProcessor, AttachmentSet, BatchOutcome, RawFile,
};
use llm::{ChatMessage, ProviderKind};

/// Owns the attachments waiting to be sent and the coordinator that holds
/// every provider's history.
pub struct ChatSession {
    coordinator: DispatchCoordinator,
    processor: AttachmentProcessor,
    attachments: AttachmentSet,
}

impl ChatSession {
    pub fn new(coordinator: DispatchCoordinator) -> Self {
        Self::with_processor(coordinator, AttachmentProcessor::default())
    }

    pub fn with_processor(coordinator: DispatchCoordinator, processor: AttachmentProcessor) -> Self {
        Self {
            coordinator,
            processor,
            attachments: AttachmentSet::new(),
        }
    }

    pub fn coordinator(&self) -> &DispatchCoordinator {
        &self.coordinator
    }

    pub async fn upload(&mut self, files: Vec<RawFile>) -> Result<BatchOutcome, ValidationError> {
        Ok(self.attachments.add_batch(&self.processor, files).await?)
    }

    pub async fn paste_image(
        &mut self,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AttachmentId, ValidationError> {
        Ok(self
            .attachments
            .paste_image(&self.processor, mime_type, bytes)
            .await?)
    }

    pub fn remove_attachment(&mut self, id: &AttachmentId) -> Result<Attachment, ValidationError> {
        Ok(self.attachments.remove(id)?)
    }

    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.as_slice()
    }

    /// Dispatch `prompt` with the held attachments. Once the preconditions
    /// pass the attachments are consumed, whatever each provider returns.
    pub async fn send(
        &mut self,
        prompt: &str,
        selected: &[ProviderKind],
    ) -> Result<DispatchReport, ValidationError> {
        let report = self
            .coordinator
            .dispatch(prompt, self.attachments.as_slice(), selected)
            .await?;
        self.attachments.clear();
        Ok(report)
    }

    pub fn history(&self, provider: ProviderKind) -> Vec<ChatMessage> {
        self.coordinator.store().history(provider)
    }

    pub fn clear_history(&self, provider: ProviderKind) {
        self.coordinator.store().clear(provider);
    }

    /// Empty every history and drop all pending attachments.
    pub fn clear_all(&mut self) {
        self.coordinator.store().clear_all();
        self.attachments.clear();
    }
}
