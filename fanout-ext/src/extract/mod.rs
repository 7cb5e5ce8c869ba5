//! Document text extraction for PDF, Word and spreadsheet attachments.

mod docx;
mod pdf;
mod spreadsheet;

pub use docx::extract_docx_text;
pub use pdf::extract_pdf_text;
pub use spreadsheet::{extract_spreadsheet_text, format_sheets};

use crate::ExtractionError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Spreadsheet,
}

/// Turns document bytes into plain text. Runs on a blocking thread.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError>;
}

/// Extractor backed by `pdf-extract`, `calamine` and a minimal OOXML reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultExtractor;

impl DocumentExtractor for DefaultExtractor {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
        let text = match kind {
            DocumentKind::Pdf => extract_pdf_text(bytes)?,
            DocumentKind::Word => extract_docx_text(bytes)?,
            DocumentKind::Spreadsheet => extract_spreadsheet_text(bytes)?,
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(text)
    }
}
