//! PDF text extraction

use crate::ExtractionError;

/// Extract text page by page as `page N: <text>` blocks separated by blank lines.
/// Pages without text are skipped.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        .map_err(|e| ExtractionError::Failed(e.to_string()))?;

    Ok(format_pages(&pages))
}

fn format_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .filter_map(|(i, text)| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| format!("page {}: {}", i + 1, trimmed))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
