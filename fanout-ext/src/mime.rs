//! Media type allowlist, inference and dispatch.

use std::path::Path;

/// Declared types accepted in addition to any `image/*`.
const ALLOWED_TYPES: &[&str] = &[
    "text/plain",
    "text/csv",
    "text/html",
    "text/css",
    "text/javascript",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "video/mp4",
    "video/avi",
    "video/mov",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
];

pub const OCTET_STREAM: &str = "application/octet-stream";

pub fn is_allowed(mime_type: &str) -> bool {
    let mime = mime_type.to_ascii_lowercase();
    mime.starts_with("image/") || ALLOWED_TYPES.contains(&mime.as_str())
}

/// Guess a media type from the filename extension.
pub fn infer_from_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "avi" => "video/avi",
        "mov" => "video/mov",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        _ => OCTET_STREAM,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    Text,
    Image,
    Pdf,
    Spreadsheet,
    Word,
    Audio,
    Video,
    Other,
}

impl AttachmentKind {
    /// Dispatch on the declared type, first match wins. Spreadsheets are
    /// checked before word-processor documents because the OOXML spreadsheet
    /// type also contains `document`.
    pub fn classify(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.starts_with("text/")
            || ["csv", "javascript", "css", "html"].iter().any(|t| mime.contains(t))
        {
            AttachmentKind::Text
        } else if mime.starts_with("image/") {
            AttachmentKind::Image
        } else if mime.contains("pdf") {
            AttachmentKind::Pdf
        } else if mime.contains("excel") || mime.contains("spreadsheet") {
            AttachmentKind::Spreadsheet
        } else if mime.contains("word") || mime.contains("document") {
            AttachmentKind::Word
        } else if mime.starts_with("video/") {
            AttachmentKind::Video
        } else if mime.starts_with("audio/") {
            AttachmentKind::Audio
        } else {
            AttachmentKind::Other
        }
    }

    /// Label used in placeholder headers, e.g. `[PDF file: report.pdf]`.
    pub fn label(self) -> &'static str {
        match self {
            AttachmentKind::Text => "Text",
            AttachmentKind::Image => "Image",
            AttachmentKind::Pdf => "PDF",
            AttachmentKind::Spreadsheet => "Spreadsheet",
            AttachmentKind::Word => "Word",
            AttachmentKind::Audio => "Audio",
            AttachmentKind::Video => "Video",
            AttachmentKind::Other => "",
        }
    }
}
