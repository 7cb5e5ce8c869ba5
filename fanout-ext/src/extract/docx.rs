//! Plain text from `.docx` files, read from the `word/document.xml` part of the OOXML zip.

use crate::ExtractionError;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use std::fmt::Display;
use std::io::{Cursor, Read};
use zip::ZipArchive;
use zip::result::ZipError;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if !bytes.starts_with(b"PK\x03\x04") {
        return Err(ExtractionError::Unsupported(
            "legacy binary Word document".to_string(),
        ));
    }

    let xml = read_document_part(bytes)?;
    document_text(&xml)
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Failed(format!("corrupt zip archive: {}", e)))?;
    let mut part = match archive.by_name(DOCUMENT_PART) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => {
            return Err(ExtractionError::Failed(format!("missing {}", DOCUMENT_PART)));
        }
        Err(e) => return Err(ExtractionError::Failed(e.to_string())),
    };

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Failed(format!("{}: {}", DOCUMENT_PART, e)))?;
    Ok(xml)
}

fn xml_error(e: impl Display) -> ExtractionError {
    ExtractionError::Failed(format!("{}: {}", DOCUMENT_PART, e))
}

/// Walk the body in document order. Only `w:t` runs carry text; `w:tab`
/// inside `w:tabs` is a tab stop definition, not a tab character.
fn document_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    let mut in_tab_stops = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:tabs" => in_tab_stops = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:tabs" => in_tab_stops = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if !in_tab_stops => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => out.push_str(&e.decode().map_err(xml_error)?),
            Event::GeneralRef(e) if in_text => match e.resolve_char_ref().map_err(xml_error)? {
                Some(c) => out.push(c),
                None => {
                    let name = e.decode().map_err(xml_error)?;
                    match resolve_predefined_entity(&name) {
                        Some(resolved) => out.push_str(resolved),
                        // Undeclared entity, keep it verbatim
                        None => {
                            out.push('&');
                            out.push_str(&name);
                            out.push(';');
                        }
                    }
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn docx(entries: &[(&str, &str)], method: CompressionMethod) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(method);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            paragraphs
        )
    }

    const PARAGRAPHS: &str = r#"<w:p><w:r><w:t>Quarterly</w:t></w:r><w:r><w:t xml:space="preserve"> report</w:t></w:r></w:p><w:p><w:r><w:t>A</w:t><w:tab/><w:t>B &amp; C</w:t></w:r></w:p>"#;

    #[test]
    fn test_deflated_document() {
        let zip = docx(
            &[
                ("[Content_Types].xml", "<Types/>"),
                ("word/document.xml", &body(PARAGRAPHS)),
            ],
            CompressionMethod::Deflated,
        );
        assert_eq!(extract_docx_text(&zip).unwrap(), "Quarterly report\nA\tB & C");
    }

    #[test]
    fn test_stored_document() {
        let zip = docx(&[("word/document.xml", &body(PARAGRAPHS))], CompressionMethod::Stored);
        assert_eq!(extract_docx_text(&zip).unwrap(), "Quarterly report\nA\tB & C");
    }

    #[test]
    fn test_character_references_and_attributed_breaks() {
        let xml = body(
            r#"<w:p><w:r><w:t xml:space="preserve">Caf&#233; &#x2014; done</w:t><w:br w:type="page"/><w:t>Next</w:t></w:r></w:p>"#,
        );
        let zip = docx(&[("word/document.xml", &xml)], CompressionMethod::Deflated);
        assert_eq!(extract_docx_text(&zip).unwrap(), "Café — done\nNext");
    }

    #[test]
    fn test_tab_stops_and_field_codes_skipped() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:instrText> PAGE </w:instrText></w:r><w:r><w:t>Left</w:t><w:tab w:val="x"/><w:t>Right</w:t><w:cr/><w:t>Below</w:t></w:r></w:p>"#,
        );
        let zip = docx(&[("word/document.xml", &xml)], CompressionMethod::Deflated);
        assert_eq!(extract_docx_text(&zip).unwrap(), "Left\tRight\nBelow");
    }

    #[test]
    fn test_missing_part() {
        let zip = docx(&[("xl/workbook.xml", "<workbook/>")], CompressionMethod::Stored);
        assert_eq!(
            extract_docx_text(&zip),
            Err(ExtractionError::Failed("missing word/document.xml".to_string()))
        );
    }

    #[test]
    fn test_legacy_doc_unsupported() {
        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        assert!(matches!(extract_docx_text(&ole), Err(ExtractionError::Unsupported(_))));
    }

    #[test]
    fn test_truncated_zip() {
        let zip = docx(&[("word/document.xml", &body(PARAGRAPHS))], CompressionMethod::Deflated);
        let truncated = &zip[..zip.len() / 2];
        assert!(matches!(extract_docx_text(truncated), Err(ExtractionError::Failed(_))));
    }
}
