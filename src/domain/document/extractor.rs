use super::error::ExtractionError;
use lopdf::Document;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Serialize;
use std::io::{Cursor, Read};

const UTF8_BOM: &str = "\u{feff}";
const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    WordProcessor,
    /// Binary `.doc`, recognised but not readable
    LegacyWord,
}

impl DocumentKind {
    /// Resolve the kind from the declared content type, falling back to the
    /// file extension. Unknown types are read as plain text.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Self {
        let declared = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_lowercase());

        match declared.as_deref() {
            Some("application/pdf") => return DocumentKind::Pdf,
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document") => {
                return DocumentKind::WordProcessor
            }
            Some("application/msword") => return DocumentKind::LegacyWord,
            Some(ct) if ct.starts_with("text/") => return DocumentKind::PlainText,
            _ => {}
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => DocumentKind::Pdf,
            "docx" => DocumentKind::WordProcessor,
            "doc" => DocumentKind::LegacyWord,
            _ => DocumentKind::PlainText,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::PlainText => write!(f, "plain text"),
            DocumentKind::Pdf => write!(f, "PDF"),
            DocumentKind::WordProcessor => write!(f, "word-processor document"),
            DocumentKind::LegacyWord => write!(f, "legacy Word document"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractedDocument {
    /// File name without its extension, suggested as the scene title
    pub title: String,
    pub text: String,
}

/// Extract plain text from an uploaded script file.
pub fn extract_text(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<ExtractedDocument, ExtractionError> {
    let kind = DocumentKind::detect(file_name, content_type);

    let text = match kind {
        DocumentKind::PlainText => decode_plain_text(bytes)?,
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::WordProcessor => extract_docx(bytes)?,
        DocumentKind::LegacyWord => return Err(ExtractionError::Unsupported(kind.to_string())),
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    tracing::debug!(
        file_name = file_name,
        kind = %kind,
        text_length = text.len(),
        "Document text extracted"
    );

    Ok(ExtractedDocument {
        title: title_from_file_name(file_name),
        text,
    })
}

fn decode_plain_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ExtractionError::Corrupt(format!("not valid UTF-8 text: {}", e)))?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let line_endings = Regex::new(r"\r\n?").map_err(|e| ExtractionError::Corrupt(e.to_string()))?;
    Ok(line_endings.replace_all(text, "\n").into_owned())
}

/// Text of every page, in page order.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| ExtractionError::Corrupt(format!("not a readable PDF: {}", e)))?;

    if document.is_encrypted() {
        return Err(ExtractionError::Corrupt("PDF is encrypted".to_string()));
    }

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    document
        .extract_text(&pages)
        .map_err(|e| ExtractionError::Corrupt(format!("PDF text could not be read: {}", e)))
}

/// Paragraph text of an Office Open XML document, one paragraph per line.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Corrupt(format!("not a readable DOCX: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExtractionError::Corrupt(format!("DOCX has no body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Corrupt(format!("DOCX body unreadable: {}", e)))?;

    let corrupt = |e: quick_xml::Error| ExtractionError::Corrupt(format!("DOCX body is not valid XML: {}", e));

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(corrupt)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" | b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => text.push_str(&t.unescape().map_err(corrupt)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn title_from_file_name(file_name: &str) -> String {
    match Regex::new(r"\.[^/.]+$") {
        Ok(extension) => extension.replace(file_name, "").trim().to_string(),
        Err(_) => file_name.trim().to_string(),
    }
}
