//! Per-format text extraction for uploaded documents (PDF, DOCX, TXT).
//!
//! Each extractor returns the raw text plus a unit count (pages, paragraphs,
//! or lines). Errors are typed and never panic; the corpus assembler catches
//! them per file and keeps processing the rest of the batch.

use std::io::Read;

use crate::models::{DeclaredType, ExtractionResult};

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extraction error. The assembler maps any of these to the `("", 0)`
/// failure result and a non-fatal warning.
#[derive(Debug)]
pub enum ExtractError {
    Pdf(String),
    Docx(String),
    Utf8(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Docx(e) => write!(f, "DOCX extraction failed: {}", e),
            ExtractError::Utf8(e) => write!(f, "TXT decoding failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract text and a unit count from raw file bytes, by declared type.
pub fn extract(bytes: &[u8], declared_type: DeclaredType) -> Result<ExtractionResult, ExtractError> {
    match declared_type {
        DeclaredType::Pdf => extract_pdf(bytes),
        DeclaredType::Docx => extract_docx(bytes),
        DeclaredType::Txt => extract_txt(bytes),
    }
}

/// Whole-document text via pdf-extract; page count via lopdf.
/// A page with no extractable text contributes nothing to the text but
/// still counts toward the page count.
fn extract_pdf(bytes: &[u8]) -> Result<ExtractionResult, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let pages = doc.get_pages().len();
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(ExtractionResult::new(text, pages))
}

/// Paragraph texts from `word/document.xml`, one line break per paragraph;
/// unit count is the paragraph count.
fn extract_docx(bytes: &[u8]) -> Result<ExtractionResult, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| ExtractError::Docx(e.to_string()))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(ExtractError::Docx(
                "word/document.xml exceeds size limit".to_string(),
            ));
        }
    }

    extract_paragraphs(&doc_xml)
}

/// Walk the WordprocessingML body: `<w:t>` runs concatenate into the current
/// paragraph, each `</w:p>` closes it with a line break.
fn extract_paragraphs(xml: &[u8]) -> Result<ExtractionResult, ExtractError> {
    let mut out = String::new();
    let mut paragraphs = 0usize;
    let mut in_text = false;

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => paragraphs += 1,
                b"t" => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_text => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Docx(e.to_string()))?;
                out.push_str(text.as_ref());
            }
            // Self-closing <w:p/> is an empty paragraph: counts, emits a blank line.
            Ok(quick_xml::events::Event::Empty(e)) if e.local_name().as_ref() == b"p" => {
                paragraphs += 1;
                out.push('\n');
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(ExtractionResult::new(out, paragraphs))
}

/// UTF-8 decode; unit count is the number of lines (a non-empty file with
/// no line break reports 1, an empty file reports 0).
fn extract_txt(bytes: &[u8]) -> Result<ExtractionResult, ExtractError> {
    let text = String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Utf8(e.to_string()))?;
    let lines = text.lines().count();
    Ok(ExtractionResult::new(text, lines))
}
