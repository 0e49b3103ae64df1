//! Resume text extraction from uploaded documents.
//!
//! PDFs are parsed with `pdf-extract`. DOCX files are unzipped and the text runs of
//! `word/document.xml` are collected paragraph by paragraph. Plain text is accepted as
//! UTF-8. Anything else is rejected up front by extension.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported resume format '{0}', expected .pdf, .docx or .txt")]
    Unsupported(String),

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("could not read DOCX: {0}")]
    Docx(String),

    #[error("resume is not valid UTF-8 text")]
    Encoding,

    #[error("no text could be extracted from the resume")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    PlainText,
}

impl ResumeFormat {
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(ResumeFormat::Pdf),
            "docx" => Ok(ResumeFormat::Docx),
            "txt" => Ok(ResumeFormat::PlainText),
            _ => Err(ExtractError::Unsupported(filename.to_string())),
        }
    }
}

/// Extracts text from `bytes` according to the file's extension.
/// CPU-bound for PDF and DOCX; callers on the async runtime should use `spawn_blocking`.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let text = match ResumeFormat::from_filename(filename)? {
        ResumeFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?,
        ResumeFormat::Docx => docx_text(bytes)?,
        ResumeFormat::PlainText => String::from_utf8(bytes.to_vec())
            .map_err(|_| ExtractError::Encoding)?,
    };

    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

const DOCX_BODY: &str = "word/document.xml";

/// One line per `<w:p>`, built from its `<w:t>` runs. Tabs and breaks are kept.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExtractError::Docx(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| ExtractError::Docx(e.to_string()))?
        {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let run = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                text.push_str(&run);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Trims each line, drops blank lines, and joins with '\n'.
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
