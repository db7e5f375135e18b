use std::io::Cursor;
use std::path::Path;

use crate::error::ParseError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Xlsx,
    Xls,
    PlainText,
}

impl DocumentFormat {
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Xls => "xls",
            DocumentFormat::PlainText => "txt",
        }
    }
}

/// Pick the extraction path: extension first, content sniffing when there is no extension.
pub fn detect_format(filename: &str, bytes: &[u8]) -> Result<DocumentFormat, ParseError> {
    let ext = Path::new(filename.trim())
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("docx") => Ok(DocumentFormat::Docx),
        Some("xlsx") => Ok(DocumentFormat::Xlsx),
        Some("xls") => Ok(DocumentFormat::Xls),
        Some("txt") => Ok(DocumentFormat::PlainText),
        Some("") | None => sniff_content(bytes)
            .ok_or_else(|| ParseError::UnsupportedFormat { filename: filename.to_string() }),
        Some(_) => Err(ParseError::UnsupportedFormat { filename: filename.to_string() }),
    }
}

/// Content-based detection used when the filename carries no extension.
pub fn sniff_content(bytes: &[u8]) -> Option<DocumentFormat> {
    if bytes.starts_with(ZIP_MAGIC) {
        let zip = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;
        let mut has_document = false;
        let mut has_workbook = false;
        for name in zip.file_names() {
            match name {
                "word/document.xml" => has_document = true,
                "xl/workbook.xml" => has_workbook = true,
                _ => {}
            }
        }
        return match (has_document, has_workbook) {
            (true, false) => Some(DocumentFormat::Docx),
            (false, true) => Some(DocumentFormat::Xlsx),
            _ => None,
        };
    }
    if bytes.starts_with(OLE_MAGIC) {
        return Some(DocumentFormat::Xls);
    }
    if is_text_like(bytes) {
        return Some(DocumentFormat::PlainText);
    }
    None
}

/// Lightweight probe: a non-empty prefix with no NUL bytes, or a UTF-16 BOM.
fn is_text_like(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return true;
    }
    let probe = &bytes[..bytes.len().min(2048)];
    !probe.iter().any(|&b| b == 0)
}
