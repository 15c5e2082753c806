//! Text-extraction backends
//!
//! Two engines are supported: `pdf-extract` (better text recovery, handles
//! encodings) and `lopdf` (direct content-stream extraction). Selection is by
//! explicit parameter or by trying a fixed ranked order until one succeeds.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ExtractError;

/// Minimum characters of trimmed text below which a PDF is treated as
/// scanned (image-only) rather than successfully extracted.
const SCANNED_TEXT_THRESHOLD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    PdfExtract,
    Lopdf,
}

/// Ranked fallback order used when no backend is requested explicitly.
pub const FALLBACK_ORDER: &[Backend] = &[Backend::PdfExtract, Backend::Lopdf];

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::PdfExtract => "pdf-extract",
            Backend::Lopdf => "lopdf",
        }
    }

    fn extract(self, bytes: &[u8]) -> Result<String, ExtractError> {
        match self {
            Backend::PdfExtract => extract_with_pdf_extract(bytes),
            Backend::Lopdf => extract_with_lopdf(bytes),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf-extract" | "pdfextract" => Ok(Backend::PdfExtract),
            "lopdf" => Ok(Backend::Lopdf),
            other => Err(format!("unknown extraction backend: {}", other)),
        }
    }
}

/// Text content of one page, split into lines.
#[derive(Debug, Clone)]
pub struct PageText {
    pub number: usize,
    pub lines: Vec<String>,
}

/// Extract raw text from PDF bytes.
///
/// With an explicit backend its failure is final; otherwise the ranked
/// fallback order is tried and the last error is returned only when every
/// engine fails.
pub fn extract_text(bytes: &[u8], backend: Option<Backend>) -> Result<String, ExtractError> {
    if let Some(backend) = backend {
        debug!(backend = backend.name(), "extracting text");
        return backend.extract(bytes);
    }

    let mut last_err = ExtractError::EmptyText;
    for candidate in FALLBACK_ORDER {
        match candidate.extract(bytes) {
            Ok(text) => {
                debug!(backend = candidate.name(), chars = text.len(), "text extracted");
                return Ok(text);
            }
            Err(e) => {
                warn!(backend = candidate.name(), error = %e, "backend failed, trying next");
                last_err = e;
            }
        }
    }
    Err(last_err)
}

/// Extract text from a file on disk. A missing file is reported as a plain
/// filesystem condition, distinct from PDF-content failures.
pub fn extract_text_from_file(
    path: &Path,
    backend: Option<Backend>,
) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    extract_text(&bytes, backend)
}

/// Split extracted text into per-page lines on form feed boundaries; text
/// without form feeds is a single page.
pub fn split_pages(text: &str) -> Vec<PageText> {
    text.split('\x0C')
        .filter(|page| !page.trim().is_empty())
        .enumerate()
        .map(|(idx, page)| PageText {
            number: idx + 1,
            lines: page.lines().map(str::to_string).collect(),
        })
        .collect()
}

fn extract_with_pdf_extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(classify_backend_error)?;
    reject_if_scanned(text)
}

fn extract_with_lopdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| classify_backend_error(e.to_string()))?;

    let mut pages = Vec::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => pages.push(text),
            Err(e) => warn!(page = page_num, error = %e, "page text extraction failed"),
        }
    }
    reject_if_scanned(pages.join("\x0C"))
}

fn reject_if_scanned(text: String) -> Result<String, ExtractError> {
    let non_ws = text.trim().chars().filter(|c| !c.is_whitespace()).count();
    if text.trim().len() < SCANNED_TEXT_THRESHOLD || non_ws < 20 {
        return Err(ExtractError::EmptyText);
    }
    Ok(text)
}

/// Map a backend's stringly-typed failure onto the extraction taxonomy.
fn classify_backend_error(err: impl ToString) -> ExtractError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if lower.contains("encrypted") || lower.contains("password") {
        return ExtractError::PasswordProtected;
    }
    if lower.contains("invalid") || lower.contains("malformed") || lower.contains("corrupt") {
        return ExtractError::InvalidPdf(msg);
    }
    ExtractError::ExtractionFailed(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parses_from_flag_values() {
        assert_eq!("pdf-extract".parse::<Backend>(), Ok(Backend::PdfExtract));
        assert_eq!("lopdf".parse::<Backend>(), Ok(Backend::Lopdf));
        assert!("pymupdf".parse::<Backend>().is_err());
    }

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("Page one\nline 2\x0CPage two");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].lines, vec!["Page one", "line 2"]);
        assert_eq!(pages[1].lines, vec!["Page two"]);
    }

    #[test]
    fn test_split_pages_single_page() {
        let pages = split_pages("only page");
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_classify_password_error() {
        assert!(matches!(
            classify_backend_error("file is encrypted"),
            ExtractError::PasswordProtected
        ));
    }

    #[test]
    fn test_classify_invalid_pdf_error() {
        assert!(matches!(
            classify_backend_error("malformed xref table"),
            ExtractError::InvalidPdf(_)
        ));
    }

    #[test]
    fn test_scanned_heuristic_rejects_short_text() {
        assert!(matches!(
            reject_if_scanned("a b".to_string()),
            Err(ExtractError::EmptyText)
        ));
    }

    #[test]
    fn test_missing_file_is_distinct() {
        let err = extract_text_from_file(Path::new("/no/such/file.pdf"), None).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }

    #[test]
    fn test_garbage_bytes_fail_all_backends() {
        let err = extract_text(b"not a pdf at all", None).unwrap_err();
        assert!(!matches!(err, ExtractError::FileNotFound(_)));
    }
}
