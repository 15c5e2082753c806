//! PDF attendance extraction
//!
//! Opens a PDF, pulls its text through one of two backends, and parses
//! attendance rows into structured records. See [`extract_records`] for the
//! whole pipeline in one call.

pub mod backend;
pub mod error;
pub mod parser;
pub mod patterns;

use std::path::Path;

use timecard_types::AttendanceRecord;
use tracing::info;

pub use backend::{extract_text, extract_text_from_file, split_pages, Backend, PageText};
pub use error::ExtractError;
pub use parser::{merge_broken_lines, parse_line, parse_text, sanitize, LineOutcome};

/// Full extraction pipeline: file open, text extraction, record parsing.
pub fn extract_records(
    path: &Path,
    backend: Option<Backend>,
) -> Result<Vec<AttendanceRecord>, ExtractError> {
    let text = extract_text_from_file(path, backend)?;
    let records = parse_text(&text);
    info!(path = %path.display(), records = records.len(), "extraction complete");
    Ok(records)
}

/// Same pipeline over in-memory bytes.
pub fn extract_records_from_bytes(
    bytes: &[u8],
    backend: Option<Backend>,
) -> Result<Vec<AttendanceRecord>, ExtractError> {
    let text = extract_text(bytes, backend)?;
    Ok(parse_text(&text))
}
