use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read PDF file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid or corrupt PDF: {0}")]
    InvalidPdf(String),

    #[error("PDF is password protected")]
    PasswordProtected,

    #[error("No extractable text in PDF (scanned document?)")]
    EmptyText,

    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),
}

impl ExtractError {
    /// Empty output is a warn-and-continue condition for callers, unlike a
    /// hard open or parse failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExtractError::EmptyText)
    }
}
