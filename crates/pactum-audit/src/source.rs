//! Document-to-text boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Turns an uploaded document into the raw text the pipeline reads.
pub trait TextSource: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, SourceError>;

    fn mime_type(&self) -> &str;
}

/// Plain UTF-8 text documents. Invalid UTF-8 is refused rather than
/// decoded lossily.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, SourceError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
    }

    fn mime_type(&self) -> &str {
        "text/plain"
    }
}
