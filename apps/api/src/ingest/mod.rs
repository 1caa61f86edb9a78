//! Uploaded PDF → plain text, for the ATS scan.
//!
//! `pdf-extract` is synchronous and can panic on malformed files, so the async entry
//! point runs it on the blocking pool and turns a panicked task into an
//! `ExtractionError` like any other unreadable upload.

use thiserror::Error;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("The uploaded file is empty")]
    Empty,

    #[error("The uploaded file is not a PDF")]
    NotPdf,

    #[error("Could not read text from the PDF: {0}")]
    Unreadable(String),

    #[error("The PDF contains no extractable text (is it a scanned image?)")]
    NoText,
}

/// Extracts the text of every page, in page order.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractionError::NotPdf);
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(text)
}

/// `extract_text` on the blocking thread pool.
pub async fn extract_text_blocking(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    let size = bytes.len();
    let result = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| ExtractionError::Unreadable(format!("extractor aborted: {e}")))?;

    match &result {
        Ok(text) => tracing::debug!(bytes = size, chars = text.len(), "PDF text extracted"),
        Err(e) => tracing::warn!(bytes = size, "PDF extraction failed: {e}"),
    }
    result
}
