//! PDF text extraction. Parsing is delegated to `pdf-extract`; this module only
//! moves the work off the async runtime and normalizes the output.

use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("The uploaded file is empty.")]
    Empty,

    #[error("The uploaded file is not a PDF document.")]
    NotPdf,

    #[error("Could not read text from the PDF: {0}")]
    Extraction(String),

    #[error("The PDF does not contain any extractable text.")]
    NoText,

    #[error("PDF extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Extracts the text of every page, trimmed. Image-only PDFs yield `PdfError::NoText`.
pub async fn extract_text_from_pdf(bytes: Vec<u8>) -> Result<String, PdfError> {
    extract_text_with(bytes, |data| {
        pdf_extract::extract_text_from_mem(data).map_err(|e| e.to_string())
    })
    .await
}

/// Runs `extract` on a blocking thread. A panic inside the parser surfaces as `PdfError::Task`.
pub async fn extract_text_with<F>(bytes: Vec<u8>, extract: F) -> Result<String, PdfError>
where
    F: FnOnce(&[u8]) -> Result<String, String> + Send + 'static,
{
    if bytes.is_empty() {
        return Err(PdfError::Empty);
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(PdfError::NotPdf);
    }

    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract(&bytes))
        .await?
        .map_err(|e| {
            warn!("PDF extraction failed: {}", e);
            PdfError::Extraction(e)
        })?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(PdfError::NoText);
    }

    debug!("Extracted {} chars from a {} byte PDF", text.len(), size);
    Ok(text)
}
