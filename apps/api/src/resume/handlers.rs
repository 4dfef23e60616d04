//! Axum route handlers for resume upload.

use axum::extract::Multipart;
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::resume::pdf::{extract_text_from_pdf, PdfError};

/// Multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ExtractTextResponse {
    pub text: String,
}

/// POST /api/v1/resumes/extract
///
/// Accepts a multipart PDF upload and returns its plain text so the client can
/// review it before requesting an analysis. Never calls the model.
pub async fn handle_extract_text(
    mut multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, AppError> {
    let mut file: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(FILE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
            file = Some(data);
        }
    }

    let file = file.ok_or_else(|| {
        AppError::Validation(format!("Missing '{FILE_FIELD}' field with a PDF upload"))
    })?;

    let text = extract_text_from_pdf(file.to_vec())
        .await
        .map_err(pdf_error_to_app_error)?;

    info!("Extracted {} chars of resume text from upload", text.len());
    Ok(Json(ExtractTextResponse { text }))
}

/// Every extraction failure is a parse error for the client, parser crashes included.
fn pdf_error_to_app_error(err: PdfError) -> AppError {
    match err {
        PdfError::Task(join) => {
            error!("PDF parser crashed: {}", join);
            AppError::UnprocessableEntity(
                "Could not read text from the PDF: the document could not be parsed.".to_string(),
            )
        }
        other => AppError::UnprocessableEntity(other.to_string()),
    }
}
