//! Text extraction for uploaded documents.
//!
//! Only PDF is supported. The upload path hands over raw bytes plus the
//! content type reported by the client (or inferred from the file name);
//! this module returns plain UTF-8 text or an [`ExtractError`]. It never
//! panics on malformed input.

use std::path::Path;

pub const MIME_PDF: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Extract plain text from `bytes` of the given `content_type`.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
    match content_type {
        MIME_PDF => extract_pdf(bytes),
        _ => Err(ExtractError::UnsupportedContentType(
            content_type.to_string(),
        )),
    }
}

/// Best-effort content type for an upload.
///
/// Browsers often send `application/octet-stream` for files picked from
/// disk, so a `.pdf` extension or a `%PDF-` magic header also counts.
pub fn detect_content_type(name: &str, declared: Option<&str>, bytes: &[u8]) -> String {
    if let Some(ct) = declared {
        let ct = ct.split(';').next().unwrap_or(ct).trim();
        if ct == MIME_PDF {
            return MIME_PDF.to_string();
        }
    }
    let by_extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if by_extension || bytes.starts_with(b"%PDF-") {
        return MIME_PDF.to_string();
    }
    declared
        .unwrap_or("application/octet-stream")
        .to_string()
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of erroring.
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractError::Pdf("malformed PDF".to_string()))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}
