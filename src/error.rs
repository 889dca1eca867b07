//! Error taxonomy for notebook operations.
//!
//! Every failure a caller can see from [`Notebook`](crate::notebook::Notebook)
//! is one of these variants. The HTTP layer maps them onto status codes
//! (see [`NotebookError::code`]); the CLI prints them.
//!
//! An answer with nothing relevant in the selection is not an error: it is
//! an ordinary answer carrying a fixed sentence and no passages.

use thiserror::Error;

use crate::extract::ExtractError;

#[derive(Debug, Error)]
pub enum NotebookError {
    /// The request itself is unusable: no question, nothing selected, no
    /// file, empty upload.
    #[error("{0}")]
    Input(String),

    /// The upload is not a PDF, or its bytes could not be turned into text.
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// The document produced no passages (e.g. a scanned PDF without a
    /// text layer).
    #[error("No text could be extracted from '{0}'")]
    EmptyDocument(String),

    /// The embedding model, language model or transcription service failed.
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A bug or broken invariant inside the service.
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl NotebookError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn upstream(context: &'static str, source: anyhow::Error) -> Self {
        Self::Upstream { context, source }
    }

    /// Machine-readable error code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Input(_) | Self::EmptyDocument(_) => "bad_request",
            Self::Extraction(ExtractError::UnsupportedContentType(_)) => "unsupported_media_type",
            Self::Extraction(_) => "extraction_failed",
            Self::Upstream { .. } => "upstream_error",
            Self::Internal(_) => "internal",
        }
    }
}

pub type NotebookResult<T> = Result<T, NotebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(NotebookError::input("Question required").code(), "bad_request");
        assert_eq!(NotebookError::EmptyDocument("a.pdf".into()).code(), "bad_request");
        assert_eq!(
            NotebookError::from(ExtractError::Pdf("bad xref".into())).code(),
            "extraction_failed"
        );
        assert_eq!(
            NotebookError::from(ExtractError::UnsupportedContentType("text/plain".into())).code(),
            "unsupported_media_type"
        );
        assert_eq!(
            NotebookError::upstream("completion failed", anyhow::anyhow!("429")).code(),
            "upstream_error"
        );
        assert_eq!(
            NotebookError::Internal(anyhow::anyhow!("boom")).code(),
            "internal"
        );
    }

    #[test]
    fn test_input_message_is_verbatim() {
        let err = NotebookError::input("No documents selected");
        assert_eq!(err.to_string(), "No documents selected");
    }

    #[test]
    fn test_upstream_message_includes_context() {
        let err = NotebookError::upstream("embedding failed", anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "embedding failed: connection refused");
    }
}
