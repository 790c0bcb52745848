use thiserror::Error;

/// All errors that can arise while turning file bytes into a document.
///
/// Only [`IngestError::UnsupportedMediaType`] escapes
/// [`IngestPipeline::ingest`](super::IngestPipeline::ingest); collaborator
/// failures are folded into a fallback document instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The media type is neither a PDF nor an image.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The OCR engine failed to recognise the image.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The PDF text layer could not be read.
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// Internal / unexpected error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// The bare failure description, without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            IngestError::UnsupportedMediaType(reason)
            | IngestError::Ocr(reason)
            | IngestError::Pdf(reason)
            | IngestError::Internal(reason) => reason,
        }
    }
}
