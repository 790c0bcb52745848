//! Ingestion pipeline: dispatches file bytes to the PDF or OCR collaborator
//! and stamps the resulting [`Document`].
//!
//! ```text
//! ingest(filename, bytes, media_type)
//!   ├─ application/pdf → PdfExtractor::extract_pages → join pages → Document
//!   │                     └─ Err → fallback Document (status Failed)
//!   ├─ image/*         → OcrEngine::recognize("eng") → Document
//!   │                     └─ Err → fallback Document (status Failed)
//!   └─ anything else   → Err(UnsupportedMediaType)
//! ```

use std::sync::Arc;

use tokio::time::Instant;

use crate::config::IngestConfig;
use crate::document::Document;

use super::error::IngestError;
use super::ocr::{OcrEngine, OcrProgress};
use super::pdf::PdfExtractor;

/// Confidence reported for text read from a PDF text layer.
const PDF_TEXT_LAYER_CONFIDENCE: f32 = 0.9;

/// Document text when a PDF has a text layer with nothing in it.
const EMPTY_PDF_TEXT: &str = "No text found in PDF";

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// The two families of files the pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Image,
}

impl MediaKind {
    /// Classify a media type string; `None` when unsupported.
    ///
    /// ```
    /// use doc_reader::ingest::MediaKind;
    ///
    /// assert_eq!(MediaKind::classify("application/pdf"), Some(MediaKind::Pdf));
    /// assert_eq!(MediaKind::classify("image/png"), Some(MediaKind::Image));
    /// assert_eq!(MediaKind::classify("text/plain"), None);
    /// ```
    pub fn classify(media_type: &str) -> Option<Self> {
        let media_type = media_type.trim().to_ascii_lowercase();
        if media_type == "application/pdf" {
            Some(MediaKind::Pdf)
        } else if media_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// IngestPipeline
// ---------------------------------------------------------------------------

/// Turns raw file bytes into a [`Document`].
///
/// Collaborators are injected so tests can substitute doubles.  One call at
/// a time is expected; the reader rejects a second `Ingest` while one is
/// pending.
pub struct IngestPipeline {
    ocr: Arc<dyn OcrEngine>,
    pdf: Arc<dyn PdfExtractor>,
    ocr_language: String,
}

impl IngestPipeline {
    pub fn new(ocr: Arc<dyn OcrEngine>, pdf: Arc<dyn PdfExtractor>, config: &IngestConfig) -> Self {
        Self {
            ocr,
            pdf,
            ocr_language: config.ocr_language.clone(),
        }
    }

    /// Ingest `bytes` as `media_type`.
    ///
    /// # Errors
    ///
    /// Only [`IngestError::UnsupportedMediaType`].  Collaborator failures
    /// produce a fallback document whose status is
    /// [`ExtractionStatus::Failed`](crate::document::ExtractionStatus::Failed).
    pub async fn ingest(
        &self,
        filename: &str,
        bytes: &[u8],
        media_type: &str,
    ) -> Result<Document, IngestError> {
        let kind = MediaKind::classify(media_type)
            .ok_or_else(|| IngestError::UnsupportedMediaType(media_type.to_string()))?;

        log::info!(
            "ingest: {filename} ({media_type}, {} bytes) as {kind:?}",
            bytes.len()
        );
        let started = Instant::now();

        let document = match kind {
            MediaKind::Pdf => self.ingest_pdf(filename, bytes, media_type, started).await,
            MediaKind::Image => self.ingest_image(filename, bytes, media_type, started).await,
        };

        log::info!(
            "ingest: {filename} done in {} ms, {} words, confidence {:.2}",
            document.processing_time_ms(),
            document.word_count(),
            document.confidence()
        );
        Ok(document)
    }

    async fn ingest_pdf(
        &self,
        filename: &str,
        bytes: &[u8],
        media_type: &str,
        started: Instant,
    ) -> Document {
        match self.pdf.extract_pages(bytes).await {
            Ok(pages) => {
                let text = pages.join("\n\n").trim().to_string();
                let text = if text.is_empty() {
                    EMPTY_PDF_TEXT.to_string()
                } else {
                    text
                };
                Document::extracted(
                    filename,
                    media_type,
                    text,
                    PDF_TEXT_LAYER_CONFIDENCE,
                    started.elapsed(),
                )
            }
            Err(e) => {
                log::warn!("ingest: pdf extraction failed for {filename}: {e}");
                let message = format!(
                    "PDF file \"{filename}\" uploaded. Text extraction failed: {}. \
                     Try with an image file instead.",
                    e.reason()
                );
                Document::failed(filename, media_type, message, e.reason(), started.elapsed())
            }
        }
    }

    async fn ingest_image(
        &self,
        filename: &str,
        bytes: &[u8],
        media_type: &str,
        started: Instant,
    ) -> Document {
        let progress = |p: OcrProgress| {
            log::debug!("ingest: ocr {} ({:.0}%)", p.status, p.progress * 100.0);
        };

        match self.ocr.recognize(bytes, &self.ocr_language, &progress).await {
            Ok(output) => Document::extracted(
                filename,
                media_type,
                output.text,
                output.confidence_percent / 100.0,
                started.elapsed(),
            ),
            Err(e) => {
                log::warn!("ingest: ocr failed for {filename}: {e}");
                let message = format!(
                    "Image file \"{filename}\" uploaded. Text recognition failed: {}.",
                    e.reason()
                );
                Document::failed(filename, media_type, message, e.reason(), started.elapsed())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
