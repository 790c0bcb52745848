//! The immutable [`Document`] produced by ingestion.

use std::time::Duration;

use serde::Serialize;

use super::words::word_count;

// ---------------------------------------------------------------------------
// ExtractionStatus
// ---------------------------------------------------------------------------

/// Whether the text of a [`Document`] came from the file or is a fallback
/// message describing why extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Text was extracted from the file.
    Extracted,
    /// The collaborator failed; the document text explains why.
    Failed { reason: String },
}

impl ExtractionStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionStatus::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document ready for reading, searching and narration.
///
/// Immutable once built: the reader shares it behind an `Arc` and replaces
/// it wholesale when a new file is ingested.  `word_count` is always derived
/// from `text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    id: String,
    filename: String,
    media_type: String,
    text: String,
    confidence: f32,
    processing_time_ms: u64,
    word_count: usize,
    status: ExtractionStatus,
}

impl Document {
    /// Build a successfully extracted document.
    ///
    /// `confidence` is clamped to `[0, 1]`; a non-finite value becomes `0`.
    pub fn extracted(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        text: impl Into<String>,
        confidence: f32,
        processing_time: Duration,
    ) -> Self {
        Self::build(
            filename.into(),
            media_type.into(),
            text.into(),
            confidence,
            processing_time,
            ExtractionStatus::Extracted,
        )
    }

    /// Build a fallback document whose text describes a failed extraction.
    ///
    /// Confidence is always `0` so the failure is distinguishable from a
    /// successful extraction by the numbers alone.
    pub fn failed(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        message: impl Into<String>,
        reason: impl Into<String>,
        processing_time: Duration,
    ) -> Self {
        Self::build(
            filename.into(),
            media_type.into(),
            message.into(),
            0.0,
            processing_time,
            ExtractionStatus::Failed {
                reason: reason.into(),
            },
        )
    }

    fn build(
        filename: String,
        media_type: String,
        text: String,
        confidence: f32,
        processing_time: Duration,
        status: ExtractionStatus,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let word_count = word_count(&text);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename,
            media_type,
            text,
            confidence,
            processing_time_ms: u64::try_from(processing_time.as_millis()).unwrap_or(u64::MAX),
            word_count,
            status,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Media type the file was ingested as (e.g. `application/pdf`).
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Extraction confidence in `[0, 1]`.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn processing_time_ms(&self) -> u64 {
        self.processing_time_ms
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn status(&self) -> &ExtractionStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracted_document_derives_word_count() {
        let doc = Document::extracted(
            "scan.png",
            "image/png",
            "hello   brave\nnew world",
            0.87,
            Duration::from_millis(1_250),
        );
        assert_eq!(doc.word_count(), 4);
        assert_eq!(doc.processing_time_ms(), 1_250);
        assert_eq!(doc.status(), &ExtractionStatus::Extracted);
        assert!((doc.confidence() - 0.87).abs() < f32::EPSILON);
    }

    #[test]
    fn confidence_is_clamped() {
        let high = Document::extracted("a", "image/png", "x", 1.7, Duration::ZERO);
        let low = Document::extracted("a", "image/png", "x", -0.2, Duration::ZERO);
        let nan = Document::extracted("a", "image/png", "x", f32::NAN, Duration::ZERO);
        assert_eq!(high.confidence(), 1.0);
        assert_eq!(low.confidence(), 0.0);
        assert_eq!(nan.confidence(), 0.0);
    }

    #[test]
    fn failed_document_has_zero_confidence_and_reason() {
        let doc = Document::failed(
            "broken.pdf",
            "application/pdf",
            "PDF file \"broken.pdf\" uploaded. Text extraction failed: bad xref.",
            "bad xref",
            Duration::from_millis(3),
        );
        assert_eq!(doc.confidence(), 0.0);
        assert!(doc.status().is_failed());
        assert!(doc.text().contains("broken.pdf"));
        assert_eq!(doc.word_count(), 9);
    }

    #[test]
    fn ids_are_unique() {
        let a = Document::extracted("a", "image/png", "x", 1.0, Duration::ZERO);
        let b = Document::extracted("a", "image/png", "x", 1.0, Duration::ZERO);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn serialises_status_with_kind_tag() {
        let doc = Document::failed("f.pdf", "application/pdf", "msg", "why", Duration::ZERO);
        let json = serde_json::to_value(&doc).expect("serialise");
        assert_eq!(json["status"]["kind"], "failed");
        assert_eq!(json["status"]["reason"], "why");
        assert_eq!(json["word_count"], 1);
    }
}
