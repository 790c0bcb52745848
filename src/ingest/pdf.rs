//! PDF text-layer collaborator interface and its `lopdf` implementation.

use async_trait::async_trait;

use super::error::IngestError;

/// Asynchronous PDF text-layer extraction.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    /// Extract the text of every page, in page order.
    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, IngestError>;
}

// Compile-time assertion: Box<dyn PdfExtractor> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn PdfExtractor>) {}
};

/// Reads the PDF text layer with `lopdf`.
///
/// Parsing is CPU-bound, so it runs on `tokio::task::spawn_blocking`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PdfExtractor for LopdfExtractor {
    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, IngestError> {
        let data = bytes.to_vec();
        tokio::task::spawn_blocking(move || extract_pages_blocking(&data))
            .await
            .map_err(|e| IngestError::Internal(e.to_string()))?
    }
}

fn extract_pages_blocking(bytes: &[u8]) -> Result<Vec<String>, IngestError> {
    let document =
        lopdf::Document::load_mem(bytes).map_err(|e| IngestError::Pdf(e.to_string()))?;

    // `get_pages` is keyed by 1-based page number, already in order.
    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    log::debug!("ingest: pdf has {} page(s)", page_numbers.len());

    page_numbers
        .into_iter()
        .map(|page| {
            document
                .extract_text(&[page])
                .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
                .map_err(|e| IngestError::Pdf(format!("page {page}: {e}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// MockPdfExtractor  (test-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub struct MockPdfExtractor {
    response: Result<Vec<String>, IngestError>,
}

#[cfg(test)]
impl MockPdfExtractor {
    pub fn pages(pages: &[&str]) -> Self {
        Self {
            response: Ok(pages.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn err(error: IngestError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl PdfExtractor for MockPdfExtractor {
    async fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, IngestError> {
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_bytes_are_a_pdf_error() {
        let err = LopdfExtractor::new()
            .extract_pages(b"definitely not a pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Pdf(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_input_is_a_pdf_error() {
        let err = LopdfExtractor::new().extract_pages(&[]).await.unwrap_err();
        assert!(matches!(err, IngestError::Pdf(_)));
    }
}
