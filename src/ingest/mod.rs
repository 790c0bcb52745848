//! Document ingestion: file bytes → [`Document`](crate::document::Document).
//!
//! * [`IngestPipeline`]: dispatches on media type and stamps timing,
//!   confidence and word count.
//! * [`OcrEngine`] / [`TesseractCli`]: image recognition collaborator.
//! * [`PdfExtractor`] / [`LopdfExtractor`]: PDF text-layer collaborator.
//! * [`IngestError`]: error variants for ingestion.

pub mod error;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::IngestError;
pub use ocr::{parse_tsv, OcrEngine, OcrOutput, OcrProgress, ProgressSink, TesseractCli};
pub use pdf::{LopdfExtractor, PdfExtractor};
pub use pipeline::{IngestPipeline, MediaKind};

#[cfg(test)]
pub use ocr::MockOcrEngine;
#[cfg(test)]
pub use pdf::MockPdfExtractor;
