//! Document model shared by every engine.
//!
//! * [`Document`]: immutable result of ingestion; `text` is the single
//!   source of truth for search, narration and word highlighting.
//! * [`WordSequence`]: whitespace tokenisation used as the playback unit.
//! * [`DocumentSummary`]: counts and estimated reading time for the view.

pub mod model;
pub mod summary;
pub mod words;

pub use model::{Document, ExtractionStatus};
pub use summary::DocumentSummary;
pub use words::{word_count, WordSequence};
