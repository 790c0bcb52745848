//! At-a-glance statistics shown next to a document.

use serde::Serialize;

use super::Document;

/// Word / character counts and an estimated silent-reading time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub word_count: usize,
    /// Unicode scalar values in the document text.
    pub character_count: usize,
    /// `ceil(word_count / reading_wpm)`.
    pub estimated_reading_minutes: usize,
}

impl DocumentSummary {
    /// Summarise `document` for a reader going at `reading_wpm` words per
    /// minute.  A zero speed is treated as one word per minute.
    pub fn of(document: &Document, reading_wpm: usize) -> Self {
        let word_count = document.word_count();
        Self {
            word_count,
            character_count: document.text().chars().count(),
            estimated_reading_minutes: word_count.div_ceil(reading_wpm.max(1)),
        }
    }

    /// Reading time label, e.g. `"1 min"` or `"3 mins"`.
    pub fn reading_time_label(&self) -> String {
        let minutes = self.estimated_reading_minutes;
        if minutes == 1 {
            "1 min".to_string()
        } else {
            format!("{minutes} mins")
        }
    }
}
