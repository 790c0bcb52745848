//! Read-only reader snapshot shared with the presentation layer.
//!
//! [`ReaderState`] holds everything a view needs to render the reader: the
//! loaded document and its summary, whether an ingestion is running, the
//! playback cursor, search results and bookmarks.  The
//! [`ReaderOrchestrator`](super::ReaderOrchestrator) is the only writer.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<ReaderState>>`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::bookmarks::Bookmark;
use crate::document::{Document, DocumentSummary};
use crate::search::SearchState;
use crate::speech::{PlaybackState, PlaybackStatus};

// ---------------------------------------------------------------------------
// ReaderState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReaderState {
    /// The document being read.  Replaced wholesale on each ingestion.
    pub document: Option<Document>,

    pub summary: Option<DocumentSummary>,

    /// `true` while an ingestion is in flight.
    pub is_processing: bool,

    pub playback: PlaybackState,

    pub search: SearchState,

    pub bookmarks: Vec<Bookmark>,

    /// Whether the device can synthesise speech at all.
    pub speech_available: bool,

    /// Last failure to surface to the user.  Cleared by the next successful
    /// ingestion or narration.
    pub error_message: Option<String>,
}

impl ReaderState {
    pub fn new() -> Self {
        Self {
            document: None,
            summary: None,
            is_processing: false,
            playback: PlaybackState::default(),
            search: SearchState::default(),
            bookmarks: Vec::new(),
            speech_available: false,
            error_message: None,
        }
    }

    /// A short label suitable for a status bar.
    ///
    /// ```
    /// use doc_reader::reader::ReaderState;
    ///
    /// let mut state = ReaderState::new();
    /// assert_eq!(state.status_label(), "No document");
    /// state.is_processing = true;
    /// assert_eq!(state.status_label(), "Processing");
    /// ```
    pub fn status_label(&self) -> &'static str {
        if self.is_processing {
            return "Processing";
        }
        match self.playback.status {
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
            PlaybackStatus::Idle if self.document.is_some() => "Ready",
            PlaybackStatus::Idle => "No document",
        }
    }
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`ReaderState`].
///
/// Lock with [`lock_state`] for a short critical section; do **not** hold the
/// lock across `.await` points.
pub type SharedState = Arc<Mutex<ReaderState>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(ReaderState::new()))
}

/// Lock `state`.  A lock poisoned by a panicking reader is recovered, since
/// every write replaces whole fields.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, ReaderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
