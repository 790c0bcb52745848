//! Session-scoped bookmarks into the current document.
//!
//! A bookmark keeps a short snippet of the text it was taken from.  Bookmarks
//! do not record a document offset: `position` is always `0`.

use serde::Serialize;

use crate::config::BookmarkConfig;
use crate::search::ELLIPSIS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    /// Unique within the process.
    pub id: String,
    /// The first `snippet_chars` characters of the bookmarked text followed
    /// by an ellipsis.
    pub snippet: String,
    pub position: usize,
}

/// Append-only list of bookmarks, kept in insertion order.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    bookmarks: Vec<Bookmark>,
    snippet_chars: usize,
}

impl BookmarkStore {
    pub fn new(snippet_chars: usize) -> Self {
        Self {
            bookmarks: Vec::new(),
            snippet_chars,
        }
    }

    pub fn from_config(config: &BookmarkConfig) -> Self {
        Self::new(config.snippet_chars)
    }

    /// Bookmark `text`.  Returns `None` (and records nothing) for empty text.
    ///
    /// The ellipsis is appended even when `text` is shorter than the snippet
    /// length.
    pub fn add(&mut self, text: &str) -> Option<&Bookmark> {
        if text.is_empty() {
            return None;
        }
        let mut snippet: String = text.chars().take(self.snippet_chars).collect();
        snippet.push_str(ELLIPSIS);

        let bookmark = Bookmark {
            id: format!("bookmark_{}", uuid::Uuid::new_v4().simple()),
            snippet,
            position: 0,
        };
        log::debug!("bookmarks: added {}", bookmark.id);
        self.bookmarks.push(bookmark);
        self.bookmarks.last()
    }

    /// Remove the bookmark with `id`.  Returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != id);
        before != self.bookmarks.len()
    }

    pub fn list(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self::from_config(&BookmarkConfig::default())
    }
}
