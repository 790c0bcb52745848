//! Case-insensitive substring search with context previews and cyclic
//! navigation.
//!
//! Offsets are counted in Unicode scalar values (`char`s) of the document
//! text, and matching compares one `char` of text against one `char` of
//! query, so a match always spans exactly `query.chars().count()` characters
//! of the original text.

use serde::Serialize;

use crate::config::SearchConfig;

/// Marker added to a context preview that was cut short.
pub const ELLIPSIS: &str = "...";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One occurrence of the query in the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Character index of the match start.
    pub offset: usize,
    /// Up to `context_chars` characters either side of the match, with
    /// [`ELLIPSIS`] where the preview cuts the text short.
    pub context_text: String,
}

/// Query, ordered matches and the navigation cursor.
///
/// `matches` is sorted ascending by offset; `current_index` is `Some` exactly
/// when `matches` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub matches: Vec<SearchMatch>,
    pub current_index: Option<usize>,
}

impl SearchState {
    pub fn current(&self) -> Option<&SearchMatch> {
        self.current_index.and_then(|i| self.matches.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Direction for [`SearchEngine::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateDirection {
    Next,
    Prev,
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// Owns the [`SearchState`] for the current document.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    state: SearchState,
    context_chars: usize,
}

impl SearchEngine {
    pub fn new(context_chars: usize) -> Self {
        Self {
            state: SearchState::default(),
            context_chars,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.context_chars)
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.state.current()
    }

    /// Search `text` for `query`, replacing any previous result.
    ///
    /// A blank query clears the matches without error.
    pub fn search(&mut self, text: &str, query: &str) -> &SearchState {
        let matches = if query.trim().is_empty() {
            Vec::new()
        } else {
            find_matches(text, query, self.context_chars)
        };
        log::debug!("search: {query:?} → {} match(es)", matches.len());

        let current_index = if matches.is_empty() { None } else { Some(0) };
        self.state = SearchState {
            query: query.to_string(),
            matches,
            current_index,
        };
        &self.state
    }

    /// Move the cursor one match forward or back, wrapping at either end.
    /// No-op when there are no matches.
    pub fn navigate(&mut self, direction: NavigateDirection) -> Option<&SearchMatch> {
        let n = self.state.matches.len();
        if n == 0 {
            return None;
        }
        let i = self.state.current_index.unwrap_or(0);
        let next = match direction {
            NavigateDirection::Next => (i + 1) % n,
            NavigateDirection::Prev => (i + n - 1) % n,
        };
        self.state.current_index = Some(next);
        self.state.matches.get(next)
    }

    /// Forget the query and all matches.
    pub fn clear(&mut self) {
        self.state = SearchState::default();
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Start offsets of every case-insensitive occurrence of `query` in `text`.
///
/// The scan advances one character past each match start, so overlapping
/// occurrences are all reported.
pub(crate) fn match_offsets(text: &[char], query: &[char]) -> Vec<usize> {
    if query.is_empty() || query.len() > text.len() {
        return Vec::new();
    }
    (0..=text.len() - query.len())
        .filter(|&start| {
            text[start..start + query.len()]
                .iter()
                .zip(query)
                .all(|(&t, &q)| chars_eq_ignore_case(t, q))
        })
        .collect()
}

/// Find every occurrence of `query` in `text` with a context preview of
/// `context_chars` characters either side.
///
/// ```
/// use doc_reader::search::find_matches;
///
/// let offsets: Vec<usize> = find_matches("aaaa", "aa", 50).iter().map(|m| m.offset).collect();
/// assert_eq!(offsets, [0, 1, 2]);
/// ```
pub fn find_matches(text: &str, query: &str, context_chars: usize) -> Vec<SearchMatch> {
    let text: Vec<char> = text.chars().collect();
    let query: Vec<char> = query.chars().collect();

    match_offsets(&text, &query)
        .into_iter()
        .map(|offset| SearchMatch {
            offset,
            context_text: context_window(&text, offset, query.len(), context_chars),
        })
        .collect()
}

fn context_window(text: &[char], offset: usize, len: usize, context_chars: usize) -> String {
    let start = offset.saturating_sub(context_chars);
    let end = (offset + len + context_chars).min(text.len());

    let mut context = String::new();
    if start > 0 {
        context.push_str(ELLIPSIS);
    }
    context.extend(&text[start..end]);
    if end < text.len() {
        context.push_str(ELLIPSIS);
    }
    context
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(matches: &[SearchMatch]) -> Vec<usize> {
        matches.iter().map(|m| m.offset).collect()
    }

    #[test]
    fn overlapping_occurrences_are_all_found() {
        assert_eq!(offsets(&find_matches("aaaa", "aa", 50)), [0, 1, 2]);
        assert_eq!(offsets(&find_matches("abababa", "aba", 50)), [0, 2, 4]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let matches = find_matches("The cat saw THE dog by the door", "the", 50);
        assert_eq!(offsets(&matches), [0, 12, 23]);
    }

    #[test]
    fn offsets_are_character_indices() {
        let matches = find_matches("ééé café", "CAFÉ", 50);
        assert_eq!(offsets(&matches), [4]);
    }

    #[test]
    fn short_text_has_no_ellipsis() {
        let matches = find_matches("a small needle here", "needle", 50);
        assert_eq!(matches[0].context_text, "a small needle here");
    }

    #[test]
    fn context_near_start_is_clamped_without_leading_ellipsis() {
        let text: String = "x".repeat(5) + "abc" + &"y".repeat(192);
        assert_eq!(text.chars().count(), 200);

        let matches = find_matches(&text, "abc", 50);
        assert_eq!(offsets(&matches), [5]);
        let context = &matches[0].context_text;

        assert!(!context.starts_with(ELLIPSIS));
        let body = context.strip_suffix(ELLIPSIS).expect("text continues past the window");
        assert_eq!(body.chars().count(), 58);
        assert_eq!(body, &text[..58]);
    }

    #[test]
    fn context_in_middle_has_both_ellipses() {
        let text: String = "x".repeat(100) + "needle" + &"y".repeat(100);
        let matches = find_matches(&text, "needle", 50);
        let context = &matches[0].context_text;

        assert!(context.starts_with(ELLIPSIS));
        assert!(context.ends_with(ELLIPSIS));
        assert_eq!(context.chars().count(), 50 + 6 + 50 + 2 * ELLIPSIS.len());
    }

    #[test]
    fn context_at_end_has_only_leading_ellipsis() {
        let text: String = "x".repeat(80) + "end";
        let matches = find_matches(&text, "end", 50);
        let context = &matches[0].context_text;
        assert!(context.starts_with(ELLIPSIS));
        assert!(context.ends_with("end"));
    }

    #[test]
    fn blank_query_yields_empty_state() {
        let mut engine = SearchEngine::new(50);
        let state = engine.search("some text", "   ");
        assert!(state.matches.is_empty());
        assert_eq!(state.current_index, None);
    }

    #[test]
    fn query_longer_than_text_finds_nothing() {
        assert!(find_matches("ab", "abc", 50).is_empty());
    }

    #[test]
    fn search_resets_cursor_to_first_match() {
        let mut engine = SearchEngine::new(50);
        engine.search("one two one two one", "one");
        engine.navigate(NavigateDirection::Next);
        assert_eq!(engine.state().current_index, Some(1));

        let state = engine.search("one two one two one", "two");
        assert_eq!(offsets(&state.matches), [4, 12]);
        assert_eq!(state.current_index, Some(0));

        let state = engine.search("one two one two one", "three");
        assert!(state.matches.is_empty());
        assert_eq!(state.current_index, None);
    }

    #[test]
    fn navigation_wraps_in_both_directions() {
        let mut engine = SearchEngine::new(50);
        engine.search("a b a b a", "a");
        assert_eq!(engine.state().matches.len(), 3);

        engine.navigate(NavigateDirection::Next);
        engine.navigate(NavigateDirection::Next);
        assert_eq!(engine.state().current_index, Some(2));

        let m = engine.navigate(NavigateDirection::Next).cloned();
        assert_eq!(engine.state().current_index, Some(0));
        assert_eq!(m.map(|m| m.offset), Some(0));

        engine.navigate(NavigateDirection::Prev);
        assert_eq!(engine.state().current_index, Some(2));
        assert_eq!(engine.current().map(|m| m.offset), Some(8));
    }

    #[test]
    fn navigation_without_matches_is_noop() {
        let mut engine = SearchEngine::new(50);
        engine.search("abc", "zzz");
        assert!(engine.navigate(NavigateDirection::Next).is_none());
        assert!(engine.navigate(NavigateDirection::Prev).is_none());
        assert_eq!(engine.state().current_index, None);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut engine = SearchEngine::new(50);
        engine.search("abc abc", "abc");
        engine.clear();
        assert_eq!(engine.state(), &SearchState::default());
    }

    #[test]
    fn matches_are_sorted_by_offset() {
        let matches = find_matches("banana bandana", "an", 5);
        let offs = offsets(&matches);
        let mut sorted = offs.clone();
        sorted.sort_unstable();
        assert_eq!(offs, sorted);
        assert_eq!(offs, [1, 3, 8, 11]);
    }
}
