//! Whitespace tokenisation shared by the document model and the speech engine.

use serde::Serialize;

/// Number of maximal non-whitespace runs in `text`.
///
/// ```
/// use doc_reader::document::word_count;
///
/// assert_eq!(word_count("  alpha\tbeta\n\ngamma "), 3);
/// assert_eq!(word_count(""), 0);
/// ```
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The ordered words of a text, addressed by the playback cursor.
///
/// Recomputed from the source text for every narration; never stored on the
/// [`Document`](super::Document) itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WordSequence {
    words: Vec<String>,
}

impl WordSequence {
    /// Split `text` into its maximal non-whitespace runs, left to right.
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_owned).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// Index of the last word, `None` when the sequence is empty.
    pub fn last_index(&self) -> Option<usize> {
        self.words.len().checked_sub(1)
    }

    /// The words joined by single spaces: the whitespace-normalised text.
    pub fn joined(&self) -> String {
        self.words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_ignores_leading_trailing_and_repeated_whitespace() {
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one  two\r\nthree\tfour"), 4);
    }

    #[test]
    fn sequence_matches_word_count() {
        let text = "The  quick\nbrown\t fox";
        let words = WordSequence::from_text(text);
        assert_eq!(words.len(), word_count(text));
        assert_eq!(words.get(0), Some("The"));
        assert_eq!(words.get(3), Some("fox"));
        assert_eq!(words.get(4), None);
        assert_eq!(words.last_index(), Some(3));
    }

    #[test]
    fn joined_sequence_is_whitespace_normalised_text() {
        let samples = [
            "alpha beta gamma",
            "  leading and trailing  ",
            "tabs\tand\nnewlines\r\nmixed",
            "",
            "single",
        ];
        for text in samples {
            let normalised = text.split_whitespace().collect::<Vec<_>>().join(" ");
            assert_eq!(WordSequence::from_text(text).joined(), normalised, "{text:?}");
        }
    }

    #[test]
    fn empty_text_has_no_last_index() {
        let words = WordSequence::from_text(" \n ");
        assert!(words.is_empty());
        assert_eq!(words.last_index(), None);
    }
}
