//! Splits document text into plain and highlighted runs for the view.

use serde::Serialize;

use super::engine::match_offsets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Plain,
    Match,
    /// The match the search cursor points at.
    CurrentMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSegment {
    pub text: String,
    pub kind: SegmentKind,
}

/// Split `text` into runs marking every occurrence of `query`.
///
/// `current_offset` is the offset of the match under the search cursor.
/// Overlapping occurrences are emitted from the end of the previous run, so
/// concatenating the segment texts always reproduces `text`.
pub fn highlight_segments(
    text: &str,
    query: &str,
    current_offset: Option<usize>,
) -> Vec<HighlightSegment> {
    let chars: Vec<char> = text.chars().collect();
    let query_len = query.chars().count();
    let offsets = if query.trim().is_empty() {
        Vec::new()
    } else {
        let query: Vec<char> = query.chars().collect();
        match_offsets(&chars, &query)
    };

    let mut segments = Vec::new();
    let mut last = 0usize;

    for offset in offsets {
        if offset > last {
            segments.push(HighlightSegment {
                text: chars[last..offset].iter().collect(),
                kind: SegmentKind::Plain,
            });
        }
        let start = offset.max(last);
        let end = offset + query_len;
        let kind = if current_offset == Some(offset) {
            SegmentKind::CurrentMatch
        } else {
            SegmentKind::Match
        };
        segments.push(HighlightSegment {
            text: chars[start..end].iter().collect(),
            kind,
        });
        last = end;
    }

    if last < chars.len() {
        segments.push(HighlightSegment {
            text: chars[last..].iter().collect(),
            kind: SegmentKind::Plain,
        });
    }
    segments
}
