//! Document search.
//!
//! * [`SearchEngine`]: owns the [`SearchState`]: query, ordered matches and
//!   a cyclic navigation cursor.
//! * [`find_matches`]: the overlap-permitting, case-insensitive scan with
//!   context previews.
//! * [`highlight_segments`]: plain / match / current-match runs for the view.

pub mod engine;
pub mod highlight;

pub use engine::{
    find_matches, NavigateDirection, SearchEngine, SearchMatch, SearchState, ELLIPSIS,
};
pub use highlight::{highlight_segments, HighlightSegment, SegmentKind};
