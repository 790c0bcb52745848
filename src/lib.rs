//! Accessible document reader.
//!
//! Upload an image or PDF, extract its text, then listen to it with the
//! current word highlighted, search it, and bookmark it.

pub mod bookmarks;
pub mod config;
pub mod document;
pub mod ingest;
pub mod reader;
pub mod search;
pub mod speech;
