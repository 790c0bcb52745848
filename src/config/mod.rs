//! Configuration module for the document reader.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each engine,
//! `AppPaths` for the cross-platform config directory, and TOML persistence
//! via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, BookmarkConfig, IngestConfig, SearchConfig, SpeechConfig, SummaryConfig,
};
