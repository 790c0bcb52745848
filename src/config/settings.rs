//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to each engine
//! at construction.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Narration defaults for the speech playback engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// When `false` the reader starts without a speech device and every
    /// narration request fails with `Unsupported`.
    pub enabled: bool,
    /// Speech rate multiplier (0.5 – 2.0).
    pub rate: f32,
    /// Output volume (0.0 – 1.0).
    pub volume: f32,
    /// Preferred voice name.  `None` picks the platform default.
    pub voice: Option<String>,
    /// Words per minute spoken at `rate = 1.0`; drives the word-cursor
    /// estimate.
    pub base_words_per_minute: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 1.0,
            volume: 1.0,
            voice: None,
            base_words_per_minute: 150.0,
        }
    }
}

// ---------------------------------------------------------------------------
// IngestConfig
// ---------------------------------------------------------------------------

/// Settings for the OCR / PDF ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Tesseract language code passed to the OCR engine.
    pub ocr_language: String,
    /// Executable used by the command-line OCR engine.
    pub tesseract_command: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            ocr_language: "eng".into(),
            tesseract_command: "tesseract".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// Search preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Characters of context kept on each side of a match.
    pub context_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { context_chars: 50 }
    }
}

// ---------------------------------------------------------------------------
// BookmarkConfig
// ---------------------------------------------------------------------------

/// Bookmark snippet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkConfig {
    /// Characters of document text copied into a bookmark snippet.
    pub snippet_chars: usize,
}

impl Default for BookmarkConfig {
    fn default() -> Self {
        Self { snippet_chars: 100 }
    }
}

// ---------------------------------------------------------------------------
// SummaryConfig
// ---------------------------------------------------------------------------

/// Document summary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Silent reading speed used for the estimated reading time.
    pub reading_words_per_minute: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            reading_words_per_minute: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use doc_reader::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Narration defaults.
    pub speech: SpeechConfig,
    /// OCR / PDF extraction settings.
    pub ingest: IngestConfig,
    /// Search preview settings.
    pub search: SearchConfig,
    /// Bookmark snippet settings.
    pub bookmarks: BookmarkConfig,
    /// Document summary settings.
    pub summary: SummaryConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.speech.enabled, loaded.speech.enabled);
        assert_eq!(original.speech.rate, loaded.speech.rate);
        assert_eq!(original.speech.volume, loaded.speech.volume);
        assert_eq!(original.speech.voice, loaded.speech.voice);
        assert_eq!(
            original.speech.base_words_per_minute,
            loaded.speech.base_words_per_minute
        );
        assert_eq!(original.ingest.ocr_language, loaded.ingest.ocr_language);
        assert_eq!(original.search.context_chars, loaded.search.context_chars);
        assert_eq!(
            original.bookmarks.snippet_chars,
            loaded.bookmarks.snippet_chars
        );
        assert_eq!(
            original.summary.reading_words_per_minute,
            loaded.summary.reading_words_per_minute
        );
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.ingest.ocr_language, "eng");
        assert!(config.speech.voice.is_none());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.speech.enabled);
        assert_eq!(cfg.speech.rate, 1.0);
        assert_eq!(cfg.speech.volume, 1.0);
        assert_eq!(cfg.speech.base_words_per_minute, 150.0);
        assert_eq!(cfg.ingest.ocr_language, "eng");
        assert_eq!(cfg.ingest.tesseract_command, "tesseract");
        assert_eq!(cfg.search.context_chars, 50);
        assert_eq!(cfg.bookmarks.snippet_chars, 100);
        assert_eq!(cfg.summary.reading_words_per_minute, 200);
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[speech]\nrate = 1.5\nvoice = \"Alex\"\n").expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.speech.rate, 1.5);
        assert_eq!(cfg.speech.voice.as_deref(), Some("Alex"));
        assert_eq!(cfg.speech.volume, 1.0);
        assert_eq!(cfg.search.context_chars, 50);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.speech.enabled = false;
        cfg.speech.rate = 0.75;
        cfg.speech.voice = Some("Samantha".into());
        cfg.ingest.ocr_language = "deu".into();
        cfg.search.context_chars = 20;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert!(!loaded.speech.enabled);
        assert_eq!(loaded.speech.rate, 0.75);
        assert_eq!(loaded.speech.voice.as_deref(), Some("Samantha"));
        assert_eq!(loaded.ingest.ocr_language, "deu");
        assert_eq!(loaded.search.context_chars, 20);
    }
}
