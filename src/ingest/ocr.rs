//! OCR collaborator interface and the command-line Tesseract implementation.
//!
//! [`OcrEngine`] is object-safe and `Send + Sync` so the pipeline can hold it
//! behind an `Arc<dyn OcrEngine>`.  [`TesseractCli`] pipes the image bytes to
//! the `tesseract` executable and parses its TSV output, which carries a
//! per-word confidence.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::IngestConfig;

use super::error::IngestError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A progress notification emitted while recognition runs.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrProgress {
    /// Short description of the current stage.
    pub status: String,
    /// Completion in `[0, 1]`.
    pub progress: f32,
}

impl OcrProgress {
    pub fn new(status: impl Into<String>, progress: f32) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }
}

/// Recognised text plus the engine's own confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    /// Confidence as reported by the engine, in percent (0 – 100).
    pub confidence_percent: f32,
}

/// Callback receiving [`OcrProgress`] notifications.
pub type ProgressSink<'a> = &'a (dyn Fn(OcrProgress) + Send + Sync);

// ---------------------------------------------------------------------------
// OcrEngine trait
// ---------------------------------------------------------------------------

/// Asynchronous image-to-text recognition.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognise the text in `image` using the given Tesseract-style
    /// `language` code (e.g. `"eng"`).
    async fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: ProgressSink<'_>,
    ) -> Result<OcrOutput, IngestError>;
}

// Compile-time assertion: Box<dyn OcrEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn OcrEngine>) {}
};

// ---------------------------------------------------------------------------
// TesseractCli
// ---------------------------------------------------------------------------

/// Runs `tesseract stdin stdout -l <lang> tsv` and parses the result.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.tesseract_command.clone())
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: ProgressSink<'_>,
    ) -> Result<OcrOutput, IngestError> {
        progress(OcrProgress::new("starting tesseract", 0.0));

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", language, "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| IngestError::Ocr(format!("failed to run {}: {e}", self.command)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| IngestError::Internal("tesseract stdin unavailable".into()))?;

        // Feed the image from a separate task so a full stdout pipe can never
        // block the write.
        let data = image.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&data).await;
            drop(stdin);
            result
        });

        progress(OcrProgress::new("recognizing text", 0.5));

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| IngestError::Ocr(format!("tesseract did not finish: {e}")))?;

        let written = writer.await;

        // A rejected image makes tesseract exit early, so the writer sees a
        // broken pipe; stderr carries the real reason.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IngestError::Ocr(format!("tesseract failed: {}", stderr.trim())));
        }

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(IngestError::Ocr(format!("failed to send image: {e}"))),
            Err(e) => return Err(IngestError::Internal(e.to_string())),
        }

        progress(OcrProgress::new("recognizing text", 1.0));
        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

// ---------------------------------------------------------------------------
// TSV parsing
// ---------------------------------------------------------------------------

/// Tesseract TSV level for individual words.
const WORD_LEVEL: &str = "5";

/// Rebuild plain text and a mean word confidence from Tesseract TSV output.
///
/// Words on the same line are joined with spaces, lines with `\n`, and a new
/// block or paragraph starts after a blank line.  Rows with a negative
/// confidence (layout rows) do not count towards the mean.
pub fn parse_tsv(tsv: &str) -> OcrOutput {
    let mut text = String::new();
    let mut last_line: Option<(&str, &str, &str)> = None;
    let mut conf_sum = 0.0f32;
    let mut conf_n = 0usize;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != WORD_LEVEL {
            continue;
        }
        let word = cols[11].trim();
        if word.is_empty() {
            continue;
        }

        let (block, par, line) = (cols[2], cols[3], cols[4]);
        match last_line {
            None => {}
            Some((b, p, _)) if b != block || p != par => text.push_str("\n\n"),
            Some((_, _, l)) if l != line => text.push('\n'),
            Some(_) => text.push(' '),
        }
        text.push_str(word);
        last_line = Some((block, par, line));

        if let Ok(conf) = cols[10].trim().parse::<f32>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_n += 1;
            }
        }
    }

    let confidence_percent = if conf_n == 0 {
        0.0
    } else {
        conf_sum / conf_n as f32
    };

    OcrOutput {
        text,
        confidence_percent,
    }
}

// ---------------------------------------------------------------------------
// MockOcrEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response, optionally after a
/// delay measured on the tokio clock.
#[cfg(test)]
pub struct MockOcrEngine {
    response: Result<OcrOutput, IngestError>,
    delay: std::time::Duration,
    pub seen_language: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MockOcrEngine {
    pub fn ok(text: impl Into<String>, confidence_percent: f32) -> Self {
        Self {
            response: Ok(OcrOutput {
                text: text.into(),
                confidence_percent,
            }),
            delay: std::time::Duration::ZERO,
            seen_language: std::sync::Mutex::new(None),
        }
    }

    pub fn err(error: IngestError) -> Self {
        Self {
            response: Err(error),
            delay: std::time::Duration::ZERO,
            seen_language: std::sync::Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[cfg(test)]
#[async_trait]
impl OcrEngine for MockOcrEngine {
    async fn recognize(
        &self,
        _image: &[u8],
        language: &str,
        progress: ProgressSink<'_>,
    ) -> Result<OcrOutput, IngestError> {
        *self.seen_language.lock().unwrap() = Some(language.to_string());
        progress(OcrProgress::new("recognizing text", 0.0));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        progress(OcrProgress::new("recognizing text", 1.0));
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
