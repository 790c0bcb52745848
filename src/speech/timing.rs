//! Word-duration estimate driving the highlight cursor.
//!
//! The speech device gives no per-word callbacks, so the cursor is advanced
//! on a fixed period derived from the speech rate:
//!
//! ```text
//! words_per_minute = base_wpm × rate          (base_wpm = 150)
//! per_word_ms      = 60 000 / words_per_minute
//! ```
//!
//! The estimate is best effort; drift against the real audio is expected.

use std::time::Duration;

/// Words per minute spoken at `rate = 1.0`.
pub const DEFAULT_WORDS_PER_MINUTE: f32 = 150.0;
/// Slowest accepted speech rate.
pub const MIN_RATE: f32 = 0.5;
/// Fastest accepted speech rate.
pub const MAX_RATE: f32 = 2.0;

/// Clamp a speech rate into `[MIN_RATE, MAX_RATE]`; `None` for NaN/∞.
pub fn clamp_rate(rate: f32) -> Option<f32> {
    rate.is_finite().then(|| rate.clamp(MIN_RATE, MAX_RATE))
}

/// Clamp a volume into `[0, 1]`; `None` for NaN/∞.
pub fn clamp_volume(volume: f32) -> Option<f32> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}

/// Converts a speech rate into a per-word cursor period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordTiming {
    base_words_per_minute: f32,
}

impl WordTiming {
    /// A non-positive or non-finite base speed falls back to
    /// [`DEFAULT_WORDS_PER_MINUTE`].
    pub fn new(base_words_per_minute: f32) -> Self {
        let base_words_per_minute =
            if base_words_per_minute.is_finite() && base_words_per_minute > 0.0 {
                base_words_per_minute
            } else {
                DEFAULT_WORDS_PER_MINUTE
            };
        Self {
            base_words_per_minute,
        }
    }

    pub fn words_per_minute(&self, rate: f32) -> f32 {
        let rate = clamp_rate(rate).unwrap_or(1.0);
        self.base_words_per_minute * rate
    }

    /// Estimated time spent on one word at `rate`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use doc_reader::speech::WordTiming;
    ///
    /// let timing = WordTiming::default();
    /// assert_eq!(timing.per_word(1.0), Duration::from_millis(400));
    /// assert_eq!(timing.per_word(2.0), Duration::from_millis(200));
    /// ```
    pub fn per_word(&self, rate: f32) -> Duration {
        let millis = 60_000.0 / f64::from(self.words_per_minute(rate));
        Duration::from_micros((millis * 1_000.0).round() as u64)
    }

    /// Estimated duration of `words` words at `rate`.
    pub fn total(&self, words: usize, rate: f32) -> Duration {
        self.per_word(rate) * u32::try_from(words).unwrap_or(u32::MAX)
    }
}

impl Default for WordTiming {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_MINUTE)
    }
}
