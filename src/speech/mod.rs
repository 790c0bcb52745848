//! Text-to-speech playback with a word-synchronised cursor.
//!
//! * [`SpeechEngine`]: owns the [`PlaybackState`] and reconciles device
//!   reports with local pause / resume / stop.
//! * [`SpeechBackend`]: the device seam.  [`SimulatedSpeech`] narrates on
//!   tokio timers; [`NoSpeech`] stands in when synthesis is unavailable.
//! * [`WordTiming`]: the per-word duration estimate driving the cursor.

pub mod backend;
pub mod engine;
pub mod simulated;
pub mod timing;
pub mod voice;

pub use backend::{
    BackendEvent, EngineEvent, Generation, NarrationEvents, NoSpeech, SpeechBackend, Utterance,
};
pub use engine::{PlaybackState, PlaybackStatus, SpeechEngine, SpeechError};
pub use simulated::SimulatedSpeech;
pub use timing::{clamp_rate, clamp_volume, WordTiming, DEFAULT_WORDS_PER_MINUTE, MAX_RATE, MIN_RATE};
pub use voice::{select_default_voice, Voice};

#[cfg(test)]
pub use backend::{BackendCall, MockSpeechBackend};
