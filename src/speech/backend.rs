//! The speech device seam.
//!
//! A [`SpeechBackend`] speaks one utterance at a time and reports lifecycle
//! transitions through the [`NarrationEvents`] handle it was given.  Every
//! report is tagged with the generation of the narration that produced it, so
//! the engine can tell a late report from a cancelled narration apart from a
//! current one.

use tokio::sync::mpsc;

use super::voice::Voice;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Identifies one narration.  A new generation begins with every `speak`;
/// `stop` retires the active one without starting another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub(crate) u64);

/// Lifecycle transition reported by the speech device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Started,
    Paused,
    Resumed,
    Ended,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EventKind {
    Backend(BackendEvent),
    /// Cursor tick from the word ticker with the given id.
    Tick { ticker: u64 },
}

/// An event queued for the speech engine.
///
/// Obtained from [`SpeechEngine::next_event`](super::SpeechEngine::next_event)
/// and handed back to
/// [`SpeechEngine::handle_event`](super::SpeechEngine::handle_event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub(crate) generation: Generation,
    pub(crate) kind: EventKind,
}

impl EngineEvent {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Sending half given to the backend for one narration.
#[derive(Debug, Clone)]
pub struct NarrationEvents {
    generation: Generation,
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl NarrationEvents {
    pub(crate) fn new(generation: Generation, tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Report a lifecycle transition.  Dropped silently once the engine is
    /// gone.
    pub fn emit(&self, event: BackendEvent) {
        let queued = EngineEvent {
            generation: self.generation,
            kind: EventKind::Backend(event),
        };
        if let Err(e) = self.tx.send(queued) {
            log::debug!("speech: engine gone, dropping {:?}", e.0.kind);
        }
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// One utterance handed to the speech device.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub volume: f32,
    pub voice: Option<Voice>,
}

/// Text-to-speech device.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` between the engine and the reader.  All methods return immediately;
/// progress is reported through [`NarrationEvents`].
pub trait SpeechBackend: Send + Sync {
    /// Whether speech synthesis exists on this device at all.
    fn is_available(&self) -> bool;

    fn voices(&self) -> Vec<Voice>;

    /// Start speaking `utterance`.  The device should report
    /// [`BackendEvent::Started`] and eventually [`BackendEvent::Ended`] or
    /// [`BackendEvent::Error`].
    fn speak(&self, utterance: Utterance, events: NarrationEvents);

    fn pause(&self);

    fn resume(&self);

    /// Abandon whatever is being spoken.  Safe to call when idle.
    fn cancel(&self);
}

// Ensure the trait stays object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechBackend>) {}
};

// ---------------------------------------------------------------------------
// NoSpeech
// ---------------------------------------------------------------------------

/// Backend for devices without speech synthesis.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeech;

impl SpeechBackend for NoSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&self, _utterance: Utterance, _events: NarrationEvents) {}

    fn pause(&self) {}

    fn resume(&self) {}

    fn cancel(&self) {}
}

// ---------------------------------------------------------------------------
// MockSpeechBackend (test only)
// ---------------------------------------------------------------------------

/// Call recorded by [`MockSpeechBackend`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Speak(String),
    Pause,
    Resume,
    Cancel,
}

/// Scripted backend: records calls and lets the test emit device events for
/// any narration it was handed.
#[cfg(test)]
pub struct MockSpeechBackend {
    available: bool,
    voices: std::sync::Mutex<Vec<Voice>>,
    calls: std::sync::Mutex<Vec<BackendCall>>,
    narrations: std::sync::Mutex<Vec<(Utterance, NarrationEvents)>>,
}

#[cfg(test)]
impl MockSpeechBackend {
    pub fn new() -> Self {
        Self {
            available: true,
            voices: std::sync::Mutex::new(vec![
                Voice::new("Thomas", "fr-FR", false),
                Voice::new("Alex", "en-US", true),
            ]),
            calls: std::sync::Mutex::new(Vec::new()),
            narrations: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            voices: std::sync::Mutex::new(Vec::new()),
            ..Self::new()
        }
    }

    /// Available, but the voice list has not been published yet.
    pub fn without_voices() -> Self {
        Self {
            voices: std::sync::Mutex::new(Vec::new()),
            ..Self::new()
        }
    }

    /// Replace the published voice list.
    pub fn set_voices(&self, voices: Vec<Voice>) {
        *self.voices.lock().unwrap() = voices;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.narrations
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect()
    }

    /// Events handle for the `n`-th `speak` call.
    pub fn narration(&self, n: usize) -> NarrationEvents {
        self.narrations.lock().unwrap()[n].1.clone()
    }

    /// Emit `event` for the most recent `speak` call.
    pub fn emit(&self, event: BackendEvent) {
        let narrations = self.narrations.lock().unwrap();
        narrations
            .last()
            .expect("no narration started")
            .1
            .emit(event);
    }
}

#[cfg(test)]
impl SpeechBackend for MockSpeechBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn speak(&self, utterance: Utterance, events: NarrationEvents) {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Speak(utterance.text.clone()));
        self.narrations.lock().unwrap().push((utterance, events));
    }

    fn pause(&self) {
        self.calls.lock().unwrap().push(BackendCall::Pause);
    }

    fn resume(&self) {
        self.calls.lock().unwrap().push(BackendCall::Resume);
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(BackendCall::Cancel);
    }
}
