//! Word-synchronised playback.
//!
//! [`SpeechEngine`] drives a [`SpeechBackend`] and keeps a [`PlaybackState`]
//! whose `current_word_index` follows the narration.  Because the device
//! reports no word boundaries, a ticker advances the cursor every
//! [`WordTiming::per_word`] while playing.
//!
//! Every backend report and every tick is queued on one channel, tagged with
//! the narration [`Generation`] that produced it.  The owner pulls events
//! with [`SpeechEngine::next_event`] (or [`SpeechEngine::process_pending`])
//! and feeds them back through [`SpeechEngine::handle_event`], so all state
//! changes happen on the owner's task:
//!
//! ```text
//!  speak ──► backend ── Started/Paused/Resumed/Ended/Error ─┐
//!                                                           ├─► event queue ─► handle_event
//!  ticker (one at a time) ─────────────── Tick ─────────────┘
//! ```
//!
//! Events whose generation is not the active one are discarded.  This is
//! what keeps a late `Ended` from a cancelled narration from clobbering the
//! narration that replaced it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::backend::{
    BackendEvent, EngineEvent, EventKind, Generation, NarrationEvents, SpeechBackend, Utterance,
};
use super::timing::{clamp_rate, clamp_volume, WordTiming};
use super::voice::{select_default_voice, Voice};
use crate::config::SpeechConfig;
use crate::document::WordSequence;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("Speech synthesis is not supported on this device")]
    Unsupported,
}

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
}

/// Snapshot of the narration as the view should render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Whitespace-split words of the text being (or last) spoken.
    pub words: WordSequence,
    /// `None` until the device confirms it started, and again after the
    /// narration ends or is stopped.
    pub current_word_index: Option<usize>,
    /// Speech rate in `[0.5, 2.0]`.
    pub rate: f32,
    /// Volume in `[0, 1]`.
    pub volume: f32,
    pub voice: Option<Voice>,
}

impl PlaybackState {
    fn new(rate: f32, volume: f32, voice: Option<Voice>) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            words: WordSequence::default(),
            current_word_index: None,
            rate,
            volume,
            voice,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.status == PlaybackStatus::Paused
    }

    /// The word under the cursor, only while playing.
    pub fn highlighted_word(&self) -> Option<&str> {
        if !self.is_playing() {
            return None;
        }
        self.current_word_index.and_then(|i| self.words.get(i))
    }

    /// Fraction of words reached, in `(0, 1]`.  `None` outside a narration.
    pub fn progress(&self) -> Option<f32> {
        let index = self.current_word_index?;
        (index < self.words.len()).then(|| (index + 1) as f32 / self.words.len() as f32)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0, 1.0, None)
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// A running cursor ticker.  Dropping it stops the timer.
struct Ticker {
    id: u64,
    handle: JoinHandle<()>,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// How long a local pause/resume waits for its device confirmation.  A
/// device report arriving later is treated as the device acting on its own.
const ACK_TIMEOUT: Duration = Duration::from_secs(1);

/// A local pause/resume whose device confirmation has not arrived yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAck {
    Pause,
    Resume,
}

// ---------------------------------------------------------------------------
// SpeechEngine
// ---------------------------------------------------------------------------

pub struct SpeechEngine {
    backend: Arc<dyn SpeechBackend>,
    timing: WordTiming,
    state: PlaybackState,

    /// Narration whose events are honoured.  `None` when nothing is in flight.
    active: Option<Generation>,
    next_generation: u64,

    /// At most one live ticker.
    ticker: Option<Ticker>,
    next_ticker_id: u64,

    /// Outstanding confirmations, oldest first, with the time each was issued.
    pending_acks: VecDeque<(PendingAck, Instant)>,

    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl SpeechEngine {
    pub fn new(backend: Arc<dyn SpeechBackend>, config: &SpeechConfig) -> Self {
        let rate = clamp_rate(config.rate).unwrap_or(1.0);
        let volume = clamp_volume(config.volume).unwrap_or(1.0);
        let voice = select_default_voice(&backend.voices(), config.voice.as_deref());
        if let Some(v) = &voice {
            log::info!("speech: using voice {} ({})", v.name, v.lang);
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            timing: WordTiming::new(config.base_words_per_minute),
            state: PlaybackState::new(rate, volume, voice),
            backend,
            active: None,
            next_generation: 0,
            ticker: None,
            next_ticker_id: 0,
            pending_acks: VecDeque::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.backend.voices()
    }

    /// Re-query the device's voices, selecting a default if none is chosen
    /// yet.  Devices may publish their voice list after start-up.
    pub fn refresh_voices(&mut self, preferred: Option<&str>) {
        if self.state.voice.is_none() {
            self.state.voice = select_default_voice(&self.backend.voices(), preferred);
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Speak `text` with the current rate, volume and voice.
    ///
    /// Any narration in flight is cancelled first.  The cursor stays `None`
    /// until the device reports it started.
    pub fn speak(&mut self, text: &str) -> Result<Generation, SpeechError> {
        if !self.backend.is_available() {
            log::warn!("speech: speak requested but synthesis is unavailable");
            return Err(SpeechError::Unsupported);
        }

        self.backend.cancel();
        self.halt_ticker();
        self.pending_acks.clear();

        self.next_generation += 1;
        let generation = Generation(self.next_generation);
        self.active = Some(generation);

        self.state.words = WordSequence::from_text(text);
        self.state.current_word_index = None;
        self.state.status = PlaybackStatus::Idle;

        log::info!(
            "speech: speaking {} words at rate {:.2} ({:?})",
            self.state.words.len(),
            self.state.rate,
            generation
        );

        let utterance = Utterance {
            text: text.to_string(),
            rate: self.state.rate,
            volume: self.state.volume,
            voice: self.state.voice.clone(),
        };
        self.backend.speak(
            utterance,
            NarrationEvents::new(generation, self.events_tx.clone()),
        );
        Ok(generation)
    }

    /// Apply `rate`, `volume` and `voice`, then [`speak`](Self::speak).
    ///
    /// A `voice` of `None` keeps the selected voice; use
    /// [`set_voice`](Self::set_voice) to clear it.  Nothing changes when
    /// synthesis is unavailable.
    pub fn speak_with(
        &mut self,
        text: &str,
        rate: f32,
        volume: f32,
        voice: Option<Voice>,
    ) -> Result<Generation, SpeechError> {
        if !self.backend.is_available() {
            return Err(SpeechError::Unsupported);
        }
        self.set_rate(rate);
        self.set_volume(volume);
        if voice.is_some() {
            self.state.voice = voice;
        }
        self.speak(text)
    }

    /// Pause narration.  Takes effect immediately; no-op unless playing.
    pub fn pause(&mut self) {
        if !self.state.is_playing() {
            log::debug!("speech: pause ignored in {:?}", self.state.status);
            return;
        }
        self.backend.pause();
        self.pending_acks.push_back((PendingAck::Pause, Instant::now()));
        self.halt_ticker();
        self.state.status = PlaybackStatus::Paused;
    }

    /// Resume narration.  Takes effect immediately; no-op unless paused.
    pub fn resume(&mut self) {
        if !self.state.is_paused() {
            log::debug!("speech: resume ignored in {:?}", self.state.status);
            return;
        }
        self.backend.resume();
        self.pending_acks.push_back((PendingAck::Resume, Instant::now()));
        self.state.status = PlaybackStatus::Playing;
        self.start_ticker();
    }

    /// Cancel narration and return to `Idle`.  Safe to call when idle.
    pub fn stop(&mut self) {
        if self.active.take().is_some() {
            self.backend.cancel();
            log::info!("speech: stopped");
        }
        self.halt_ticker();
        self.pending_acks.clear();
        self.state.status = PlaybackStatus::Idle;
        self.state.current_word_index = None;
    }

    /// Clamped into `[0.5, 2.0]`; non-finite values are ignored.  Applies from
    /// the next `speak`.
    pub fn set_rate(&mut self, rate: f32) {
        match clamp_rate(rate) {
            Some(r) => self.state.rate = r,
            None => log::warn!("speech: ignoring invalid rate {rate}"),
        }
    }

    /// Clamped into `[0, 1]`; non-finite values are ignored.  Applies from the
    /// next `speak`.
    pub fn set_volume(&mut self, volume: f32) {
        match clamp_volume(volume) {
            Some(v) => self.state.volume = v,
            None => log::warn!("speech: ignoring invalid volume {volume}"),
        }
    }

    pub fn set_voice(&mut self, voice: Option<Voice>) {
        self.state.voice = voice;
    }

    /// Select the device voice called `name`.  Returns whether one matched.
    pub fn set_voice_by_name(&mut self, name: &str) -> bool {
        match self.backend.voices().into_iter().find(|v| v.name == name) {
            Some(v) => {
                self.state.voice = Some(v);
                true
            }
            None => false,
        }
    }

    /// Speak a short sample in the selected voice.  Does nothing when no
    /// voice is selected.
    pub fn test_voice(&mut self) -> Result<Option<Generation>, SpeechError> {
        let Some(voice) = &self.state.voice else {
            return Ok(None);
        };
        let sample = format!("This is a test of the {} voice.", voice.name);
        self.speak(&sample).map(Some)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Wait for the next queued event.
    pub async fn next_event(&mut self) -> EngineEvent {
        match self.events_rx.recv().await {
            Some(event) => event,
            // The engine holds a sender, so the queue never closes.
            None => std::future::pending().await,
        }
    }

    /// Handle every event already queued.  Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        if self.active != Some(event.generation) {
            log::debug!(
                "speech: discarding {:?} from stale {:?}",
                event.kind,
                event.generation
            );
            return;
        }

        match event.kind {
            EventKind::Tick { ticker } => self.on_tick(ticker),
            EventKind::Backend(BackendEvent::Started) => self.on_started(),
            EventKind::Backend(BackendEvent::Paused) => self.on_device_paused(),
            EventKind::Backend(BackendEvent::Resumed) => self.on_device_resumed(),
            EventKind::Backend(BackendEvent::Ended) => {
                log::info!("speech: narration finished");
                self.finish();
            }
            EventKind::Backend(BackendEvent::Error(message)) => {
                log::warn!("speech: device error: {message}");
                self.stop();
            }
        }
    }

    fn on_started(&mut self) {
        if self.state.status != PlaybackStatus::Idle {
            log::debug!("speech: duplicate start ignored");
            return;
        }
        self.state.status = PlaybackStatus::Playing;
        self.state.current_word_index = (!self.state.words.is_empty()).then_some(0);
        self.start_ticker();
    }

    fn on_device_paused(&mut self) {
        if self.take_ack(PendingAck::Pause) {
            return;
        }
        if self.state.is_playing() {
            log::debug!("speech: device paused on its own");
            self.halt_ticker();
            self.state.status = PlaybackStatus::Paused;
        }
    }

    fn on_device_resumed(&mut self) {
        if self.take_ack(PendingAck::Resume) {
            return;
        }
        if self.state.is_paused() {
            log::debug!("speech: device resumed on its own");
            self.state.status = PlaybackStatus::Playing;
            self.start_ticker();
        }
    }

    /// Consume a pending confirmation of `ack`, if one is outstanding.
    /// Confirmations older than [`ACK_TIMEOUT`] are dropped first.
    fn take_ack(&mut self, ack: PendingAck) -> bool {
        let now = Instant::now();
        self.pending_acks
            .retain(|(_, issued)| now.duration_since(*issued) < ACK_TIMEOUT);
        match self.pending_acks.iter().position(|(p, _)| *p == ack) {
            Some(i) => {
                self.pending_acks.remove(i);
                true
            }
            None => false,
        }
    }

    fn on_tick(&mut self, ticker: u64) {
        if self.ticker.as_ref().map(|t| t.id) != Some(ticker) || !self.state.is_playing() {
            return;
        }
        match (self.state.current_word_index, self.state.words.last_index()) {
            (Some(i), Some(last)) if i < last => {
                self.state.current_word_index = Some(i + 1);
                if i + 1 == last {
                    self.halt_ticker();
                }
            }
            _ => self.halt_ticker(),
        }
    }

    fn finish(&mut self) {
        self.active = None;
        self.halt_ticker();
        self.pending_acks.clear();
        self.state.status = PlaybackStatus::Idle;
        self.state.current_word_index = None;
    }

    // -----------------------------------------------------------------------
    // Ticker
    // -----------------------------------------------------------------------

    /// Start ticking from the current word.  Replaces any live ticker and
    /// does nothing once the cursor is on the last word.
    fn start_ticker(&mut self) {
        self.halt_ticker();

        let (Some(generation), Some(index), Some(last)) = (
            self.active,
            self.state.current_word_index,
            self.state.words.last_index(),
        ) else {
            return;
        };
        if index >= last {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(e) => {
                log::warn!("speech: word cursor needs a tokio runtime: {e}");
                return;
            }
        };

        self.next_ticker_id += 1;
        let id = self.next_ticker_id;
        let period = self.timing.per_word(self.state.rate);
        let first = tokio::time::Instant::now() + period;
        let tx = self.events_tx.clone();

        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            loop {
                interval.tick().await;
                let tick = EngineEvent {
                    generation,
                    kind: EventKind::Tick { ticker: id },
                };
                if tx.send(tick).is_err() {
                    break;
                }
            }
        });
        self.ticker = Some(Ticker { id, handle });
    }

    fn halt_ticker(&mut self) {
        self.ticker = None;
    }
}
