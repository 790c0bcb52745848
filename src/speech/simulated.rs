//! Headless speech device.
//!
//! [`SimulatedSpeech`] "speaks" by waiting out the estimated narration time
//! on tokio timers.  It honours pause, resume and cancel, which makes it a
//! faithful stand-in for a real synthesizer when running in a terminal or
//! under test.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::backend::{BackendEvent, NarrationEvents, SpeechBackend, Utterance};
use super::timing::WordTiming;
use super::voice::Voice;
use crate::document::word_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Running,
    Paused,
    Cancelled,
}

struct Narration {
    control: watch::Sender<Control>,
    task: JoinHandle<()>,
}

impl Drop for Narration {
    fn drop(&mut self) {
        self.control.send_replace(Control::Cancelled);
        self.task.abort();
    }
}

pub struct SimulatedSpeech {
    timing: WordTiming,
    voices: Vec<Voice>,
    current: Mutex<Option<Narration>>,
}

impl SimulatedSpeech {
    pub fn new(timing: WordTiming) -> Self {
        Self {
            timing,
            voices: vec![Voice::new("Simulated English", "en-US", true)],
            current: Mutex::new(None),
        }
    }

    fn control(&self, control: Control) {
        if let Ok(current) = self.current.lock() {
            if let Some(narration) = current.as_ref() {
                narration.control.send_replace(control);
            }
        }
    }
}

impl Default for SimulatedSpeech {
    fn default() -> Self {
        Self::new(WordTiming::default())
    }
}

impl SpeechBackend for SimulatedSpeech {
    fn is_available(&self) -> bool {
        true
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance, events: NarrationEvents) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(e) => {
                log::warn!("speech: simulated device needs a tokio runtime: {e}");
                events.emit(BackendEvent::Error("no runtime".into()));
                return;
            }
        };

        let duration = self
            .timing
            .total(word_count(&utterance.text), utterance.rate);
        log::debug!(
            "speech: simulating {:?} of narration for {:?}",
            duration,
            events.generation()
        );

        let (tx, rx) = watch::channel(Control::Running);
        let task = handle.spawn(narrate(duration, rx, events));

        if let Ok(mut current) = self.current.lock() {
            // Dropping the previous narration cancels it.
            *current = Some(Narration { control: tx, task });
        }
    }

    fn pause(&self) {
        self.control(Control::Paused);
    }

    fn resume(&self) {
        self.control(Control::Running);
    }

    fn cancel(&self) {
        if let Ok(mut current) = self.current.lock() {
            current.take();
        }
    }
}

async fn narrate(total: Duration, mut control: watch::Receiver<Control>, events: NarrationEvents) {
    events.emit(BackendEvent::Started);

    let mut remaining = total;
    let mut paused = false;

    loop {
        let now = *control.borrow_and_update();
        match now {
            Control::Cancelled => return,
            Control::Paused => {
                if !paused {
                    paused = true;
                    events.emit(BackendEvent::Paused);
                }
                if control.changed().await.is_err() {
                    return;
                }
            }
            Control::Running => {
                if paused {
                    paused = false;
                    events.emit(BackendEvent::Resumed);
                }
                let started = Instant::now();
                tokio::select! {
                    _ = tokio::time::sleep(remaining) => {
                        events.emit(BackendEvent::Ended);
                        return;
                    }
                    changed = control.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        remaining = remaining.saturating_sub(started.elapsed());
                    }
                }
            }
        }
    }
}
