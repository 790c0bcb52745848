//! Reader orchestrator: drives ingestion, playback, search and bookmarks.
//!
//! [`ReaderOrchestrator`] owns every subsystem and reacts to three sources
//! inside one `tokio::select!` loop:
//!
//! ```text
//! ReaderCommand (mpsc) ──┐
//! ingestion results  ────┼─▶ ReaderOrchestrator ──publish──▶ SharedState
//! speech engine events ──┘
//! ```
//!
//! Ingestion runs on its own task so playback and search stay responsive
//! while OCR grinds; its result comes back on an internal channel.  All
//! mutation happens on the orchestrator task, after which a fresh snapshot
//! is written into [`SharedState`].

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::bookmarks::BookmarkStore;
use crate::config::AppConfig;
use crate::document::{Document, DocumentSummary};
use crate::ingest::{IngestError, IngestPipeline};
use crate::search::{NavigateDirection, SearchEngine};
use crate::speech::{PlaybackStatus, SpeechEngine};

use super::state::{lock_state, SharedState};

// ---------------------------------------------------------------------------
// ReaderCommand
// ---------------------------------------------------------------------------

/// User intents accepted by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderCommand {
    /// Extract text from an uploaded file.
    Ingest {
        filename: String,
        bytes: Vec<u8>,
        media_type: String,
    },
    /// Narrate the current document from the start.
    SpeakDocument,
    /// Narrate arbitrary text.
    Speak(String),
    Pause,
    Resume,
    Stop,
    /// Pause when playing, resume when paused, otherwise speak the document.
    TogglePlayback,
    SetRate(f32),
    SetVolume(f32),
    /// Select a voice by name.
    SetVoice(String),
    TestVoice,
    Search(String),
    Navigate(NavigateDirection),
    ClearSearch,
    /// Bookmark the current document.
    AddBookmark,
    RemoveBookmark(String),
}

type IngestOutcome = Result<Document, IngestError>;

// ---------------------------------------------------------------------------
// ReaderOrchestrator
// ---------------------------------------------------------------------------

/// Create with [`ReaderOrchestrator::new`], then call [`run`](Self::run)
/// inside a tokio task.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use doc_reader::config::AppConfig;
/// use doc_reader::ingest::{IngestPipeline, LopdfExtractor, TesseractCli};
/// use doc_reader::reader::{new_shared_state, ReaderCommand, ReaderOrchestrator};
/// use doc_reader::speech::{SimulatedSpeech, SpeechEngine};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let shared_state = new_shared_state();
/// let ingest = IngestPipeline::new(
///     Arc::new(TesseractCli::from_config(&config.ingest)),
///     Arc::new(LopdfExtractor::new()),
///     &config.ingest,
/// );
/// let speech = SpeechEngine::new(Arc::new(SimulatedSpeech::default()), &config.speech);
///
/// let (tx, rx) = tokio::sync::mpsc::channel(16);
/// let orchestrator = ReaderOrchestrator::new(shared_state, ingest, speech, &config);
/// let handle = tokio::spawn(orchestrator.run(rx));
///
/// tx.send(ReaderCommand::SpeakDocument).await.unwrap();
/// drop(tx);
/// handle.await.unwrap();
/// # }
/// ```
pub struct ReaderOrchestrator {
    state: SharedState,
    ingest: Arc<IngestPipeline>,
    speech: SpeechEngine,
    search: SearchEngine,
    bookmarks: BookmarkStore,
    document: Option<Document>,
    reading_words_per_minute: usize,
    /// Configured voice name, honoured once the device lists its voices.
    preferred_voice: Option<String>,
    ingest_pending: bool,
    error_message: Option<String>,
}

impl ReaderOrchestrator {
    pub fn new(
        state: SharedState,
        ingest: IngestPipeline,
        speech: SpeechEngine,
        config: &AppConfig,
    ) -> Self {
        Self {
            state,
            ingest: Arc::new(ingest),
            speech,
            search: SearchEngine::from_config(&config.search),
            bookmarks: BookmarkStore::from_config(&config.bookmarks),
            document: None,
            reading_words_per_minute: config.summary.reading_words_per_minute,
            preferred_voice: config.speech.voice.clone(),
            ingest_pending: false,
            error_message: None,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `commands` is closed.
    ///
    /// An ingestion still in flight when the channel closes is awaited and
    /// applied before narration is stopped and the loop returns.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ReaderCommand>) {
        let (done_tx, mut done_rx) = mpsc::channel::<IngestOutcome>(1);
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command, &done_tx),
                    None => break,
                },
                Some(outcome) = done_rx.recv() => self.handle_ingested(outcome),
                event = self.speech.next_event() => self.speech.handle_event(event),
            }
            self.publish();
        }

        if self.ingest_pending {
            log::debug!("reader: waiting for in-flight ingestion before shutdown");
            if let Some(outcome) = done_rx.recv().await {
                self.handle_ingested(outcome);
            }
        }
        self.speech.stop();
        self.publish();

        log::info!("reader: command channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    fn handle_command(&mut self, command: ReaderCommand, done_tx: &mpsc::Sender<IngestOutcome>) {
        log::debug!("reader: {}", command_name(&command));
        match command {
            ReaderCommand::Ingest {
                filename,
                bytes,
                media_type,
            } => self.start_ingest(filename, bytes, media_type, done_tx),
            ReaderCommand::SpeakDocument => self.speak_document(),
            ReaderCommand::Speak(text) => self.speak(&text),
            ReaderCommand::Pause => self.speech.pause(),
            ReaderCommand::Resume => self.speech.resume(),
            ReaderCommand::Stop => self.speech.stop(),
            ReaderCommand::TogglePlayback => match self.speech.state().status {
                PlaybackStatus::Playing => self.speech.pause(),
                PlaybackStatus::Paused => self.speech.resume(),
                PlaybackStatus::Idle => self.speak_document(),
            },
            ReaderCommand::SetRate(rate) => self.speech.set_rate(rate),
            ReaderCommand::SetVolume(volume) => self.speech.set_volume(volume),
            ReaderCommand::SetVoice(name) => {
                if !self.speech.set_voice_by_name(&name) {
                    log::warn!("reader: no voice named {name:?}");
                }
            }
            ReaderCommand::TestVoice => {
                self.speech.refresh_voices(self.preferred_voice.as_deref());
                match self.speech.test_voice() {
                    Ok(None) => log::warn!("reader: no voice to test"),
                    Ok(Some(_)) => self.error_message = None,
                    Err(e) => self.set_error(e.to_string()),
                }
            }
            ReaderCommand::Search(query) => {
                let text = self.document.as_ref().map(Document::text).unwrap_or("");
                self.search.search(text, &query);
            }
            ReaderCommand::Navigate(direction) => {
                self.search.navigate(direction);
            }
            ReaderCommand::ClearSearch => self.search.clear(),
            ReaderCommand::AddBookmark => {
                let text = self.document.as_ref().map(Document::text).unwrap_or("");
                if self.bookmarks.add(text).is_none() {
                    log::debug!("reader: nothing to bookmark");
                }
            }
            ReaderCommand::RemoveBookmark(id) => {
                if !self.bookmarks.remove(&id) {
                    log::debug!("reader: no bookmark {id}");
                }
            }
        }
    }

    fn start_ingest(
        &mut self,
        filename: String,
        bytes: Vec<u8>,
        media_type: String,
        done_tx: &mpsc::Sender<IngestOutcome>,
    ) {
        if self.ingest_pending {
            log::warn!("reader: ingestion already in progress, ignoring {filename}");
            return;
        }
        self.ingest_pending = true;
        self.error_message = None;

        let pipeline = Arc::clone(&self.ingest);
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::spawn(async move {
                pipeline.ingest(&filename, &bytes, &media_type).await
            })
            .await
            .unwrap_or_else(|e| Err(IngestError::Internal(e.to_string())));

            if done_tx.send(outcome).await.is_err() {
                log::debug!("reader: orchestrator gone, dropping ingestion result");
            }
        });
    }

    fn handle_ingested(&mut self, outcome: IngestOutcome) {
        self.ingest_pending = false;
        match outcome {
            Ok(document) => self.load_document(document),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Replace the current document.  Narration of the old one stops and its
    /// search results are discarded.
    fn load_document(&mut self, document: Document) {
        self.speech.stop();
        self.search.clear();

        let summary = DocumentSummary::of(&document, self.reading_words_per_minute);
        log::info!(
            "reader: loaded {} ({} words, {} to read)",
            document.filename(),
            summary.word_count,
            summary.reading_time_label()
        );

        {
            let mut st = lock_state(&self.state);
            st.document = Some(document.clone());
            st.summary = Some(summary);
        }
        self.document = Some(document);
    }

    fn speak_document(&mut self) {
        let text = match &self.document {
            Some(document) if !document.text().trim().is_empty() => document.text().to_string(),
            _ => {
                log::debug!("reader: no document text to speak");
                return;
            }
        };
        self.speak(&text);
    }

    fn speak(&mut self, text: &str) {
        self.speech.refresh_voices(self.preferred_voice.as_deref());
        match self.speech.speak(text) {
            Ok(_) => self.error_message = None,
            Err(e) => self.set_error(e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_error(&mut self, message: String) {
        log::error!("reader error: {message}");
        self.error_message = Some(message);
    }

    fn publish(&self) {
        let mut st = lock_state(&self.state);
        st.is_processing = self.ingest_pending;
        st.playback = self.speech.state().clone();
        st.search = self.search.state().clone();
        st.bookmarks = self.bookmarks.list().to_vec();
        st.speech_available = self.speech.is_available();
        st.error_message = self.error_message.clone();
    }
}

/// Command name without its payload, for logging.
fn command_name(command: &ReaderCommand) -> &'static str {
    match command {
        ReaderCommand::Ingest { .. } => "Ingest",
        ReaderCommand::SpeakDocument => "SpeakDocument",
        ReaderCommand::Speak(_) => "Speak",
        ReaderCommand::Pause => "Pause",
        ReaderCommand::Resume => "Resume",
        ReaderCommand::Stop => "Stop",
        ReaderCommand::TogglePlayback => "TogglePlayback",
        ReaderCommand::SetRate(_) => "SetRate",
        ReaderCommand::SetVolume(_) => "SetVolume",
        ReaderCommand::SetVoice(_) => "SetVoice",
        ReaderCommand::TestVoice => "TestVoice",
        ReaderCommand::Search(_) => "Search",
        ReaderCommand::Navigate(_) => "Navigate",
        ReaderCommand::ClearSearch => "ClearSearch",
        ReaderCommand::AddBookmark => "AddBookmark",
        ReaderCommand::RemoveBookmark(_) => "RemoveBookmark",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ExtractionStatus;
    use crate::ingest::{MockOcrEngine, MockPdfExtractor, OcrEngine, PdfExtractor};
    use crate::reader::state::new_shared_state;
    use crate::speech::{BackendCall, BackendEvent, MockSpeechBackend, Voice};
    use std::time::Duration;
    use tokio::task::JoinHandle;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    const PDF_TEXT: &str = "The quick brown fox jumps over the lazy dog";

    struct Harness {
        tx: mpsc::Sender<ReaderCommand>,
        state: SharedState,
        backend: Arc<MockSpeechBackend>,
        handle: JoinHandle<()>,
    }

    impl Harness {
        fn with(ocr: MockOcrEngine, backend: MockSpeechBackend) -> Self {
            Self::configured(AppConfig::default(), ocr, backend)
        }

        fn configured(config: AppConfig, ocr: MockOcrEngine, backend: MockSpeechBackend) -> Self {
            let state = new_shared_state();
            let ocr: Arc<dyn OcrEngine> = Arc::new(ocr);
            let pdf: Arc<dyn PdfExtractor> = Arc::new(MockPdfExtractor::pages(&[PDF_TEXT]));
            let ingest = IngestPipeline::new(ocr, pdf, &config.ingest);
            let backend = Arc::new(backend);
            let speech = SpeechEngine::new(backend.clone(), &config.speech);

            let (tx, rx) = mpsc::channel(16);
            let orc = ReaderOrchestrator::new(Arc::clone(&state), ingest, speech, &config);
            let handle = tokio::spawn(orc.run(rx));
            Self {
                tx,
                state,
                backend,
                handle,
            }
        }

        fn new() -> Self {
            Self::with(
                MockOcrEngine::ok("hello from the scanner", 80.0),
                MockSpeechBackend::new(),
            )
        }

        /// Send `command` and let the runtime go idle.
        async fn send(&self, command: ReaderCommand) {
            self.tx.send(command).await.unwrap();
            settle().await;
        }

        async fn load_pdf(&self) {
            self.send(pdf_upload("doc.pdf")).await;
        }

        async fn shutdown(self) -> SharedState {
            drop(self.tx);
            self.handle.await.unwrap();
            self.state
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn pdf_upload(name: &str) -> ReaderCommand {
        ReaderCommand::Ingest {
            filename: name.into(),
            bytes: b"%PDF-1.4".to_vec(),
            media_type: "application/pdf".into(),
        }
    }

    fn image_upload(name: &str) -> ReaderCommand {
        ReaderCommand::Ingest {
            filename: name.into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
            media_type: "image/png".into(),
        }
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn pdf_ingestion_publishes_document_and_summary() {
        let h = Harness::new();
        h.load_pdf().await;

        let state = h.shutdown().await;
        let st = lock_state(&state);
        let doc = st.document.as_ref().unwrap();
        assert_eq!(doc.filename(), "doc.pdf");
        assert_eq!(doc.text(), PDF_TEXT);
        assert_eq!(doc.status(), &ExtractionStatus::Extracted);
        let summary = st.summary.unwrap();
        assert_eq!(summary.word_count, 9);
        assert_eq!(summary.reading_time_label(), "1 min");
        assert!(!st.is_processing);
        assert!(st.speech_available);
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_media_type_surfaces_error() {
        let h = Harness::new();
        h.send(ReaderCommand::Ingest {
            filename: "notes.txt".into(),
            bytes: b"plain".to_vec(),
            media_type: "text/plain".into(),
        })
        .await;

        let state = h.shutdown().await;
        let st = lock_state(&state);
        assert!(st.document.is_none());
        assert_eq!(
            st.error_message.as_deref(),
            Some("Unsupported media type: text/plain")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn processing_flag_is_set_while_ingesting() {
        let h = Harness::with(
            MockOcrEngine::ok("slow text", 90.0).with_delay(Duration::from_secs(2)),
            MockSpeechBackend::new(),
        );
        h.send(image_upload("scan.png")).await;
        assert!(lock_state(&h.state).is_processing);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let st = lock_state(&h.state);
        assert!(!st.is_processing);
        assert_eq!(st.document.as_ref().unwrap().text(), "slow text");
    }

    #[tokio::test(start_paused = true)]
    async fn second_ingest_while_pending_is_rejected() {
        let h = Harness::with(
            MockOcrEngine::ok("first scan", 90.0).with_delay(Duration::from_secs(2)),
            MockSpeechBackend::new(),
        );
        h.send(image_upload("first.png")).await;
        h.send(image_upload("second.png")).await;

        let state = h.shutdown().await;
        let st = lock_state(&state);
        assert_eq!(st.document.as_ref().unwrap().filename(), "first.png");
        assert!(!st.is_processing);
    }

    #[tokio::test(start_paused = true)]
    async fn ocr_failure_loads_fallback_document() {
        let h = Harness::with(
            MockOcrEngine::err(IngestError::Ocr("engine crashed".into())),
            MockSpeechBackend::new(),
        );
        h.send(image_upload("bad.png")).await;

        let state = h.shutdown().await;
        let st = lock_state(&state);
        let doc = st.document.as_ref().unwrap();
        assert!(doc.status().is_failed());
        assert!(doc.text().contains("bad.png"));
        assert_eq!(doc.confidence(), 0.0);
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn speak_document_highlights_words() {
        let h = Harness::new();
        h.load_pdf().await;
        h.send(ReaderCommand::SpeakDocument).await;
        assert_eq!(h.backend.utterances()[0].text, PDF_TEXT);

        h.backend.emit(BackendEvent::Started);
        settle().await;
        {
            let st = lock_state(&h.state);
            assert_eq!(st.playback.status, PlaybackStatus::Playing);
            assert_eq!(st.playback.highlighted_word(), Some("The"));
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            lock_state(&h.state).playback.highlighted_word(),
            Some("quick")
        );

        h.backend.emit(BackendEvent::Ended);
        settle().await;
        let st = lock_state(&h.state);
        assert_eq!(st.playback.status, PlaybackStatus::Idle);
        assert_eq!(st.playback.current_word_index, None);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_cycles_through_playback_states() {
        let h = Harness::new();
        h.load_pdf().await;

        h.send(ReaderCommand::TogglePlayback).await;
        h.backend.emit(BackendEvent::Started);
        settle().await;
        assert_eq!(lock_state(&h.state).status_label(), "Playing");

        h.send(ReaderCommand::TogglePlayback).await;
        assert_eq!(lock_state(&h.state).status_label(), "Paused");

        h.send(ReaderCommand::TogglePlayback).await;
        assert_eq!(lock_state(&h.state).status_label(), "Playing");

        h.send(ReaderCommand::Stop).await;
        assert_eq!(lock_state(&h.state).status_label(), "Ready");
    }

    #[tokio::test(start_paused = true)]
    async fn new_document_stops_playback_and_clears_search() {
        let h = Harness::new();
        h.load_pdf().await;
        h.send(ReaderCommand::Search("the".into())).await;
        h.send(ReaderCommand::SpeakDocument).await;
        h.backend.emit(BackendEvent::Started);
        settle().await;
        {
            let st = lock_state(&h.state);
            assert_eq!(st.search.matches.len(), 2);
            assert!(st.playback.is_playing());
        }

        h.send(image_upload("next.png")).await;

        let st = lock_state(&h.state);
        assert_eq!(st.document.as_ref().unwrap().filename(), "next.png");
        assert_eq!(st.playback.status, PlaybackStatus::Idle);
        assert!(st.search.matches.is_empty());
        assert_eq!(st.search.current_index, None);
        assert_eq!(h.backend.calls().last(), Some(&BackendCall::Cancel));
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_speech_sets_error() {
        let h = Harness::with(
            MockOcrEngine::ok("text", 90.0),
            MockSpeechBackend::unavailable(),
        );
        h.load_pdf().await;
        h.send(ReaderCommand::SpeakDocument).await;

        let state = h.shutdown().await;
        let st = lock_state(&state);
        assert!(!st.speech_available);
        assert_eq!(st.playback.status, PlaybackStatus::Idle);
        assert_eq!(
            st.error_message.as_deref(),
            Some("Speech synthesis is not supported on this device")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn speak_without_document_is_ignored() {
        let h = Harness::new();
        h.send(ReaderCommand::SpeakDocument).await;
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn settings_apply_to_next_utterance() {
        let h = Harness::new();
        h.send(ReaderCommand::SetRate(1.5)).await;
        h.send(ReaderCommand::SetVolume(0.25)).await;
        h.send(ReaderCommand::SetVoice("Thomas".into())).await;
        h.send(ReaderCommand::TestVoice).await;

        let utterance = &h.backend.utterances()[0];
        assert_eq!(utterance.text, "This is a test of the Thomas voice.");
        assert_eq!(utterance.rate, 1.5);
        assert_eq!(utterance.volume, 0.25);
        assert_eq!(utterance.voice.as_ref().unwrap().lang, "fr-FR");
    }

    #[tokio::test(start_paused = true)]
    async fn voices_published_late_are_picked_up() {
        let h = Harness::with(
            MockOcrEngine::ok("text", 90.0),
            MockSpeechBackend::without_voices(),
        );
        h.send(ReaderCommand::TestVoice).await;
        assert!(h.backend.utterances().is_empty());

        h.backend.set_voices(vec![
            Voice::new("Thomas", "fr-FR", false),
            Voice::new("Alex", "en-US", true),
        ]);
        h.send(ReaderCommand::TestVoice).await;

        let utterances = h.backend.utterances();
        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].text, "This is a test of the Alex voice.");
        assert_eq!(lock_state(&h.state).playback.voice.as_ref().unwrap().name, "Alex");
    }

    #[tokio::test(start_paused = true)]
    async fn narration_uses_configured_voice_once_listed() {
        let mut config = AppConfig::default();
        config.speech.voice = Some("Thomas".into());
        let h = Harness::configured(
            config,
            MockOcrEngine::ok("text", 90.0),
            MockSpeechBackend::without_voices(),
        );
        h.backend.set_voices(vec![
            Voice::new("Thomas", "fr-FR", false),
            Voice::new("Alex", "en-US", true),
        ]);
        h.send(ReaderCommand::Speak("bonjour".into())).await;

        let utterance = &h.backend.utterances()[0];
        assert_eq!(utterance.voice.as_ref().unwrap().name, "Thomas");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_narration() {
        let h = Harness::new();
        h.send(ReaderCommand::Speak("one two three".into())).await;
        h.backend.emit(BackendEvent::Started);
        settle().await;

        let backend = Arc::clone(&h.backend);
        let state = h.shutdown().await;
        assert_eq!(lock_state(&state).playback.status, PlaybackStatus::Idle);
        assert_eq!(backend.calls().last(), Some(&BackendCall::Cancel));
    }

    // -----------------------------------------------------------------------
    // Search & bookmarks
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn search_and_navigate_cycle() {
        let h = Harness::new();
        h.load_pdf().await;
        h.send(ReaderCommand::Search("the".into())).await;
        assert_eq!(lock_state(&h.state).search.current_index, Some(0));

        h.send(ReaderCommand::Navigate(NavigateDirection::Next)).await;
        assert_eq!(lock_state(&h.state).search.current_index, Some(1));
        h.send(ReaderCommand::Navigate(NavigateDirection::Next)).await;
        assert_eq!(lock_state(&h.state).search.current_index, Some(0));
        h.send(ReaderCommand::Navigate(NavigateDirection::Prev)).await;
        assert_eq!(lock_state(&h.state).search.current_index, Some(1));

        h.send(ReaderCommand::ClearSearch).await;
        let st = lock_state(&h.state);
        assert!(st.search.query.is_empty());
        assert_eq!(st.search.current_index, None);
    }

    #[tokio::test(start_paused = true)]
    async fn bookmarks_add_and_remove() {
        let h = Harness::new();
        h.send(ReaderCommand::AddBookmark).await;
        assert!(lock_state(&h.state).bookmarks.is_empty());

        h.load_pdf().await;
        h.send(ReaderCommand::AddBookmark).await;
        h.send(ReaderCommand::AddBookmark).await;
        let id = {
            let st = lock_state(&h.state);
            assert_eq!(st.bookmarks.len(), 2);
            assert_eq!(st.bookmarks[0].snippet, format!("{PDF_TEXT}..."));
            st.bookmarks[0].id.clone()
        };

        h.send(ReaderCommand::RemoveBookmark(id)).await;
        h.send(ReaderCommand::RemoveBookmark("bookmark_missing".into()))
            .await;
        assert_eq!(lock_state(&h.state).bookmarks.len(), 1);
    }
}
