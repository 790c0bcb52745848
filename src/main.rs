//! Application entry point: terminal document reader.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Build the ingestion pipeline (`tesseract` + `lopdf`) and the speech
//!    engine (simulated device, or none when speech is disabled).
//! 5. Spawn the reader orchestrator and drive it with commands, polling the
//!    shared snapshot the way a view would.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::mpsc;

use doc_reader::{
    config::AppConfig,
    ingest::{IngestPipeline, LopdfExtractor, TesseractCli},
    reader::{lock_state, new_shared_state, ReaderCommand, ReaderOrchestrator, ReaderState, SharedState},
    speech::{NoSpeech, PlaybackStatus, SimulatedSpeech, SpeechBackend, SpeechEngine, WordTiming},
};

/// How often the snapshot is re-read.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "doc-reader")]
#[command(about = "Extract text from an image or PDF and read it aloud", long_about = None)]
#[command(version)]
struct Cli {
    /// Image or PDF to read.
    file: PathBuf,

    /// Media type of the file; guessed from its name when omitted.
    #[arg(long)]
    media_type: Option<String>,

    /// Search the extracted text and list the matches.
    #[arg(short, long)]
    search: Option<String>,

    /// Print the extracted document as JSON and exit.
    #[arg(long)]
    json: bool,

    /// Speech rate (0.5 to 2.0); overrides the configured rate.
    #[arg(short, long)]
    rate: Option<f32>,

    /// Extract and summarise only; do not narrate.
    #[arg(long)]
    quiet: bool,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(cli, config))
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let filename = display_name(&cli.file);
    let media_type = cli.media_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&cli.file)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    // 4. Collaborators
    let ingest = IngestPipeline::new(
        Arc::new(TesseractCli::from_config(&config.ingest)),
        Arc::new(LopdfExtractor::new()),
        &config.ingest,
    );
    let backend: Arc<dyn SpeechBackend> = if config.speech.enabled {
        Arc::new(SimulatedSpeech::new(WordTiming::new(
            config.speech.base_words_per_minute,
        )))
    } else {
        log::info!("speech disabled in config");
        Arc::new(NoSpeech)
    };
    let speech = SpeechEngine::new(backend, &config.speech);

    // 5. Orchestrator
    let state = new_shared_state();
    let (tx, rx) = mpsc::channel::<ReaderCommand>(16);
    let orchestrator = ReaderOrchestrator::new(Arc::clone(&state), ingest, speech, &config);
    let handle = tokio::spawn(orchestrator.run(rx));

    tx.send(ReaderCommand::Ingest {
        filename,
        bytes,
        media_type,
    })
    .await?;

    let loaded = wait_until(&state, |st| {
        if st.is_processing {
            return None;
        }
        match (&st.document, &st.error_message) {
            (Some(_), _) => Some(Ok(())),
            (None, Some(message)) => Some(Err(message.clone())),
            (None, None) => None,
        }
    })
    .await;
    if let Err(message) = loaded {
        drop(tx);
        handle.await?;
        bail!(message);
    }

    print_document(&state, cli.json)?;

    if let Some(query) = cli.search.as_deref().filter(|q| !q.trim().is_empty()) {
        tx.send(ReaderCommand::Search(query.to_string())).await?;
        wait_until(&state, |st| (st.search.query == query).then_some(())).await;
        print_matches(&state);
    }

    let has_text = lock_state(&state)
        .document
        .as_ref()
        .is_some_and(|d| !d.text().trim().is_empty());

    if has_text && !cli.json && !cli.quiet {
        if let Some(rate) = cli.rate {
            tx.send(ReaderCommand::SetRate(rate)).await?;
        }
        narrate(&state, &tx).await?;
    }

    drop(tx);
    handle.await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_document(state: &SharedState, json: bool) -> anyhow::Result<()> {
    let st = lock_state(state);
    let Some(document) = &st.document else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(document)?);
        return Ok(());
    }

    println!("{} ({})", document.filename(), document.media_type());
    if let Some(summary) = &st.summary {
        println!(
            "{} words, {} characters, about {} to read",
            summary.word_count,
            summary.character_count,
            summary.reading_time_label()
        );
    }
    println!(
        "confidence {:.0}%, extracted in {} ms",
        document.confidence() * 100.0,
        document.processing_time_ms()
    );
    println!();
    println!("{}", document.text());
    println!();
    Ok(())
}

fn print_matches(state: &SharedState) {
    let st = lock_state(state);
    let search = &st.search;
    if search.is_empty() {
        println!("No matches for {:?}", search.query);
        return;
    }
    println!("{} matches for {:?}:", search.matches.len(), search.query);
    for (i, m) in search.matches.iter().enumerate() {
        println!("  {:>3}. [{}] {}", i + 1, m.offset, m.context_text);
    }
    println!();
}

/// Speak the document, echoing each word as the cursor reaches it.
async fn narrate(state: &SharedState, tx: &mpsc::Sender<ReaderCommand>) -> anyhow::Result<()> {
    tx.send(ReaderCommand::SpeakDocument).await?;

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    let mut started = false;
    let mut last_index = None;
    let mut stdout = std::io::stdout();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                tx.send(ReaderCommand::Stop).await?;
                println!();
                return Ok(());
            }
        }

        let (status, index, word, error) = {
            let st = lock_state(state);
            (
                st.playback.status,
                st.playback.current_word_index,
                st.playback.highlighted_word().map(str::to_string),
                st.error_message.clone(),
            )
        };

        if let Some(message) = error {
            eprintln!("{message}");
            return Ok(());
        }
        if status != PlaybackStatus::Idle {
            started = true;
        }
        if index != last_index {
            last_index = index;
            if let Some(word) = word {
                write!(stdout, "{word} ")?;
                stdout.flush()?;
            }
        }
        if started && status == PlaybackStatus::Idle {
            writeln!(stdout)?;
            return Ok(());
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn wait_until<T>(state: &SharedState, mut check: impl FnMut(&ReaderState) -> Option<T>) -> T {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        let found = check(&lock_state(state));
        if let Some(value) = found {
            return value;
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
