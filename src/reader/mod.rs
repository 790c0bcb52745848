//! Reader orchestration.
//!
//! ```text
//! UI / CLI ──ReaderCommand──▶ ReaderOrchestrator ──▶ IngestPipeline (spawned)
//!                                    │            ──▶ SpeechEngine
//!                                    │            ──▶ SearchEngine / BookmarkStore
//!                                    ▼
//!              SharedState (Arc<Mutex<ReaderState>>) ◀── read by the view
//! ```

pub mod runner;
pub mod state;

pub use runner::{ReaderCommand, ReaderOrchestrator};
pub use state::{lock_state, new_shared_state, ReaderState, SharedState};
