//! HTTP API for the interview coach

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::config::DEFAULT_MAX_AUDIO_BYTES;
use crate::llm::ModelRegistry;
use crate::runtime::SharedSessionManager;
use crate::speech::SpeechToText;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SharedSessionManager>,
    /// Absent when no transcription service is configured
    pub speech: Option<Arc<dyn SpeechToText>>,
    pub llm_registry: Arc<ModelRegistry>,
    /// Upper bound on a decoded voice recording
    pub max_audio_bytes: usize,
}

impl AppState {
    pub fn new(
        sessions: SharedSessionManager,
        speech: Option<Arc<dyn SpeechToText>>,
        llm_registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            speech,
            llm_registry,
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }

    pub fn with_max_audio_bytes(mut self, max_audio_bytes: usize) -> Self {
        self.max_audio_bytes = max_audio_bytes;
        self
    }
}
