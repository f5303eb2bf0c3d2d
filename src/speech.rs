//! Speech-to-text input adapter
//!
//! Turns recorded audio into an utterance. Failures never touch the
//! transcript; the caller decides whether to ask for another recording.

mod whisper;

pub use whisper::{SpeechConfig, WhisperService};

use async_trait::async_trait;
use thiserror::Error;

/// Recorded audio as submitted by the client
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub data: Vec<u8>,
    /// e.g. `audio/webm`, `audio/wav`
    pub media_type: String,
}

impl AudioClip {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// File extension the transcription service uses to sniff the container
    pub fn file_extension(&self) -> &'static str {
        let subtype = self
            .media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .rsplit('/')
            .next()
            .unwrap_or_default();
        match subtype {
            "wav" | "x-wav" | "wave" => "wav",
            "mpeg" | "mp3" => "mp3",
            "mp4" | "m4a" | "x-m4a" => "m4a",
            "ogg" => "ogg",
            "flac" => "flac",
            _ => "webm",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("No speech detected")]
    NoSpeechDetected,
    #[error("Could not understand the audio")]
    UnintelligibleAudio,
    #[error("Unsupported audio media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Speech service unavailable: {message}")]
    ServiceUnavailable { message: String, retryable: bool },
}

impl SpeechError {
    /// Transport failures, rate limits and 5xx: worth another attempt
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            retryable: true,
        }
    }

    /// Rejected credentials or requests; retrying will not help
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { retryable: true, .. })
    }
}

/// A speech recognizer
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, SpeechError>;
}

/// Normalize a raw transcription into an utterance.
///
/// Blank output means the recognizer heard nothing worth keeping.
pub fn interpret_transcription(raw: &str) -> Result<String, SpeechError> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        Err(SpeechError::NoSpeechDetected)
    } else {
        Ok(text)
    }
}
