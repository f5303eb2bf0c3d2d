//! Server configuration from environment variables

use crate::runtime::{EngineConfig, DEFAULT_BACKEND_TIMEOUT, DEFAULT_EVENT_CAPACITY};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;

/// Largest decoded recording accepted on the voice route (Whisper's upload cap)
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Process-level settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub backend_timeout: Duration,
    pub streaming: bool,
    pub max_tokens: Option<u32>,
    pub event_capacity: usize,
    pub max_audio_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            streaming: true,
            max_tokens: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let port = parsed("INTERVIEW_PORT")
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(defaults.port);

        let backend_timeout = parsed("INTERVIEW_BACKEND_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map_or(defaults.backend_timeout, Duration::from_secs);

        let streaming = lookup("INTERVIEW_STREAMING")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.streaming);

        let max_tokens = parsed("INTERVIEW_MAX_TOKENS")
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0);

        let event_capacity = parsed("INTERVIEW_EVENT_CAPACITY")
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.event_capacity);

        let max_audio_bytes = parsed("INTERVIEW_MAX_AUDIO_BYTES")
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_audio_bytes);

        Self {
            port,
            backend_timeout,
            streaming,
            max_tokens,
            event_capacity,
            max_audio_bytes,
        }
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            timeout: self.backend_timeout,
            streaming: self.streaming,
            max_tokens: self.max_tokens,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
