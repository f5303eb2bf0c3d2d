//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// LLM error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            LlmErrorKind::Timeout,
            format!("Backend did not finish within {}s", after.as_secs()),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(LlmErrorKind::Cancelled, "Backend request was cancelled")
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }
}

/// Error classification, reported to callers so they can pick a retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection failures, interrupted streams
    Network,
    /// Caller-configured deadline expired
    Timeout,
    /// Session was reset while the request was in flight
    Cancelled,
    /// Rate limited (429) or out of quota
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    Unknown,
}

impl LlmErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimit | Self::ServerError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::RateLimit => "rate_limit",
            Self::ServerError => "server_error",
            Self::Auth => "auth",
            Self::InvalidRequest => "invalid_request",
            Self::Unknown => "unknown",
        }
    }
}

/// Map a non-success HTTP status from an OpenAI-compatible API to an error
pub fn classify_http_error(status: u16, body: &str) -> LlmError {
    match status {
        401 | 403 => LlmError::auth(format!("Authentication failed: {body}")),
        429 => {
            let mut err = LlmError::rate_limit(format!("Rate limited: {body}"));
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
                if let Some(retry_after) = parsed
                    .get("error")
                    .and_then(|e| e.get("retry_after"))
                    .and_then(serde_json::Value::as_f64)
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                {
                    err = err.with_retry_after(retry_after);
                }
            }
            err
        }
        400 => LlmError::invalid_request(format!("Invalid request: {body}")),
        500..=599 => LlmError::server_error(format!("Server error: {body}")),
        _ => LlmError::unknown(format!("HTTP {status}: {body}")),
    }
}
