//! API request and response types

use crate::profile::{Domain, Level, Profile, ProfileError, Role};
use crate::runtime::SessionSnapshot;
use crate::transcript::Message;
use serde::{Deserialize, Serialize};

/// Profile as submitted by the client; labels are matched case-insensitively
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub role: String,
    pub domain: String,
    pub level: String,
}

impl ProfileRequest {
    pub fn parse(&self) -> Result<Profile, ProfileError> {
        Ok(Profile::new(
            self.role.parse::<Role>()?,
            self.domain.parse::<Domain>()?,
            self.level.parse::<Level>()?,
        ))
    }
}

/// Request to create or resolve a session
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub profile: ProfileRequest,
}

/// Request to send a typed answer
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to send a spoken answer
#[derive(Debug, Deserialize)]
pub struct VoiceRequest {
    /// Base64-encoded recording
    pub audio: String,
    #[serde(default)]
    pub media_type: Option<String>,
}

/// Pick-lists for the profile selector
#[derive(Debug, Serialize)]
pub struct ProfileOptionsResponse {
    pub roles: Vec<&'static str>,
    pub domains: Vec<&'static str>,
    pub levels: Vec<&'static str>,
}

impl ProfileOptionsResponse {
    pub fn all() -> Self {
        Self {
            roles: Role::ALL.iter().map(|r| r.label()).collect(),
            domains: Domain::ALL.iter().map(|d| d.label()).collect(),
            levels: Level::ALL.iter().map(|l| l.label()).collect(),
        }
    }
}

/// Response with a session view
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
}

/// Response for a completed turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: Message,
}

/// Response for a completed spoken turn
#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    /// What the candidate was understood to say
    pub transcription: String,
    pub reply: Message,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Model information with metadata
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub description: String,
    pub context_window: usize,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            retryable: None,
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }
}
