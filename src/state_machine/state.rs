//! Conversation state types

use crate::profile::Profile;
use crate::session::SessionId;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};

/// Engine state of one session.
///
/// `Active` is terminal: once the interviewer prompt is in place every later
/// turn loops back into `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvState {
    /// No system prompt yet
    Uninitialized,
    /// System prompt present at the head of the transcript
    Active,
}

impl ConvState {
    /// Derive the state from the transcript invariant
    pub fn of(transcript: &Transcript) -> Self {
        if transcript.has_system_message() {
            ConvState::Active
        } else {
            ConvState::Uninitialized
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConvState::Uninitialized => "uninitialized",
            ConvState::Active => "active",
        }
    }
}

/// Immutable facts about the conversation a transition may consult
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub session_id: SessionId,
    pub profile: Profile,
}

impl ConvContext {
    pub fn new(session_id: SessionId, profile: Profile) -> Self {
        Self {
            session_id,
            profile,
        }
    }
}
