//! Effects produced by state transitions

use crate::transcript::Speaker;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Put the interviewer prompt at the head of an empty transcript
    InsertSystemPrompt { content: String },

    /// Ask the backend for a reply to the transcript plus `utterance`
    RequestCompletion { utterance: String },

    /// Append a message to the transcript
    AppendMessage { speaker: Speaker, content: String },

    /// Tell observers the turn finished
    NotifyTurnDone,

    /// Tell observers the turn failed
    NotifyError { message: String, retryable: bool },
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            speaker: Speaker::User,
            content: content.into(),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            speaker: Speaker::Assistant,
            content: content.into(),
        }
    }
}
