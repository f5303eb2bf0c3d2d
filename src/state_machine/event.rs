//! Events that can occur in a conversation

use crate::llm::LlmErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// The candidate submitted an answer, typed or transcribed
    UserUtterance { text: String },

    /// The backend finished a completion for `utterance`
    BackendReply { utterance: String, content: String },

    /// The backend call for the pending utterance failed
    BackendFailed { message: String, kind: LlmErrorKind },
}
