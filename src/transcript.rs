//! Append-only conversation history
//!
//! The transcript is the only thing a turn mutates. Messages can be added but
//! never edited, removed or reordered, and the system prompt can only ever
//! occupy index 0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Transcript already has a system message")]
    DuplicateSystemMessage,
    #[error("System message must be the first message (transcript has {0} messages)")]
    SystemMessageNotFirst(usize),
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    System,
    User,
    Assistant,
}

/// A single message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Speaker::System, content)
    }

    #[cfg(test)]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content)
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, content)
    }

    pub fn is_system(&self) -> bool {
        self.speaker == Speaker::System
    }
}

/// Ordered message history of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end.
    ///
    /// A system message is only accepted into an empty transcript.
    pub fn append(&mut self, message: Message) -> Result<(), TranscriptError> {
        if message.is_system() {
            if self.has_system_message() {
                return Err(TranscriptError::DuplicateSystemMessage);
            }
            if !self.messages.is_empty() {
                return Err(TranscriptError::SystemMessageNotFirst(self.messages.len()));
            }
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn has_system_message(&self) -> bool {
        self.messages.first().is_some_and(Message::is_system)
    }

    /// Messages shown to the candidate (everything but the system prompt)
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_system())
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)] // API completeness
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
