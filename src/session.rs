//! Session identity and per-session data

use crate::profile::Profile;
use crate::transcript::Transcript;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("Session id must not be empty")]
    Empty,
    #[error("Session id exceeds 128 characters")]
    TooLong,
    #[error("Session id contains invalid character {0:?}")]
    InvalidChar(char),
}

/// Opaque key distinguishing independent conversations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh random identifier
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = SessionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SessionIdError::Empty);
        }
        if s.chars().count() > MAX_SESSION_ID_LEN {
            return Err(SessionIdError::TooLong);
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SessionIdError::InvalidChar(bad));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate's interview: who they are and what has been said.
///
/// The profile is fixed at construction; only the transcript grows.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    profile: Profile,
    transcript: Transcript,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, profile: Profile) -> Self {
        Self {
            id,
            profile,
            transcript: Transcript::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
