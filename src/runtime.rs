//! Runtime for interview sessions
//!
//! Owns every live session, serializes turns per session and fans turn
//! progress out to event subscribers.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{
    ConversationEngine, EngineConfig, EngineError, TurnSignals, DEFAULT_BACKEND_TIMEOUT,
};
pub use traits::*;

use crate::profile::Profile;
use crate::session::{Session, SessionId};
use crate::state_machine::ConvState;
use crate::transcript::Message;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Default buffer of the per-session event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 128;

/// Production manager: the backend is chosen at startup
pub type SharedSessionManager = SessionManager<Arc<dyn LlmClient>>;

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init { snapshot: SessionSnapshot },
    Message { message: Message },
    /// A chunk of the interviewer reply while it is being generated
    Delta { text: String },
    TurnDone,
    Error { message: String, retryable: bool },
    /// The session was discarded
    Reset,
}

/// Point-in-time view of a session, as shown to the candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub profile: Profile,
    pub state: ConvState,
    /// Transcript without the system prompt
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl SessionSnapshot {
    fn of(session: &Session) -> Self {
        Self {
            id: session.id().clone(),
            profile: session.profile(),
            state: ConvState::of(session.transcript()),
            messages: session.transcript().visible().cloned().collect(),
            created_at: session.created_at(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Handle to one live session
pub struct SessionHandle {
    id: SessionId,
    profile: Profile,
    /// FIFO-fair lock; one turn at a time
    session: Mutex<Session>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    /// Cancelled when the session is reset
    cancel: CancellationToken,
}

impl SessionHandle {
    fn new(session: Session, event_capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(event_capacity);
        Self {
            id: session.id().clone(),
            profile: session.profile(),
            session: Mutex::new(session),
            broadcast_tx,
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Waits for any turn in flight to finish
    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(&*self.session.lock().await)
    }

    /// Snapshot plus a receiver for everything that happens after it
    pub async fn subscribe(&self) -> (SessionSnapshot, broadcast::Receiver<SseEvent>) {
        // Holding the lock means no turn can land between the two
        let session = self.session.lock().await;
        let rx = self.broadcast_tx.subscribe();
        (SessionSnapshot::of(&session), rx)
    }
}

/// Manager for all interview sessions
pub struct SessionManager<L: LlmClient> {
    engine: ConversationEngine<L>,
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
    event_capacity: usize,
}

impl<L: LlmClient> SessionManager<L> {
    pub fn new(llm: L, config: EngineConfig) -> Self {
        Self {
            engine: ConversationEngine::new(llm, config),
            sessions: RwLock::new(HashMap::new()),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn engine(&self) -> &ConversationEngine<L> {
        &self.engine
    }

    /// Return the session for `id`, creating it with `profile` if absent.
    ///
    /// An existing session keeps the profile it was created with.
    pub async fn get_or_create(&self, id: SessionId, profile: Profile) -> Arc<SessionHandle> {
        // Fast path: read lock
        if let Some(handle) = self.sessions.read().await.get(&id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        // Another caller may have won the race while we waited
        sessions
            .entry(id.clone())
            .or_insert_with(|| {
                tracing::info!(session_id = %id, %profile, "Created session");
                Arc::new(SessionHandle::new(
                    Session::new(id, profile),
                    self.event_capacity,
                ))
            })
            .clone()
    }

    pub async fn get(&self, id: &SessionId) -> Result<Arc<SessionHandle>, RuntimeError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))
    }

    /// Discard the session. The id behaves as never seen afterwards.
    pub async fn reset(&self, id: &SessionId) -> Result<(), RuntimeError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| RuntimeError::SessionNotFound(id.clone()))?;

        handle.cancel.cancel();
        let _ = handle.broadcast_tx.send(SseEvent::Reset);
        tracing::info!(session_id = %id, "Session reset");
        Ok(())
    }

    /// Run one turn on an existing session
    pub async fn advance(&self, id: &SessionId, utterance: &str) -> Result<Message, RuntimeError> {
        let handle = self.get(id).await?;
        let signals = TurnSignals::new(handle.broadcast_tx.clone(), handle.cancel.clone());

        let mut session = handle.session.lock().await;
        let reply = self
            .engine
            .advance_with(&mut session, utterance, &signals)
            .await?;
        Ok(reply)
    }

    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, RuntimeError> {
        Ok(self.get(id).await?.snapshot().await)
    }

    pub async fn subscribe(
        &self,
        id: &SessionId,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SseEvent>), RuntimeError> {
        Ok(self.get(id).await?.subscribe().await)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[allow(dead_code)] // API completeness
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
