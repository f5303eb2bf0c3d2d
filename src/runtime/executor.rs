//! Conversation engine
//!
//! Drives one interview turn: runs the pure transition function, then
//! executes the effects it returns against the session transcript.

use super::traits::LlmClient;
use super::SseEvent;

use crate::llm::{LlmError, LlmMessage, LlmRequest, MessageRole};
use crate::session::Session;
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use crate::transcript::{Message, Speaker, Transcript, TranscriptError};
use futures::StreamExt;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default upper bound on one backend call
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on the whole backend call, streaming included
    pub timeout: Duration,
    /// Use the streaming API and forward chunks as they arrive
    pub streaming: bool,
    pub max_tokens: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_BACKEND_TIMEOUT,
            streaming: true,
            max_tokens: None,
        }
    }
}

/// Errors surfaced by a turn
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Utterance must not be empty")]
    InvalidInput,
    #[error("Interview backend unavailable: {}", .0.message)]
    BackendUnavailable(LlmError),
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    #[error("Invalid transition: {0}")]
    Transition(String),
}

impl EngineError {
    /// Whether the caller may simply try the same utterance again
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::BackendUnavailable(e) if e.kind.is_retryable())
    }
}

impl From<TransitionError> for EngineError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::EmptyUtterance => EngineError::InvalidInput,
            TransitionError::InvalidTransition(msg) => EngineError::Transition(msg),
        }
    }
}

/// Where a turn reports progress, and how it can be stopped
#[derive(Debug, Clone)]
pub struct TurnSignals {
    events: Option<broadcast::Sender<SseEvent>>,
    cancel: CancellationToken,
}

impl TurnSignals {
    /// No listeners and no way to cancel
    pub fn detached() -> Self {
        Self {
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn new(events: broadcast::Sender<SseEvent>, cancel: CancellationToken) -> Self {
        Self {
            events: Some(events),
            cancel,
        }
    }

    fn emit(&self, event: SseEvent) {
        if let Some(tx) = &self.events {
            // No subscribers is fine
            let _ = tx.send(event);
        }
    }
}

/// Runs interview turns against an LLM client
pub struct ConversationEngine<L: LlmClient> {
    llm: L,
    config: EngineConfig,
}

impl<L: LlmClient> ConversationEngine<L> {
    pub fn new(llm: L, config: EngineConfig) -> Self {
        Self { llm, config }
    }

    #[cfg(test)]
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Advance the interview by one candidate utterance and return the
    /// interviewer's reply.
    #[allow(dead_code)] // Entry point for callers without observers
    pub async fn advance(
        &self,
        session: &mut Session,
        utterance: &str,
    ) -> Result<Message, EngineError> {
        self.advance_with(session, utterance, &TurnSignals::detached())
            .await
    }

    /// Like [`advance`](Self::advance), reporting progress through `signals`.
    ///
    /// On failure the transcript holds no part of this turn. The only
    /// exception is the system prompt, which stays once inserted.
    pub async fn advance_with(
        &self,
        session: &mut Session,
        utterance: &str,
        signals: &TurnSignals,
    ) -> Result<Message, EngineError> {
        let context = ConvContext::new(session.id().clone(), session.profile());
        let mut state = ConvState::of(session.transcript());

        let result = transition(
            &state,
            &context,
            Event::UserUtterance {
                text: utterance.to_string(),
            },
        )?;
        state = result.new_state;

        let mut pending: VecDeque<Effect> = result.effects.into();
        let mut failure: Option<LlmError> = None;

        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::InsertSystemPrompt { content } => {
                    tracing::debug!(session_id = %context.session_id, "Installing interviewer prompt");
                    session
                        .transcript_mut()
                        .append(Message::system(content))?;
                }

                Effect::RequestCompletion { utterance } => {
                    let event = match self
                        .request_completion(session.transcript(), &utterance, signals)
                        .await
                    {
                        Ok(content) => Event::BackendReply { utterance, content },
                        Err(e) => {
                            tracing::warn!(
                                session_id = %context.session_id,
                                kind = e.kind.as_str(),
                                error = %e.message,
                                "Interviewer turn failed"
                            );
                            let event = Event::BackendFailed {
                                message: e.message.clone(),
                                kind: e.kind,
                            };
                            failure = Some(e);
                            event
                        }
                    };

                    let next = transition(&state, &context, event)?;
                    state = next.new_state;
                    // Follow-ups run before anything queued behind the request
                    for effect in next.effects.into_iter().rev() {
                        pending.push_front(effect);
                    }
                }

                Effect::AppendMessage { speaker, content } => {
                    let message = Message::new(speaker, content);
                    session.transcript_mut().append(message.clone())?;
                    signals.emit(SseEvent::Message { message });
                }

                Effect::NotifyTurnDone => signals.emit(SseEvent::TurnDone),

                Effect::NotifyError { message, retryable } => {
                    signals.emit(SseEvent::Error { message, retryable });
                }
            }
        }

        tracing::debug!(
            session_id = %context.session_id,
            state = state.as_str(),
            transcript_len = session.transcript().len(),
            "Turn finished"
        );

        if let Some(e) = failure {
            return Err(EngineError::BackendUnavailable(e));
        }

        session
            .transcript()
            .last()
            .filter(|m| m.speaker == Speaker::Assistant)
            .cloned()
            .ok_or_else(|| EngineError::Transition("turn ended without a reply".to_string()))
    }

    /// Ask the backend for the next interviewer message.
    ///
    /// The request carries the whole transcript plus the pending utterance,
    /// which is not yet part of the transcript.
    async fn request_completion(
        &self,
        transcript: &Transcript,
        utterance: &str,
        signals: &TurnSignals,
    ) -> Result<String, LlmError> {
        let mut messages: Vec<LlmMessage> = transcript.all().iter().map(LlmMessage::from).collect();
        messages.push(LlmMessage::new(MessageRole::User, utterance));
        let request = LlmRequest::new(messages).with_max_tokens(self.config.max_tokens);

        tracing::info!(
            model = self.llm.model_id(),
            messages = request.messages.len(),
            streaming = self.config.streaming,
            "Requesting interviewer reply"
        );
        let started = Instant::now();

        // Race the bounded call against cancellation
        let reply = tokio::select! {
            biased;

            () = signals.cancel.cancelled() => {
                tracing::info!("LLM request cancelled");
                Err(LlmError::cancelled())
            }

            result = tokio::time::timeout(self.config.timeout, self.fetch_reply(&request, signals)) => {
                result.unwrap_or_else(|_| Err(LlmError::timeout(self.config.timeout)))
            }
        }?;

        if reply.trim().is_empty() {
            return Err(LlmError::unknown("Backend returned an empty reply"));
        }

        tracing::info!(
            duration_ms = %started.elapsed().as_millis(),
            chars = reply.len(),
            "Interviewer reply received"
        );
        Ok(reply)
    }

    async fn fetch_reply(
        &self,
        request: &LlmRequest,
        signals: &TurnSignals,
    ) -> Result<String, LlmError> {
        if !self.config.streaming {
            let response = self.llm.complete(request).await?;
            if !response.text.is_empty() {
                signals.emit(SseEvent::Delta {
                    text: response.text.clone(),
                });
            }
            return Ok(response.text);
        }

        let mut stream = self.llm.stream(request).await?;
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            // An interrupted stream discards what arrived so far
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            signals.emit(SseEvent::Delta {
                text: chunk.clone(),
            });
            reply.push_str(&chunk);
        }
        Ok(reply)
    }
}
