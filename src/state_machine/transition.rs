//! Pure state transition function

use super::{ConvContext, ConvState, Effect, Event};
use crate::system_prompt::build_system_prompt;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Utterance must not be empty")]
    EmptyUtterance,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs and performs no
/// I/O. The transcript is never touched here; the executor applies effects.
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Empty input never changes anything, whatever the state
        (_, Event::UserUtterance { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyUtterance)
        }

        // First turn: install the interviewer prompt, then ask
        (ConvState::Uninitialized, Event::UserUtterance { text }) => {
            Ok(TransitionResult::new(ConvState::Active)
                .with_effect(Effect::InsertSystemPrompt {
                    content: build_system_prompt(&context.profile),
                })
                .with_effect(Effect::RequestCompletion { utterance: text }))
        }

        (ConvState::Active, Event::UserUtterance { text }) => Ok(TransitionResult::new(
            ConvState::Active,
        )
        .with_effect(Effect::RequestCompletion { utterance: text })),

        // The user turn is only committed together with its reply, so a
        // failed call leaves no trace in the transcript.
        (ConvState::Active, Event::BackendReply { utterance, content }) => {
            Ok(TransitionResult::new(ConvState::Active).with_effects([
                Effect::append_user(utterance),
                Effect::append_assistant(content),
                Effect::NotifyTurnDone,
            ]))
        }

        (ConvState::Active, Event::BackendFailed { message, kind }) => {
            Ok(TransitionResult::new(ConvState::Active).with_effect(Effect::NotifyError {
                message,
                retryable: kind.is_retryable(),
            }))
        }

        (ConvState::Uninitialized, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} before the interview started"
        ))),
    }
}
