//! Property-based tests for the state machine
//!
//! A small synchronous driver applies transitions and their effects to a
//! transcript, with the backend outcome chosen by the generator.

use super::*;
use crate::llm::LlmErrorKind;
use crate::profile::{Domain, Level, Profile, Role};
use crate::session::SessionId;
use crate::transcript::{Message, Speaker, Transcript};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Turn {
    text: String,
    backend_ok: bool,
}

fn arb_profile() -> impl Strategy<Value = Profile> {
    (0usize..6, 0usize..6, 0usize..3)
        .prop_map(|(r, d, l)| Profile::new(Role::ALL[r], Domain::ALL[d], Level::ALL[l]))
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::Timeout),
        Just(LlmErrorKind::Cancelled),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
    ]
}

fn arb_turn() -> impl Strategy<Value = Turn> {
    (
        prop_oneof![
            3 => "[a-zA-Z ]{1,30}".prop_filter("non-blank", |s| !s.trim().is_empty()),
            1 => "[ \t\n]{0,3}",
        ],
        any::<bool>(),
    )
        .prop_map(|(text, backend_ok)| Turn { text, backend_ok })
}

/// Outcome of driving one turn through the machine
enum Outcome {
    Rejected,
    Replied,
    Failed,
}

fn drive(
    state: &mut ConvState,
    ctx: &ConvContext,
    transcript: &mut Transcript,
    turn: &Turn,
    kind: LlmErrorKind,
) -> Outcome {
    let Ok(result) = transition(
        state,
        ctx,
        Event::UserUtterance {
            text: turn.text.clone(),
        },
    ) else {
        return Outcome::Rejected;
    };
    *state = result.new_state;

    let mut outcome = Outcome::Rejected;
    let mut pending: Vec<Effect> = result.effects;
    pending.reverse();
    while let Some(effect) = pending.pop() {
        match effect {
            Effect::InsertSystemPrompt { content } => {
                transcript.append(Message::system(content)).unwrap();
            }
            Effect::RequestCompletion { utterance } => {
                let event = if turn.backend_ok {
                    Event::BackendReply {
                        content: format!("Q: {utterance}"),
                        utterance,
                    }
                } else {
                    Event::BackendFailed {
                        message: "backend down".to_string(),
                        kind,
                    }
                };
                let next = transition(state, ctx, event).unwrap();
                *state = next.new_state;
                let mut follow = next.effects;
                follow.reverse();
                pending.extend(follow);
            }
            Effect::AppendMessage { speaker, content } => {
                transcript.append(Message::new(speaker, content)).unwrap();
            }
            Effect::NotifyTurnDone => outcome = Outcome::Replied,
            Effect::NotifyError { .. } => outcome = Outcome::Failed,
        }
    }
    outcome
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The system prompt is inserted exactly once, at the head, and each
    /// successful turn adds exactly one user and one assistant message in
    /// call order.
    #[test]
    fn prop_transcript_shape(
        profile in arb_profile(),
        turns in proptest::collection::vec(arb_turn(), 0..25),
        kind in arb_error_kind(),
    ) {
        let ctx = ConvContext::new(SessionId::random(), profile);
        let mut state = ConvState::Uninitialized;
        let mut transcript = Transcript::new();
        let mut replied = Vec::new();

        for turn in &turns {
            let before = transcript.len();
            match drive(&mut state, &ctx, &mut transcript, turn, kind) {
                Outcome::Rejected => prop_assert_eq!(transcript.len(), before),
                Outcome::Replied => replied.push(turn.text.clone()),
                Outcome::Failed => {
                    // Only the prompt may appear on a failed first turn
                    let grew = transcript.len() - before;
                    prop_assert!(grew == 0 || (before == 0 && grew == 1));
                }
            }
            prop_assert_eq!(state, ConvState::of(&transcript));
        }

        let systems = transcript.all().iter().filter(|m| m.is_system()).count();
        if transcript.is_empty() {
            prop_assert_eq!(systems, 0);
        } else {
            prop_assert_eq!(systems, 1);
            prop_assert!(transcript.all()[0].is_system());
            prop_assert_eq!(transcript.len(), 1 + 2 * replied.len());
        }

        let users: Vec<String> = transcript
            .all()
            .iter()
            .filter(|m| m.speaker == Speaker::User)
            .map(|m| m.content.clone())
            .collect();
        prop_assert_eq!(users, replied);
    }

    /// Once active, nothing moves the machine back.
    #[test]
    fn prop_active_is_terminal(
        turns in proptest::collection::vec(arb_turn(), 1..15),
        kind in arb_error_kind(),
    ) {
        let ctx = ConvContext::new(
            SessionId::random(),
            Profile::new(Role::SoftwareEngineer, Domain::Sde, Level::Mid),
        );
        let mut state = ConvState::Active;
        let mut transcript = Transcript::new();
        transcript.append(Message::system("prompt")).unwrap();

        for turn in &turns {
            drive(&mut state, &ctx, &mut transcript, turn, kind);
            prop_assert_eq!(state, ConvState::Active);
        }
    }
}
