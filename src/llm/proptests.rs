//! Property-based tests for the Chat Completions translation layer
//!
//! These tests verify that the translation between our internal types
//! and the wire format preserves key invariants:
//! - Message order, roles and content survive translation
//! - Streamed chunks concatenate to the full completion
//! - Every HTTP status maps to exactly one error class
//! - Arbitrary stream payloads never panic the parser

use super::error::classify_http_error;
use super::openai::{parse_stream_data, translate_message, StreamItem};
use super::types::{LlmMessage, MessageRole};
use super::LlmErrorKind;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Strategies
// ============================================================================

fn arb_role() -> impl Strategy<Value = MessageRole> {
    prop_oneof![
        Just(MessageRole::System),
        Just(MessageRole::User),
        Just(MessageRole::Assistant),
    ]
}

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    (arb_role(), "\\PC{0,80}").prop_map(|(role, content)| LlmMessage::new(role, content))
}

/// Text a model might stream, including whitespace-only and empty pieces
fn arb_chunk() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z0-9 .,?!'\n]{1,20}",
        1 => Just(String::new()),
        1 => "\\PC{1,10}",
    ]
}

fn expected_kind(status: u16) -> LlmErrorKind {
    match status {
        401 | 403 => LlmErrorKind::Auth,
        429 => LlmErrorKind::RateLimit,
        400 => LlmErrorKind::InvalidRequest,
        500..=599 => LlmErrorKind::ServerError,
        _ => LlmErrorKind::Unknown,
    }
}

// ============================================================================
// Translation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_translate_preserves_role_and_content(msg in arb_message()) {
        let wire = serde_json::to_value(translate_message(&msg)).unwrap();
        prop_assert_eq!(wire["role"].as_str(), Some(msg.role.as_str()));
        prop_assert_eq!(wire["content"].as_str(), Some(msg.content.as_str()));
    }

    #[test]
    fn prop_translate_preserves_order(messages in proptest::collection::vec(arb_message(), 0..20)) {
        let wire: Vec<String> = messages
            .iter()
            .map(|m| serde_json::to_value(translate_message(m)).unwrap()["content"]
                .as_str()
                .unwrap_or_default()
                .to_string())
            .collect();
        let original: Vec<String> = messages.iter().map(|m| m.content.clone()).collect();
        prop_assert_eq!(wire, original);
    }
}

// ============================================================================
// Streaming
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_stream_chunks_concatenate(chunks in proptest::collection::vec(arb_chunk(), 0..30)) {
        let mut assembled = String::new();
        for chunk in &chunks {
            let data = json!({ "choices": [{ "delta": { "content": chunk } }] }).to_string();
            match parse_stream_data(&data).unwrap() {
                StreamItem::Chunk(text) => {
                    prop_assert!(!text.is_empty());
                    assembled.push_str(&text);
                }
                StreamItem::Skip => prop_assert!(chunk.is_empty()),
                StreamItem::Done => prop_assert!(false, "content chunk parsed as done"),
            }
        }
        prop_assert_eq!(parse_stream_data("[DONE]").unwrap(), StreamItem::Done);
        prop_assert_eq!(assembled, chunks.concat());
    }

    #[test]
    fn prop_arbitrary_payload_never_panics(data in "\\PC{0,200}") {
        // Any outcome is fine as long as it is a value, not a panic
        let _ = parse_stream_data(&data);
    }
}

// ============================================================================
// HTTP status classification
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_status_classification_is_total(status in 100u16..600, body in "\\PC{0,60}") {
        let err = classify_http_error(status, &body);
        prop_assert_eq!(err.kind, expected_kind(status));
        prop_assert_eq!(
            err.kind.is_retryable(),
            status == 429 || (500..600).contains(&status)
        );
    }

    #[test]
    fn prop_retry_after_never_panics(secs in proptest::num::f64::ANY) {
        let body = json!({ "error": { "retry_after": secs } }).to_string();
        let err = classify_http_error(429, &body);
        prop_assert_eq!(err.kind, LlmErrorKind::RateLimit);
        if let Some(after) = err.retry_after {
            prop_assert!(secs >= 0.0 || after.is_zero());
        }
    }
}
