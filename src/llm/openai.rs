//! `OpenAI`-compatible Chat Completions provider (Groq, `OpenAI`)

use super::error::classify_http_error;
use super::models::ModelDef;
use super::types::{ChunkStream, LlmMessage, LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sentinel data line closing a streamed completion
const DONE_MARKER: &str = "[DONE]";

/// `OpenAI`-compatible service implementation
pub struct OpenAiCompatService {
    client: Client,
    api_key: String,
    model: ModelDef,
    url: String,
}

impl OpenAiCompatService {
    pub fn new(api_key: String, model: ModelDef, base_url: &str) -> Self {
        // No overall timeout here: streamed completions are bounded by the
        // conversation engine's deadline instead.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            model,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    fn translate_request(&self, request: &LlmRequest, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.api_name.to_string(),
            messages: request.messages.iter().map(translate_message).collect(),
            max_tokens: request.max_tokens,
            stream,
        }
    }

    async fn send(&self, request: &LlmRequest, stream: bool) -> Result<reqwest::Response, LlmError> {
        let body = self.translate_request(request, stream);

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &body));
        }

        Ok(response)
    }
}

pub(super) fn translate_message(msg: &LlmMessage) -> ChatMessage {
    ChatMessage {
        role: msg.role.as_str().to_string(),
        content: msg.content.clone(),
    }
}

fn normalize_response(resp: ChatResponse) -> Result<LlmResponse, LlmError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::unknown("No choices in response"))?;

    let usage = resp.usage.unwrap_or_default();
    Ok(LlmResponse {
        text: choice.message.content.unwrap_or_default(),
        usage: Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

/// What one SSE `data:` payload means for the completion
#[derive(Debug, PartialEq, Eq)]
pub(super) enum StreamItem {
    Chunk(String),
    /// Keep-alives, role-only deltas, empty content
    Skip,
    Done,
}

pub(super) fn parse_stream_data(data: &str) -> Result<StreamItem, LlmError> {
    let data = data.trim();
    if data == DONE_MARKER {
        return Ok(StreamItem::Done);
    }
    if data.is_empty() {
        return Ok(StreamItem::Skip);
    }

    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::unknown(format!("Malformed stream chunk: {e} - data: {data}")))?;

    if let Some(error) = chunk.error {
        return Err(LlmError::server_error(format!(
            "Stream error: {}",
            error.message.unwrap_or_else(|| "unspecified".to_string())
        )));
    }

    let text: String = chunk
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();

    if text.is_empty() {
        Ok(StreamItem::Skip)
    } else {
        Ok(StreamItem::Chunk(text))
    }
}

/// Turn a raw SSE byte stream into completion text chunks.
///
/// A stream that ends without the DONE marker was cut off and must not be
/// mistaken for a complete answer.
pub(super) fn completion_chunks<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let events = Box::pin(bytes.eventsource());

    futures::stream::unfold(Some(events), |state| async move {
        let mut events = state?;
        loop {
            match events.next().await {
                Some(Ok(event)) => match parse_stream_data(&event.data) {
                    Ok(StreamItem::Chunk(text)) => return Some((Ok(text), Some(events))),
                    Ok(StreamItem::Skip) => {}
                    Ok(StreamItem::Done) => return None,
                    Err(e) => return Some((Err(e), None)),
                },
                Some(Err(e)) => {
                    return Some((
                        Err(LlmError::network(format!("Stream interrupted: {e}"))),
                        None,
                    ))
                }
                None => {
                    return Some((
                        Err(LlmError::network("Stream closed before completion")),
                        None,
                    ))
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl LlmService for OpenAiCompatService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let response = self.send(request, false).await?;
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        normalize_response(parsed)
    }

    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        let response = self.send(request, true).await?;
        Ok(completion_chunks(response.bytes_stream()))
    }

    fn model_id(&self) -> &str {
        self.model.id
    }

    fn context_window(&self) -> usize {
        self.model.context_window
    }
}

// OpenAI Chat Completions wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: Option<String>,
}
