//! Mock implementations for testing
//!
//! These mocks enable engine and API tests without a real backend.

use super::traits::LlmClient;
use crate::llm::{ChunkStream, LlmError, LlmRequest, LlmResponse};
use crate::speech::{AudioClip, SpeechError, SpeechToText};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_text(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.next_response(request)
    }

    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        let response = self.next_response(request)?;
        Ok(futures::stream::once(async move { Ok(response.text) }).boxed())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Echo LLM Client
// ============================================================================

/// Replies with a fixed prefix followed by the latest user message
pub struct EchoLlmClient {
    prefix: String,
}

impl EchoLlmClient {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn reply(&self, request: &LlmRequest) -> String {
        format!("{}{}", self.prefix, request.last_user_text().unwrap_or_default())
    }
}

#[async_trait]
impl LlmClient for EchoLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Ok(LlmResponse::text(self.reply(request)))
    }

    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        // One chunk per character exercises the concatenation path
        let chunks: Vec<Result<String, LlmError>> =
            self.reply(request).chars().map(|c| Ok(c.to_string())).collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}

// ============================================================================
// Chunked Mock LLM Client (stream interruption)
// ============================================================================

/// Streams the given chunks, then optionally fails
pub struct ChunkedMockLlmClient {
    chunks: Vec<String>,
    trailing_error: Option<LlmError>,
}

impl ChunkedMockLlmClient {
    pub fn new(chunks: &[&str], trailing_error: Option<LlmError>) -> Self {
        Self {
            chunks: chunks.iter().map(|c| (*c).to_string()).collect(),
            trailing_error,
        }
    }
}

#[async_trait]
impl LlmClient for ChunkedMockLlmClient {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.trailing_error {
            Some(e) => Err(e.clone()),
            None => Ok(LlmResponse::text(self.chunks.concat())),
        }
    }

    async fn stream(&self, _request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        let mut items: Vec<Result<String, LlmError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some(e) = &self.trailing_error {
            items.push(Err(e.clone()));
        }
        Ok(futures::stream::iter(items).boxed())
    }

    fn model_id(&self) -> &str {
        "chunked"
    }
}

// ============================================================================
// Delayed Mock LLM Client (timeouts, cancellation, serialization)
// ============================================================================

/// Echo client that waits before answering
pub struct DelayedMockLlmClient {
    inner: EchoLlmClient,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
    /// Requests currently waiting out the delay
    pub in_flight: Arc<Mutex<usize>>,
    /// Highest value `in_flight` reached
    pub max_in_flight: Arc<Mutex<usize>>,
}

impl DelayedMockLlmClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: EchoLlmClient::new("Q: "),
            delay,
            request_started: Arc::new(Notify::new()),
            in_flight: Arc::new(Mutex::new(0)),
            max_in_flight: Arc::new(Mutex::new(0)),
        }
    }

    async fn wait(&self) {
        {
            let mut current = self.in_flight.lock().unwrap();
            *current += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            *max = (*max).max(*current);
        }
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        *self.in_flight.lock().unwrap() -= 1;
    }
}

#[async_trait]
impl LlmClient for DelayedMockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.wait().await;
        self.inner.complete(request).await
    }

    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        self.wait().await;
        self.inner.stream(request).await
    }

    fn model_id(&self) -> &str {
        "delayed"
    }
}

// ============================================================================
// Mock Speech-to-Text
// ============================================================================

/// Returns a fixed transcription result for every clip
pub struct MockSpeechToText {
    result: Result<String, SpeechError>,
    /// Sizes of the clips received
    pub clips: Mutex<Vec<usize>>,
}

impl MockSpeechToText {
    pub fn new(result: Result<String, SpeechError>) -> Self {
        Self {
            result,
            clips: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, SpeechError> {
        self.clips.lock().unwrap().push(clip.data.len());
        self.result.clone()
    }
}
