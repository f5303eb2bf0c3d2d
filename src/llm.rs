//! LLM provider abstraction
//!
//! Provides a common interface for the language-model backends that play the
//! interviewer.

mod error;
mod models;
mod openai;
mod registry;
mod types;

#[cfg(test)]
mod proptests;

pub use error::{LlmError, LlmErrorKind};
pub use models::{all_models, ModelDef, Provider};
pub use registry::{LlmConfig, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request and wait for the whole answer
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Make a completion request and receive the answer incrementally.
    ///
    /// Providers without native streaming yield the whole completion as a
    /// single chunk.
    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        let response = self.complete(request).await?;
        Ok(futures::stream::once(async move { Ok::<_, LlmError>(response.text) }).boxed())
    }

    /// Get the model ID
    fn model_id(&self) -> &str;

    /// Get the context window size in tokens
    fn context_window(&self) -> usize;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }

    fn log_failure(&self, started: std::time::Instant, e: &LlmError) {
        tracing::error!(
            model = %self.model_id,
            duration_ms = %started.elapsed().as_millis(),
            error = %e.message,
            kind = e.kind.as_str(),
            retryable = e.kind.is_retryable(),
            "LLM request failed"
        );
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => self.log_failure(start, e),
        }

        result
    }

    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        let start = std::time::Instant::now();
        match self.inner.stream(request).await {
            Ok(stream) => {
                tracing::info!(
                    model = %self.model_id,
                    messages = request.messages.len(),
                    first_byte_ms = %start.elapsed().as_millis(),
                    "LLM stream opened"
                );
                Ok(stream)
            }
            Err(e) => {
                self.log_failure(start, &e);
                Err(e)
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn context_window(&self) -> usize {
        self.inner.context_window()
    }
}
