//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the engine with mock implementations.

use crate::llm::{ChunkStream, LlmError, LlmRequest, LlmResponse, ModelRegistry};
use async_trait::async_trait;
use std::sync::Arc;

/// Client for making LLM requests
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete an LLM request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Stream an LLM completion chunk by chunk
    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }

    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        (**self).stream(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use `ModelRegistry` as `LlmClient`
pub struct RegistryLlmClient {
    registry: Arc<ModelRegistry>,
    model_id: String,
}

impl RegistryLlmClient {
    pub fn new(registry: Arc<ModelRegistry>, model_id: String) -> Self {
        Self { registry, model_id }
    }

    fn service(&self) -> Result<Arc<dyn crate::llm::LlmService>, LlmError> {
        self.registry
            .get(&self.model_id)
            .or_else(|| self.registry.default())
            .ok_or_else(|| LlmError::network("No LLM available"))
    }
}

#[async_trait]
impl LlmClient for RegistryLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.service()?.complete(request).await
    }

    async fn stream(&self, request: &LlmRequest) -> Result<ChunkStream, LlmError> {
        self.service()?.stream(request).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
