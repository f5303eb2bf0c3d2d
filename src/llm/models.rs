//! Centralized model definitions
//!
//! Every model the service can talk to is listed here once. The registry
//! instantiates the ones whose provider has credentials configured.

use super::openai::OpenAiCompatService;
use super::LlmService;
use std::sync::Arc;

/// Hosting provider of a model. Both speak the `OpenAI` Chat Completions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAI,
}

impl Provider {
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Base URL of the provider's `OpenAI`-compatible API
    pub fn base_url(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// Static description of one model
#[derive(Debug, Clone, Copy)]
pub struct ModelDef {
    /// Identifier used in config and API responses
    pub id: &'static str,
    pub provider: Provider,
    /// Name sent in the request body
    pub api_name: &'static str,
    pub description: &'static str,
    pub context_window: usize,
}

impl ModelDef {
    /// Build a service for this model
    pub fn create(&self, api_key: &str, base_url: Option<&str>) -> Arc<dyn LlmService> {
        Arc::new(OpenAiCompatService::new(
            api_key.to_string(),
            *self,
            base_url.unwrap_or(self.provider.base_url()),
        ))
    }
}

const MODELS: &[ModelDef] = &[
    ModelDef {
        id: "gemma2-9b-it",
        provider: Provider::Groq,
        api_name: "gemma2-9b-it",
        description: "Gemma 2 9B on Groq, fast conversational default",
        context_window: 8_192,
    },
    ModelDef {
        id: "llama-3.1-8b-instant",
        provider: Provider::Groq,
        api_name: "llama-3.1-8b-instant",
        description: "Llama 3.1 8B on Groq, lowest latency",
        context_window: 131_072,
    },
    ModelDef {
        id: "llama-3.3-70b-versatile",
        provider: Provider::Groq,
        api_name: "llama-3.3-70b-versatile",
        description: "Llama 3.3 70B on Groq, strongest open model for feedback",
        context_window: 131_072,
    },
    ModelDef {
        id: "gpt-4o-mini",
        provider: Provider::OpenAI,
        api_name: "gpt-4o-mini",
        description: "GPT-4o mini, inexpensive and capable",
        context_window: 128_000,
    },
    ModelDef {
        id: "gpt-4o",
        provider: Provider::OpenAI,
        api_name: "gpt-4o",
        description: "GPT-4o, most capable listed model",
        context_window: 128_000,
    },
];

pub fn all_models() -> &'static [ModelDef] {
    MODELS
}
