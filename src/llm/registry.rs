//! Model registry for managing available LLM providers

use super::{all_models, LlmService, LoggingService, ModelDef, Provider};
use std::collections::HashMap;
use std::sync::Arc;

/// Model used when nothing else is configured
const PREFERRED_DEFAULT: &str = "gemma2-9b-it";

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Overrides every provider's base URL (self-hosted `OpenAI`-compatible gateway)
    pub base_url: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            groq_api_key: non_empty("GROQ_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            base_url: non_empty("LLM_BASE_URL"),
            default_model: non_empty("DEFAULT_MODEL"),
        }
    }

    fn api_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Groq => self.groq_api_key.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
        }
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .filter(|id| services.contains_key(id))
            .or_else(|| {
                if services.contains_key(PREFERRED_DEFAULT) {
                    Some(PREFERRED_DEFAULT.to_string())
                } else {
                    let mut ids: Vec<_> = services.keys().cloned().collect();
                    ids.sort();
                    ids.into_iter().next()
                }
            })
            .unwrap_or_else(|| PREFERRED_DEFAULT.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Registry backed by caller-supplied services
    #[allow(dead_code)] // Useful for tests
    pub fn from_services(
        services: impl IntoIterator<Item = Arc<dyn LlmService>>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            services: services
                .into_iter()
                .map(|s| (s.model_id().to_string(), s))
                .collect(),
            default_model: default_model.into(),
        }
    }

    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        let api_key = config.api_key(model_def.provider)?;
        let service = model_def.create(api_key, config.base_url.as_deref());
        Some(Arc::new(LoggingService::new(service)))
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Get detailed information about available models
    pub fn available_model_info(&self) -> Vec<crate::api::ModelInfo> {
        all_models()
            .iter()
            .filter(|def| self.services.contains_key(def.id))
            .map(|def| crate::api::ModelInfo {
                id: def.id.to_string(),
                provider: def.provider.display_name().to_string(),
                description: def.description.to_string(),
                context_window: def.context_window,
            })
            .collect()
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
