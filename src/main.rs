//! Mock Interview Coach - LLM-powered interview practice
//!
//! A Rust backend that plays a technical interviewer for a chosen
//! role, domain and seniority level, over text or voice.

mod api;
mod config;
mod llm;
mod profile;
mod runtime;
mod session;
mod speech;
mod state_machine;
mod system_prompt;
mod transcript;

use api::{create_router, AppState};
use config::AppConfig;
use llm::{LlmConfig, ModelRegistry};
use runtime::{LlmClient, RegistryLlmClient, SessionManager};
use speech::{SpeechConfig, SpeechToText, WhisperService};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_interview=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM API keys configured. Set GROQ_API_KEY or OPENAI_API_KEY.");
    }

    let llm: Arc<dyn LlmClient> = Arc::new(RegistryLlmClient::new(
        llm_registry.clone(),
        llm_registry.default_model_id().to_string(),
    ));
    let sessions = SessionManager::new(llm, config.engine())
        .with_event_capacity(config.event_capacity);

    // Voice input is optional
    let speech_config = SpeechConfig::from_env();
    let speech: Option<Arc<dyn SpeechToText>> = match WhisperService::from_config(&speech_config) {
        Some(service) => {
            tracing::info!(model = %speech_config.model, "Speech-to-text enabled");
            Some(Arc::new(service))
        }
        None => {
            tracing::warn!("No speech-to-text key configured; voice answers are disabled");
            None
        }
    };

    // Create application state
    let state = AppState::new(sessions, speech, llm_registry)
        .with_max_audio_bytes(config.max_audio_bytes);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        timeout_secs = config.backend_timeout.as_secs(),
        streaming = config.streaming,
        "Mock interview server listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
