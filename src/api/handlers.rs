//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, ModelsResponse, ProfileOptionsResponse,
    SessionRequest, SessionResponse, SuccessResponse, VoiceRequest, VoiceResponse,
};
use super::AppState;
use crate::profile::ProfileError;
use crate::runtime::{EngineError, RuntimeError, SseEvent};
use crate::session::{SessionId, SessionIdError};
use crate::speech::{AudioClip, SpeechError};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;

/// Recording format assumed when the client does not say
const DEFAULT_AUDIO_MEDIA_TYPE: &str = "audio/webm";

/// Room for the JSON envelope around the base64 audio
const VOICE_ENVELOPE_BYTES: usize = 16 * 1024;

/// Request body cap for a voice upload carrying `max_audio_bytes` of audio
fn voice_body_limit(max_audio_bytes: usize) -> usize {
    max_audio_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(VOICE_ENVELOPE_BYTES)
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let voice_limit = voice_body_limit(state.max_audio_bytes);

    Router::new()
        // Profile selector
        .route("/api/profile-options", get(profile_options))
        // Model info
        .route("/api/models", get(list_models))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).post(open_session))
        .route("/api/sessions/:id/reset", post(reset_session))
        // Interview turns
        .route("/api/sessions/:id/chat", post(send_chat))
        .route(
            "/api/sessions/:id/voice",
            post(send_voice).layer(DefaultBodyLimit::max(voice_limit)),
        )
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Profile and Model Info
// ============================================================

async fn profile_options() -> Json<ProfileOptionsResponse> {
    Json(ProfileOptionsResponse::all())
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let profile = req.profile.parse()?;
    let handle = state
        .sessions
        .get_or_create(SessionId::random(), profile)
        .await;
    let live_sessions = state.sessions.len().await;
    tracing::info!(
        session_id = %handle.id(),
        live_sessions,
        "Session minted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session: handle.snapshot().await,
        }),
    ))
}

/// Resolve a caller-chosen id; an existing session keeps its profile
async fn open_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let id: SessionId = id.parse()?;
    let profile = req.profile.parse()?;
    let handle = state.sessions.get_or_create(id, profile).await;
    tracing::debug!(session_id = %handle.id(), profile = %handle.profile(), "Session opened");

    Ok(Json(SessionResponse {
        session: handle.snapshot().await,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let id: SessionId = id.parse()?;
    let session = state.sessions.snapshot(&id).await?;
    Ok(Json(SessionResponse { session }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id: SessionId = id.parse()?;
    state.sessions.reset(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Interview Turns
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let id: SessionId = id.parse()?;
    let reply = state.sessions.advance(&id, &req.text).await?;
    Ok(Json(ChatResponse { reply }))
}

async fn send_voice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<VoiceRequest>, JsonRejection>,
) -> Result<Json<VoiceResponse>, AppError> {
    let id: SessionId = id.parse()?;
    let Json(req) = body?;
    let speech = state.speech.as_ref().ok_or_else(|| AppError::ServiceUnavailable {
        message: "Speech-to-text is not configured".to_string(),
        retryable: false,
    })?;

    // Unknown sessions fail before paying for a transcription
    state.sessions.get(&id).await?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(req.audio.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid audio encoding: {e}")))?;
    if data.len() > state.max_audio_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Recording is {} bytes; the limit is {} bytes",
            data.len(),
            state.max_audio_bytes
        )));
    }
    let media_type = req
        .media_type
        .unwrap_or_else(|| DEFAULT_AUDIO_MEDIA_TYPE.to_string());
    let clip = AudioClip::new(data, media_type);

    let transcription = speech.transcribe(&clip).await?;
    tracing::info!(session_id = %id, chars = transcription.len(), "Voice answer transcribed");

    let reply = state.sessions.advance(&id, &transcription).await?;
    Ok(Json(VoiceResponse {
        transcription,
        reply,
    }))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id: SessionId = id.parse()?;
    let (snapshot, broadcast_rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(SseEvent::Init { snapshot }, broadcast_rx))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("mock-interview ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    PayloadTooLarge(String),
    ServiceUnavailable { message: String, retryable: bool },
    Internal(String),
}

impl From<SessionIdError> for AppError {
    fn from(e: SessionIdError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Recording exceeds the upload limit".to_string())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::SessionNotFound(_) => AppError::NotFound(e.to_string()),
            RuntimeError::Engine(EngineError::InvalidInput) => AppError::BadRequest(e.to_string()),
            RuntimeError::Engine(ref engine @ EngineError::BackendUnavailable(_)) => {
                AppError::ServiceUnavailable {
                    retryable: engine.is_retryable(),
                    message: e.to_string(),
                }
            }
            RuntimeError::Engine(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<SpeechError> for AppError {
    fn from(e: SpeechError) -> Self {
        match e {
            SpeechError::NoSpeechDetected | SpeechError::UnintelligibleAudio => {
                AppError::Unprocessable(e.to_string())
            }
            SpeechError::UnsupportedMediaType(_) => AppError::BadRequest(e.to_string()),
            SpeechError::ServiceUnavailable { .. } => AppError::ServiceUnavailable {
                retryable: e.is_retryable(),
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            AppError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorResponse::new(msg))
            }
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, ErrorResponse::new(msg)),
            AppError::ServiceUnavailable { message, retryable } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(message).retryable(retryable),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}
