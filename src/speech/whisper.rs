//! Whisper-compatible transcription over HTTP (Groq, `OpenAI`)

use super::{interpret_transcription, AudioClip, SpeechError, SpeechToText};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_MODEL: &str = "whisper-large-v3";
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration for the transcription service
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl SpeechConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_key: non_empty("GROQ_API_KEY"),
            model: non_empty("STT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty("STT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// Transcribes audio through an `/audio/transcriptions` endpoint
pub struct WhisperService {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl WhisperService {
    /// Build the service, or `None` when no API key is configured
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Some(Self {
            client,
            api_key,
            model: config.model.clone(),
            url: format!(
                "{}/audio/transcriptions",
                config.base_url.trim_end_matches('/')
            ),
        })
    }
}

/// Map a failed transcription response to the caller-facing signal
fn classify_status(status: u16, body: &str) -> SpeechError {
    match status {
        // The service could not decode the upload as audio
        400 | 415 => SpeechError::UnintelligibleAudio,
        429 | 500..=599 => SpeechError::unavailable(format!("HTTP {status}: {body}")),
        _ => SpeechError::misconfigured(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl SpeechToText for WhisperService {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, SpeechError> {
        if clip.data.is_empty() {
            return Err(SpeechError::NoSpeechDetected);
        }

        let file = Part::bytes(clip.data.clone())
            .file_name(format!("answer.{}", clip.file_extension()))
            .mime_str(&clip.media_type)
            .map_err(|_| SpeechError::UnsupportedMediaType(clip.media_type.clone()))?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", file);

        let started = std::time::Instant::now();
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SpeechError::unavailable(e.to_string()))?;

        if !status.is_success() {
            let err = classify_status(status.as_u16(), &body);
            tracing::warn!(status = %status, error = %err, "Transcription failed");
            return Err(err);
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body).map_err(|e| {
            SpeechError::unavailable(format!("Malformed transcription response: {e}"))
        })?;

        tracing::info!(
            model = %self.model,
            bytes = clip.data.len(),
            duration_ms = %started.elapsed().as_millis(),
            "Transcription completed"
        );
        interpret_transcription(&parsed.text)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SpeechConfig::from_lookup(|_| None);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "whisper-large-v3");
        assert!(WhisperService::from_config(&config).is_none());
    }

    #[test]
    fn test_config_overrides() {
        let config = SpeechConfig::from_lookup(|key| match key {
            "GROQ_API_KEY" => Some("gsk".to_string()),
            "STT_MODEL" => Some("whisper-1".to_string()),
            "STT_BASE_URL" => Some("https://stt.example.com/v1/".to_string()),
            _ => None,
        });
        let service = WhisperService::from_config(&config).unwrap();
        assert_eq!(service.model, "whisper-1");
        assert_eq!(service.url, "https://stt.example.com/v1/audio/transcriptions");
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(400, "bad file"), SpeechError::UnintelligibleAudio);
        assert_eq!(classify_status(415, "bad type"), SpeechError::UnintelligibleAudio);
        assert!(classify_status(503, "down").is_retryable());
        assert!(classify_status(429, "slow down").is_retryable());
    }

    #[test]
    fn test_rejected_credentials_are_not_retryable() {
        for status in [401, 403, 404, 422] {
            let err = classify_status(status, "nope");
            assert!(matches!(err, SpeechError::ServiceUnavailable { .. }), "{status}");
            assert!(!err.is_retryable(), "{status}");
        }
    }

    #[tokio::test]
    async fn test_unparsable_media_type_is_rejected_before_upload() {
        let config = SpeechConfig::from_lookup(|key| {
            (key == "GROQ_API_KEY").then(|| "gsk".to_string())
        });
        let service = WhisperService::from_config(&config).unwrap();
        let clip = AudioClip::new(b"RIFF....WAVE".to_vec(), "not a media type");
        let result = service.transcribe(&clip).await;
        assert_eq!(
            result,
            Err(SpeechError::UnsupportedMediaType("not a media type".to_string()))
        );
    }

    #[tokio::test]
    async fn test_empty_clip_short_circuits() {
        let config = SpeechConfig::from_lookup(|key| {
            (key == "GROQ_API_KEY").then(|| "gsk".to_string())
        });
        let service = WhisperService::from_config(&config).unwrap();
        let result = service.transcribe(&AudioClip::new(vec![], "audio/wav")).await;
        assert_eq!(result, Err(SpeechError::NoSpeechDetected));
    }
}
