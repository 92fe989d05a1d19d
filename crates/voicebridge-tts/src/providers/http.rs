use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use voicebridge_core::ports::{TtsError, TtsProviderPort, TtsVoiceInfo};
use voicebridge_core::{AudioChunk, AudioFormat};

/// A generic REST TTS provider: POSTs `{text, voice}` and expects raw audio
/// bytes back, or a JSON error body on failure. Configuration (base URL,
/// API key, voice list, priority) is resolved once at construction via the
/// registry's config overlay, so the provider itself holds only the
/// already-resolved values.
pub struct HttpTtsProvider {
    id: String,
    base_url: String,
    api_key: Option<String>,
    voices: Vec<TtsVoiceInfo>,
    priority: i32,
    format: AudioFormat,
    sample_rate: u32,
    client: reqwest::Client,
}

pub struct HttpTtsConfig {
    pub id: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub voices: Vec<TtsVoiceInfo>,
    pub priority: i32,
    pub format: AudioFormat,
    pub sample_rate: u32,
}

impl HttpTtsProvider {
    #[must_use]
    pub fn new(config: HttpTtsConfig) -> Self {
        Self {
            id: config.id,
            base_url: config.base_url,
            api_key: config.api_key,
            voices: config.voices,
            priority: config.priority,
            format: config.format,
            sample_rate: config.sample_rate,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

/// Maps a provider's own error vocabulary onto the classified reason codes
/// surfaced to clients via `tts_error` (originally `_tts_error_event`).
fn classify(error_code: &str) -> TtsError {
    match error_code {
        "model_terms_required" => TtsError::TermsRequired,
        "rate_limit_exceeded" => TtsError::RateLimitExceeded,
        "insufficient_quota" => TtsError::InsufficientQuota,
        "invalid_api_key" => TtsError::InvalidApiKey,
        other => TtsError::Other(other.to_string()),
    }
}

#[async_trait]
impl TtsProviderPort for HttpTtsProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn list_voices(&self) -> Vec<TtsVoiceInfo> {
        self.voices.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioChunk, TtsError> {
        let Some(api_key) = &self.api_key else {
            return Err(TtsError::InvalidApiKey);
        };

        let voice = voice.or_else(|| self.voices.first().map(|v| v.id.as_str())).unwrap_or("default");
        let response = self
            .client
            .post(format!("{}/v1/speak", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({ "text": text, "voice": voice }))
            .send()
            .await
            .map_err(|e| TtsError::Other(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                error_code: String::new(),
                message: status.to_string(),
            });
            let err = classify(&body.error_code);
            return Err(if matches!(err, TtsError::Other(ref s) if s.is_empty()) {
                TtsError::Other(body.message)
            } else {
                err
            });
        }

        let bytes = response.bytes().await.map_err(|e| TtsError::Other(e.to_string()))?.to_vec();
        Ok(AudioChunk {
            bytes,
            format: self.format,
            sample_rate: self.sample_rate,
            channels: 1,
            bits_per_sample: 16,
        })
    }
}
