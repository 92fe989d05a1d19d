//! TTS provider port — mirrors the gateway port's shape: a trait plus
//! transport-agnostic DTOs, so the registry and individual providers stay
//! mutually decoupled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::AudioChunk;

#[derive(Debug, Error, Clone)]
pub enum TtsError {
    #[error("provider requires terms acceptance")]
    TermsRequired,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
    #[error("insufficient quota/credits")]
    InsufficientQuota,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("voice '{0}' not found")]
    VoiceNotFound(String),
    #[error("provider error: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsVoiceInfo {
    pub id: String,
    pub name: String,
    pub language: String,
    pub gender: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsProviderInfo {
    pub id: String,
    pub name: String,
    pub available: bool,
    pub priority: i32,
}

#[async_trait]
pub trait TtsProviderPort: Send + Sync {
    fn id(&self) -> &str;

    fn is_available(&self) -> bool;

    fn list_voices(&self) -> Vec<TtsVoiceInfo>;

    fn default_voice(&self) -> Option<String> {
        self.list_voices().into_iter().next().map(|v| v.id)
    }

    fn priority(&self) -> i32 {
        100
    }

    /// Convert `text` to one audio chunk for `voice` (or the provider
    /// default). Implementations never receive empty/whitespace-only text;
    /// the caller validates that first.
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioChunk, TtsError>;
}
