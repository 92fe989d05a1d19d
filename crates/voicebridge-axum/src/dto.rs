//! Wire-level request/response bodies for the HTTP edge (§6.2, §4.11).
//! Decoupled from the orchestrator's own `ConversationRequest` so the
//! wire contract can evolve without touching the state machine.

use serde::{Deserialize, Serialize};

use voicebridge_core::model::{RequestOverrides, UiContext};

/// Hard cap on `message` length (§4.11); requests over this are rejected
/// with HTTP 400 before any gateway work starts.
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
pub struct ConversationRequestBody {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub tts_provider: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub gateway_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub max_response_chars: Option<usize>,
    #[serde(default)]
    pub ui_context: UiContext,
}

impl ConversationRequestBody {
    #[must_use]
    pub fn into_overrides(&self) -> RequestOverrides {
        RequestOverrides {
            tts_provider: self.tts_provider.clone(),
            voice: self.voice.clone(),
            gateway_id: self.gateway_id.clone(),
            agent_id: self.agent_id.clone(),
            max_response_chars: self.max_response_chars,
        }
    }
}

/// Selects streaming (default) vs. buffered-JSON response shape (§4.11:
/// "streaming is selected by a query flag or a request header").
#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    Soft,
    Hard,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequestBody {
    pub mode: ResetMode,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub session_key: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub gateways: Vec<voicebridge_gateway::GatewayInfo>,
    pub tts_providers: Vec<voicebridge_core::ports::TtsProviderInfo>,
}
