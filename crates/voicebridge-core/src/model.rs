//! Shared value types that cross crate boundaries without pulling in any
//! one crate's implementation details.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::AudioFormat;

/// Role of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Immutable per-request profile snapshot (see §4.10 Profile Resolver).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub gateway_id: String,
    pub tts_provider: String,
    pub voice: String,
    pub max_response_chars: Option<usize>,
    #[serde(default)]
    pub speech_norm_overrides: HashMap<String, serde_json::Value>,
}

impl Profile {
    /// A minimal profile used when no profile file exists yet.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            id: "default".to_string(),
            gateway_id: "openclaw".to_string(),
            tts_provider: "local".to_string(),
            voice: "default".to_string(),
            max_response_chars: None,
            speech_norm_overrides: HashMap::new(),
        }
    }
}

/// A finished synthesis result from a TTS provider.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

/// Short-lived claim used by side-channel collaborators (e.g. a music
/// player reserving exclusive playback). Modeled here because it appears
/// on the action side-channel the orchestrator forwards, even though no
/// collaborator implementation lives in this repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationToken {
    pub id: String,
    pub track: String,
    pub acquired_at: DateTime<Utc>,
}

impl ReservationToken {
    pub const TTL_SECONDS: i64 = 30;

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.acquired_at).num_seconds() >= Self::TTL_SECONDS
    }
}

/// Request-scoped overrides a caller may pass alongside the message body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestOverrides {
    pub tts_provider: Option<String>,
    pub voice: Option<String>,
    pub gateway_id: Option<String>,
    pub agent_id: Option<String>,
    pub max_response_chars: Option<usize>,
}

/// UI context flags, prepended as bracketed text ahead of the user message
/// before it reaches the gateway (see §6.2).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiContext {
    #[serde(default)]
    pub canvas_visible: bool,
    #[serde(default)]
    pub canvas_displayed: Option<String>,
    #[serde(default)]
    pub music_playing: bool,
    #[serde(default)]
    pub music_track: Option<String>,
    #[serde(default)]
    pub identified_person: Option<String>,
}

impl UiContext {
    /// Renders the non-empty fields as a bracketed prefix, or an empty
    /// string if nothing is set.
    #[must_use]
    pub fn as_prefix(&self) -> String {
        let mut parts = Vec::new();
        if self.canvas_visible {
            parts.push("[canvas: visible]".to_string());
        }
        if let Some(d) = &self.canvas_displayed {
            parts.push(format!("[canvas showing: {d}]"));
        }
        if self.music_playing {
            parts.push("[music: playing]".to_string());
        }
        if let Some(t) = &self.music_track {
            parts.push(format!("[music track: {t}]"));
        }
        if let Some(p) = &self.identified_person {
            parts.push(format!("[identified: {p}]"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("{} ", parts.join(" "))
        }
    }
}
