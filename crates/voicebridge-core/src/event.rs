//! Wire-level events shared by every producer and consumer in the pipeline.
//!
//! `GatewayEvent` is what a gateway implementation emits on its internal
//! channel; `ClientEvent` is what the orchestrator emits on the
//! client-facing NDJSON stream. The two are distinct types (not the same
//! enum wearing two hats) because a gateway's `text_done` carries the raw
//! LLM response while a client's `text_done` carries post-truncation text,
//! and a gateway never emits `audio`/`tts_error`/`session_reset`/`no_audio` —
//! only the orchestrator does.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An action/tool-call payload captured mid-stream. Kept as an opaque JSON
/// value at this layer — gateways and UI collaborators agree on its shape
/// out of band.
pub type ActionPayload = Value;

/// Events produced by a gateway implementation and consumed by the
/// orchestrator. Exactly one of `TextDone` / `Error` terminates the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    Handshake { ms: u64 },
    Delta { text: String },
    Action { action: ActionPayload },
    TextDone {
        response: Option<String>,
        #[serde(default)]
        actions: Vec<ActionPayload>,
    },
    Error { error: String },
}

/// Events emitted on the client-facing NDJSON stream (see external
/// interface §6.1). Field names are locked to the wire contract; renaming
/// any of them is a breaking client change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Handshake { ms: u64 },
    Delta { text: String },
    Action { action: ActionPayload },
    TextDone {
        response: Option<String>,
        #[serde(default)]
        actions: Vec<ActionPayload>,
        timing: TimingInfo,
    },
    Audio {
        audio: String,
        audio_format: AudioFormat,
        chunk: u32,
        total_chunks: Option<u32>,
        timing: AudioTiming,
    },
    TtsError {
        provider: String,
        reason: TtsErrorReason,
        error: String,
    },
    SessionReset {
        old: String,
        new: String,
        reason: String,
    },
    NoAudio,
    Error { error: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
    RawPcm,
}

/// Classification of a TTS provider failure, mirrored from the reason
/// codes the reference implementation maps provider errors onto.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TtsErrorReason {
    Terms,
    RateLimit,
    NoCredits,
    BadKey,
    FileReadError,
    Error,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TimingInfo {
    pub handshake_ms: Option<u64>,
    pub llm_ms: Option<u64>,
    pub total_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AudioTiming {
    pub tts_ms: u64,
    pub total_ms: u64,
}

impl ClientEvent {
    /// True for the three terminal variants a single request may emit
    /// exactly one of (see invariant #1).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::TextDone { .. } | Self::Error { .. } | Self::NoAudio)
    }
}
