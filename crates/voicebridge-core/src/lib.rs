//! Shared types for the voicebridge workspace: wire events, DTOs, and the
//! port traits that let the orchestrator, registries, and edge crates
//! depend on contracts rather than on each other.

pub mod event;
pub mod model;
pub mod ports;

pub use event::{AudioFormat, AudioTiming, ClientEvent, GatewayEvent, TimingInfo, TtsErrorReason};
pub use model::{
    AudioChunk, ConversationTurn, Profile, RequestOverrides, ReservationToken, Role, UiContext,
};
