//! The Conversation Orchestrator: the streaming state machine sitting
//! between a Gateway and the client-facing NDJSON stream, with the
//! fallback chain and sentence-extraction helpers it depends on.

pub mod fallback;
mod orchestrator;
pub mod request;
mod sentence;

pub use fallback::{ApologyResponder, FallbackChain, GatewayResponder, Responder};
pub use orchestrator::ConversationOrchestrator;
pub use request::ConversationRequest;
