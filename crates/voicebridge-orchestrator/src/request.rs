//! Request-scoped inputs to the orchestrator, assembled by the HTTP edge.

use voicebridge_core::model::{RequestOverrides, UiContext};

#[derive(Debug, Clone)]
pub struct ConversationRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub overrides: RequestOverrides,
    pub ui_context: UiContext,
}

impl ConversationRequest {
    /// The text actually sent to the gateway: UI context prefix, then the
    /// raw message (§6.2).
    #[must_use]
    pub fn gateway_message(&self) -> String {
        format!("{}{}", self.ui_context.as_prefix(), self.message)
    }

    /// Whether `message` is a system sentinel trigger (`__`-prefixed),
    /// exempted from normal speech and subject to NO/YES suppression
    /// (§4.8.1).
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.message.starts_with("__")
    }
}
