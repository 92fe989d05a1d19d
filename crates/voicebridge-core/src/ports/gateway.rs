//! Gateway port — the contract every LLM backend (built-in or plugin)
//! must satisfy. DTOs and the trait live here so that neither the gateway
//! registry nor individual gateway implementations need to depend on each
//! other's crate, only on this one.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::GatewayEvent;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway not configured: {0}")]
    NotConfigured(String),
    #[error("gateway transport error: {0}")]
    Transport(String),
    #[error("gateway request timed out after {0}s")]
    Timeout(u64),
    #[error("gateway '{0}' not found")]
    NotFound(String),
}

/// Extra per-request knobs a gateway may use; unrecognised by most
/// built-ins, consumed by richer ones (e.g. an `agent_id` for sub-agent
/// routing).
#[derive(Debug, Clone, Default)]
pub struct GatewayRequestOpts {
    pub agent_id: Option<String>,
}

/// Backend LLM connection. Implementations are registered with the
/// Gateway Registry under a unique `id()`.
#[async_trait]
pub trait GatewayPort: Send + Sync {
    fn id(&self) -> &str;

    /// Whether this gateway maintains one persistent transport (a
    /// reconnecting WebSocket) versus connecting per request.
    fn is_persistent(&self) -> bool;

    /// True once required env vars / config are present.
    fn is_configured(&self) -> bool;

    /// Cheap, non-blocking liveness check; default mirrors `is_configured`.
    fn is_healthy(&self) -> bool {
        self.is_configured()
    }

    /// Stream a response to `message` onto `tx`. On-demand gateways block
    /// for the lifetime of the call and only return after emitting the
    /// terminal event; persistent multiplexed gateways may return once the
    /// request has been dispatched onto their shared transport, with the
    /// terminal event (exactly one of `TextDone` / `Error`) following
    /// asynchronously on `tx`. Callers run this as its own task either way
    /// and drive completion off `tx`, not off this future resolving.
    async fn stream(
        &self,
        message: String,
        session_key: String,
        opts: GatewayRequestOpts,
        tx: mpsc::UnboundedSender<GatewayEvent>,
    ) -> Result<(), GatewayError>;

    /// Synchronous convenience for inter-gateway delegation: drains the
    /// gateway's own stream and returns the accumulated text, or an empty
    /// string (logged by the caller) on error/timeout.
    async fn ask(&self, message: String, session_key: String) -> String {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let opts = GatewayRequestOpts::default();
        if self.stream(message, session_key, opts, tx).await.is_err() {
            return String::new();
        }
        while let Some(event) = rx.recv().await {
            match event {
                GatewayEvent::TextDone { response, .. } => return response.unwrap_or_default(),
                GatewayEvent::Error { .. } => return String::new(),
                _ => {}
            }
        }
        String::new()
    }
}
