//! Fallback chain: an ordered list of `Responder`s tried in turn when the
//! primary gateway is unconfigured or never reaches `text_done`. Modeled as
//! data, not nested error handlers, so additional fallbacks can be appended
//! without restructuring control flow (Design Notes).

use std::sync::Arc;

use async_trait::async_trait;

use voicebridge_core::ports::GatewayPort;

/// One candidate in the fallback chain. Returns `None` to let the chain
/// move on to the next candidate.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &str, session_key: &str) -> Option<String>;
}

/// Delegates to another registered gateway's `ask()` — a direct, non-tool
/// capable backend used as a secondary path.
pub struct GatewayResponder {
    gateway: Arc<dyn GatewayPort>,
}

impl GatewayResponder {
    #[must_use]
    pub fn new(gateway: Arc<dyn GatewayPort>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Responder for GatewayResponder {
    async fn respond(&self, message: &str, session_key: &str) -> Option<String> {
        if !self.gateway.is_configured() {
            return None;
        }
        let text = self.gateway.ask(message.to_string(), session_key.to_string()).await;
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Last-resort responder: always answers, with a canned apology.
pub struct ApologyResponder {
    text: String,
}

impl Default for ApologyResponder {
    fn default() -> Self {
        Self::new("Sorry, I'm having trouble responding right now. Please try again in a moment.")
    }
}

impl ApologyResponder {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Responder for ApologyResponder {
    async fn respond(&self, _message: &str, _session_key: &str) -> Option<String> {
        Some(self.text.clone())
    }
}

/// Tries each responder in order, returning the first non-`None` answer.
/// Since the chain always ends in an `ApologyResponder` in practice, `run`
/// only returns `None` for an empty chain.
#[derive(Default)]
pub struct FallbackChain {
    responders: Vec<Arc<dyn Responder>>,
}

impl FallbackChain {
    #[must_use]
    pub fn new(responders: Vec<Arc<dyn Responder>>) -> Self {
        Self { responders }
    }

    pub async fn run(&self, message: &str, session_key: &str) -> Option<String> {
        for responder in &self.responders {
            if let Some(text) = responder.respond(message, session_key).await {
                return Some(text);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(Option<&'static str>);

    #[async_trait]
    impl Responder for Stub {
        async fn respond(&self, _message: &str, _session_key: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[tokio::test]
    async fn returns_first_non_none_response() {
        let chain = FallbackChain::new(vec![
            Arc::new(Stub(None)),
            Arc::new(Stub(Some("second"))),
            Arc::new(Stub(Some("third"))),
        ]);
        assert_eq!(chain.run("hi", "s-1").await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn apology_responder_always_answers() {
        let chain = FallbackChain::new(vec![Arc::new(Stub(None)), Arc::new(ApologyResponder::default())]);
        assert!(chain.run("hi", "s-1").await.is_some());
    }
}
