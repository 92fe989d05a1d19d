use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

use voicebridge_core::event::GatewayEvent;
use voicebridge_core::ports::{GatewayPort, GatewayRequestOpts};

use crate::plugin::discover_and_load;

pub const DEFAULT_GATEWAY_ID: &str = "openclaw";

#[derive(Debug, Clone, Serialize)]
pub struct GatewayInfo {
    pub id: String,
    pub configured: bool,
    pub healthy: bool,
    pub persistent: bool,
}

/// Registers built-in and plugin gateways, and routes requests to the one
/// selected by id (falling back to the default). Grounded in
/// `GatewayManager`: `register`/`get`/`stream_to_queue`/`ask`/`list_gateways`
/// map directly onto this struct's methods.
pub struct GatewayRegistry {
    gateways: RwLock<HashMap<String, Arc<dyn GatewayPort>>>,
    // Keeps plugin `Library` handles alive for the process lifetime; see
    // `plugin::LoadedPlugin`.
    _plugin_handles: RwLock<Vec<crate::plugin::LoadedPlugin>>,
}

impl Default for GatewayRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { gateways: RwLock::new(HashMap::new()), _plugin_handles: RwLock::new(Vec::new()) }
    }

    pub async fn register(&self, gateway: Arc<dyn GatewayPort>) {
        let id = gateway.id().to_string();
        let status = if gateway.is_configured() { "configured" } else { "NOT configured" };
        if !gateway.is_configured() {
            tracing::warn!("gateway '{id}' registered but not configured (missing env vars)");
        }
        tracing::info!("registered gateway '{id}' ({status})");
        self.gateways.write().await.insert(id, gateway);
    }

    /// Scans `plugins_dir` for gateway plugin manifests and registers
    /// every one that loads cleanly.
    pub async fn load_plugins(&self, plugins_dir: &Path) {
        let loaded = discover_and_load(plugins_dir);
        if loaded.is_empty() {
            return;
        }
        let ids: Vec<String> = loaded.iter().map(|p| p.gateway.id().to_string()).collect();
        for plugin in &loaded {
            self.register(plugin.gateway.clone()).await;
        }
        *self._plugin_handles.write().await = loaded;
        tracing::info!("gateway registry: loaded plugin gateways: {}", ids.join(", "));
    }

    pub async fn get(&self, gateway_id: Option<&str>) -> Option<Arc<dyn GatewayPort>> {
        let id = gateway_id.unwrap_or(DEFAULT_GATEWAY_ID);
        self.gateways.read().await.get(id).cloned()
    }

    /// Routes a conversation request to the named gateway, falling back
    /// to the default id if unregistered, and emitting a single `error`
    /// event on `tx` if neither is usable. Mirrors
    /// `GatewayManager.stream_to_queue`.
    pub async fn route(
        &self,
        gateway_id: Option<&str>,
        message: String,
        session_key: String,
        opts: GatewayRequestOpts,
        tx: mpsc::UnboundedSender<GatewayEvent>,
    ) {
        let requested = gateway_id.unwrap_or(DEFAULT_GATEWAY_ID).to_string();
        let gateways = self.gateways.read().await;
        let mut gw = gateways.get(&requested).cloned();

        let requested_unconfigured = gw.as_ref().is_some_and(|g| !g.is_configured());
        if (gw.is_none() || requested_unconfigured) && requested != DEFAULT_GATEWAY_ID {
            if requested_unconfigured {
                tracing::warn!(
                    "gateway '{requested}' registered but not configured — falling back to '{DEFAULT_GATEWAY_ID}'"
                );
            } else {
                tracing::warn!("gateway '{requested}' not registered — falling back to '{DEFAULT_GATEWAY_ID}'");
            }
            gw = gateways.get(DEFAULT_GATEWAY_ID).cloned();
        }
        drop(gateways);

        let Some(gw) = gw else {
            let err = format!("no gateway available (requested: '{requested}', default fallback also missing)");
            tracing::error!("{err}");
            let _ = tx.send(GatewayEvent::Error { error: err });
            return;
        };

        if !gw.is_configured() {
            let err = format!("gateway '{}' is not configured (check env vars)", gw.id());
            tracing::error!("{err}");
            let _ = tx.send(GatewayEvent::Error { error: err });
            return;
        }

        if let Err(e) = gw.stream(message, session_key, opts, tx.clone()).await {
            let _ = tx.send(GatewayEvent::Error { error: e.to_string() });
        }
    }

    /// Inter-gateway delegation: drains `gateway_id`'s own response and
    /// returns the text, or an empty string (logged) on error.
    pub async fn ask(&self, gateway_id: &str, message: String, session_key: String) -> String {
        let Some(gw) = self.gateways.read().await.get(gateway_id).cloned() else {
            tracing::error!("ask(): gateway '{gateway_id}' not registered");
            return String::new();
        };
        if !gw.is_configured() {
            tracing::error!("ask(): gateway '{gateway_id}' not configured");
            return String::new();
        }
        gw.ask(message, session_key).await
    }

    pub async fn list_gateways(&self) -> Vec<GatewayInfo> {
        self.gateways
            .read()
            .await
            .values()
            .map(|gw| GatewayInfo {
                id: gw.id().to_string(),
                configured: gw.is_configured(),
                healthy: gw.is_healthy(),
                persistent: gw.is_persistent(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use voicebridge_core::ports::GatewayError;

    struct Stub {
        id: &'static str,
        configured: bool,
    }

    #[async_trait]
    impl GatewayPort for Stub {
        fn id(&self) -> &str {
            self.id
        }
        fn is_persistent(&self) -> bool {
            false
        }
        fn is_configured(&self) -> bool {
            self.configured
        }
        async fn stream(
            &self,
            _message: String,
            _session_key: String,
            _opts: GatewayRequestOpts,
            tx: mpsc::UnboundedSender<GatewayEvent>,
        ) -> Result<(), GatewayError> {
            let _ = tx.send(GatewayEvent::TextDone { response: Some("ok".to_string()), actions: vec![] });
            Ok(())
        }
    }

    #[tokio::test]
    async fn falls_back_to_default_when_requested_missing() {
        let registry = GatewayRegistry::new();
        registry.register(Arc::new(Stub { id: "openclaw", configured: true })).await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .route(Some("nonexistent"), "hi".into(), "s-1".into(), GatewayRequestOpts::default(), tx)
            .await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, GatewayEvent::TextDone { .. }));
    }

    #[tokio::test]
    async fn falls_back_to_default_when_requested_unconfigured() {
        let registry = GatewayRegistry::new();
        registry.register(Arc::new(Stub { id: "openclaw", configured: true })).await;
        registry.register(Arc::new(Stub { id: "other", configured: false })).await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .route(Some("other"), "hi".into(), "s-1".into(), GatewayRequestOpts::default(), tx)
            .await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, GatewayEvent::TextDone { .. }));
    }

    #[tokio::test]
    async fn emits_error_when_no_gateway_available() {
        let registry = GatewayRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.route(Some("missing"), "hi".into(), "s-1".into(), GatewayRequestOpts::default(), tx).await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, GatewayEvent::Error { .. }));
    }
}
