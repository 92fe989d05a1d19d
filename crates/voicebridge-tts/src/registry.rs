use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use voicebridge_core::ports::{TtsProviderInfo, TtsProviderPort};

/// Discovers, selects, and introspects TTS providers by id. Grounded in
/// `ProviderRegistry`: providers register once at startup; selection
/// falls back from an explicit id to a configured default to the first
/// registered provider.
pub struct TtsRegistry {
    providers: RwLock<HashMap<String, Arc<dyn TtsProviderPort>>>,
    default_provider: RwLock<Option<String>>,
}

impl Default for TtsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { providers: RwLock::new(HashMap::new()), default_provider: RwLock::new(None) }
    }

    pub async fn register(&self, provider: Arc<dyn TtsProviderPort>) {
        let id = provider.id().to_string();
        tracing::info!("registered tts provider: {id}");
        self.providers.write().await.insert(id, provider);
    }

    /// Sets the `default_provider` id read from config (e.g. `providers.toml`'s
    /// `tts.default_provider` key in the original's terms).
    pub async fn set_default(&self, id: impl Into<String>) {
        *self.default_provider.write().await = Some(id.into());
    }

    /// Selection order: explicit id, then configured default, then first
    /// registered provider (§4.3).
    pub async fn get(&self, provider_id: Option<&str>) -> Option<Arc<dyn TtsProviderPort>> {
        let providers = self.providers.read().await;

        if let Some(id) = provider_id {
            if let Some(p) = providers.get(id) {
                return Some(p.clone());
            }
        }

        if let Some(default_id) = self.default_provider.read().await.clone() {
            if let Some(p) = providers.get(&default_id) {
                return Some(p.clone());
            }
        }

        providers.values().next().cloned()
    }

    /// Sorted (ascending priority) introspection listing. Providers whose
    /// `is_available()` is false are included only when requested, but are
    /// never dropped from the registry itself.
    pub async fn list(&self, include_unavailable: bool) -> Vec<TtsProviderInfo> {
        let providers = self.providers.read().await;
        let mut results: Vec<TtsProviderInfo> = providers
            .values()
            .filter(|p| include_unavailable || p.is_available())
            .map(|p| TtsProviderInfo {
                id: p.id().to_string(),
                name: p.id().to_string(),
                available: p.is_available(),
                priority: p.priority(),
            })
            .collect();
        results.sort_by_key(|p| p.priority);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use voicebridge_core::ports::{TtsError, TtsVoiceInfo};
    use voicebridge_core::{AudioChunk, AudioFormat};

    struct Stub {
        id: &'static str,
        available: bool,
        priority: i32,
    }

    #[async_trait]
    impl TtsProviderPort for Stub {
        fn id(&self) -> &str {
            self.id
        }
        fn is_available(&self) -> bool {
            self.available
        }
        fn list_voices(&self) -> Vec<TtsVoiceInfo> {
            vec![]
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        async fn synthesize(&self, _text: &str, _voice: Option<&str>) -> Result<AudioChunk, TtsError> {
            Ok(AudioChunk {
                bytes: vec![],
                format: AudioFormat::Wav,
                sample_rate: 24000,
                channels: 1,
                bits_per_sample: 16,
            })
        }
    }

    #[tokio::test]
    async fn falls_back_to_default_then_first_registered() {
        let registry = TtsRegistry::new();
        registry.register(Arc::new(Stub { id: "a", available: true, priority: 10 })).await;
        registry.register(Arc::new(Stub { id: "b", available: true, priority: 5 })).await;
        registry.set_default("b").await;

        assert_eq!(registry.get(None).await.unwrap().id(), "b");
        assert_eq!(registry.get(Some("a")).await.unwrap().id(), "a");
        assert_eq!(registry.get(Some("missing")).await.unwrap().id(), "b");
    }

    #[tokio::test]
    async fn list_sorts_by_priority_and_hides_unavailable_by_default() {
        let registry = TtsRegistry::new();
        registry.register(Arc::new(Stub { id: "a", available: true, priority: 10 })).await;
        registry.register(Arc::new(Stub { id: "b", available: false, priority: 5 })).await;

        let visible = registry.list(false).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "a");

        let all = registry.list(true).await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "b"); // priority 5 sorts first
    }
}
