use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use voicebridge_core::model::ConversationTurn;
use voicebridge_core::ports::{SessionStorePort, StoreError};

use crate::{CONSECUTIVE_EMPTY_RESET_THRESHOLD, DEFAULT_COUNTER, MAX_HISTORY_MESSAGES};

/// File-backed session counter with an in-memory cache, plus a capped
/// per-session history map. One instance is shared (via `Arc`) across all
/// requests for the life of the process.
pub struct FileSessionStore {
    counter_path: PathBuf,
    counter_cache: RwLock<HashMap<String, u64>>,
    histories: RwLock<HashMap<String, VecDeque<ConversationTurn>>>,
    consecutive_empty: RwLock<HashMap<String, u32>>,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(counter_path: PathBuf) -> Self {
        Self {
            counter_path,
            counter_cache: RwLock::new(HashMap::new()),
            histories: RwLock::new(HashMap::new()),
            consecutive_empty: RwLock::new(HashMap::new()),
        }
    }

    async fn read_counter_from_disk(&self) -> u64 {
        match tokio::fs::read_to_string(&self.counter_path).await {
            Ok(raw) => raw.trim().parse().unwrap_or(DEFAULT_COUNTER),
            Err(_) => DEFAULT_COUNTER,
        }
    }

    async fn write_counter_to_disk(&self, value: u64) -> Result<(), StoreError> {
        tokio::fs::write(&self.counter_path, value.to_string())
            .await
            .map_err(|e| StoreError::CounterIo(e.to_string()))
    }
}

#[async_trait]
impl SessionStorePort for FileSessionStore {
    async fn current(&self, prefix: &str) -> String {
        {
            let cache = self.counter_cache.read().await;
            if let Some(n) = cache.get(prefix) {
                return format!("{prefix}-{n}");
            }
        }
        // Cache miss: read from disk, then re-check under the write lock
        // in case another task populated it first (double-checked).
        let from_disk = self.read_counter_from_disk().await;
        let mut cache = self.counter_cache.write().await;
        let n = *cache.entry(prefix.to_string()).or_insert(from_disk);
        format!("{prefix}-{n}")
    }

    async fn bump(&self, prefix: &str) -> Result<String, StoreError> {
        let mut cache = self.counter_cache.write().await;
        let current = self.read_counter_from_disk().await;
        let next = current + 1;
        if let Err(e) = self.write_counter_to_disk(next).await {
            warn!("session counter write failed, continuing with in-memory value: {e}");
        }
        cache.insert(prefix.to_string(), next);
        drop(cache);

        self.consecutive_empty.write().await.insert(prefix.to_string(), 0);
        tracing::info!("### SESSION RESET: bumped to {prefix}-{next}");
        Ok(format!("{prefix}-{next}"))
    }

    async fn history(&self, key: &str) -> Vec<ConversationTurn> {
        self.histories
            .read()
            .await
            .get(key)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn append(&self, key: &str, turn: ConversationTurn) {
        let mut histories = self.histories.write().await;
        let entry = histories.entry(key.to_string()).or_default();
        entry.push_back(turn);
        while entry.len() > MAX_HISTORY_MESSAGES {
            entry.pop_front();
        }
    }

    async fn reset_history(&self, key: &str) {
        self.histories.write().await.remove(key);
    }

    async fn record_text_done(&self, prefix: &str, was_empty: bool) -> bool {
        let mut map = self.consecutive_empty.write().await;
        let counter = map.entry(prefix.to_string()).or_insert(0);
        if was_empty {
            *counter += 1;
        } else {
            *counter = 0;
        }
        *counter >= CONSECUTIVE_EMPTY_RESET_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicebridge_core::model::Role;

    fn tempfile_path() -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".voice-session-counter");
        std::mem::forget(dir);
        path
    }

    #[tokio::test]
    async fn defaults_to_six_when_missing() {
        let store = FileSessionStore::new(tempfile_path());
        assert_eq!(store.current("voice-main").await, "voice-main-6");
    }

    #[tokio::test]
    async fn bump_is_monotonic_and_resets_empty_counter() {
        let store = FileSessionStore::new(tempfile_path());
        assert!(!store.record_text_done("voice-main", true).await);
        assert!(!store.record_text_done("voice-main", true).await);
        assert!(store.record_text_done("voice-main", true).await);

        let first = store.current("voice-main").await;
        let bumped = store.bump("voice-main").await.unwrap();
        assert_ne!(first, bumped);
        assert!(bumped.ends_with("-7"));
        assert!(!store.record_text_done("voice-main", true).await);
    }

    #[tokio::test]
    async fn history_caps_at_max_messages() {
        let store = FileSessionStore::new(tempfile_path());
        for i in 0..30 {
            store
                .append(
                    "sess-1",
                    ConversationTurn { role: Role::User, content: format!("msg {i}") },
                )
                .await;
        }
        assert_eq!(store.history("sess-1").await.len(), MAX_HISTORY_MESSAGES);
        assert_eq!(store.history("sess-1").await[0].content, "msg 10");
    }
}
