//! Profile Resolver: reads the active-profile pointer file, looks up the
//! matching profile definition, and caches the result. Follows the same
//! active-pointer-file convention as the voice session counter, with an
//! atomic write-temp-then-rename swap for updates.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::RwLock;
use voicebridge_core::model::Profile;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile io error: {0}")]
    Io(String),
    #[error("profile '{0}' not found")]
    NotFound(String),
    #[error("malformed profile json: {0}")]
    Malformed(String),
}

pub struct ProfileResolver {
    profiles_dir: PathBuf,
    active_pointer: PathBuf,
    cache: RwLock<HashMap<String, Profile>>,
}

impl ProfileResolver {
    #[must_use]
    pub fn new(profiles_dir: PathBuf, active_pointer: PathBuf) -> Self {
        Self { profiles_dir, active_pointer, cache: RwLock::new(HashMap::new()) }
    }

    /// Returns the active profile, or the built-in fallback if no pointer
    /// file / profile definition exists yet.
    pub async fn active(&self) -> Profile {
        let id = self.active_id().await;
        match self.get(&id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("active profile '{id}' unavailable ({e}); using fallback");
                Profile::fallback()
            }
        }
    }

    async fn active_id(&self) -> String {
        match tokio::fs::read_to_string(&self.active_pointer).await {
            Ok(raw) => raw.trim().to_string(),
            Err(_) => "default".to_string(),
        }
    }

    /// Looks up `id`, rescanning `profiles_dir` on a cache miss.
    pub async fn get(&self, id: &str) -> Result<Profile, ProfileError> {
        {
            let cache = self.cache.read().await;
            if let Some(p) = cache.get(id) {
                return Ok(p.clone());
            }
        }

        let path = self.profiles_dir.join(format!("{id}.json"));
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| ProfileError::Io(e.to_string()))?;
        let profile: Profile = serde_json::from_str(&raw).map_err(|e| ProfileError::Malformed(e.to_string()))?;

        self.cache.write().await.insert(id.to_string(), profile.clone());
        Ok(profile)
    }

    /// Lists every profile definition currently in `profiles_dir`.
    pub async fn list(&self) -> Vec<Profile> {
        let mut profiles = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(&self.profiles_dir).await else {
            return profiles;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if let Ok(profile) = self.get(stem).await {
                    profiles.push(profile);
                }
            }
        }
        profiles
    }

    /// Atomically swaps the active-profile pointer via write-temp then
    /// rename, matching the counter-file and profile-pointer convention.
    pub async fn set_active(&self, id: &str) -> Result<(), ProfileError> {
        let tmp_path = self.active_pointer.with_extension("tmp");
        tokio::fs::write(&tmp_path, id).await.map_err(|e| ProfileError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &self.active_pointer).await.map_err(|e| ProfileError::Io(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_profile(dir: &std::path::Path, id: &str) {
        let profile = serde_json::json!({
            "id": id,
            "gateway_id": "openclaw",
            "tts_provider": "local",
            "voice": "default",
        });
        tokio::fs::write(dir.join(format!("{id}.json")), profile.to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn falls_back_when_pointer_missing() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ProfileResolver::new(dir.path().to_path_buf(), dir.path().join("active"));
        let profile = resolver.active().await;
        assert_eq!(profile.id, "default");
    }

    #[tokio::test]
    async fn resolves_active_pointer_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "night-mode").await;
        let resolver = ProfileResolver::new(dir.path().to_path_buf(), dir.path().join("active"));
        resolver.set_active("night-mode").await.unwrap();

        let profile = resolver.active().await;
        assert_eq!(profile.id, "night-mode");
        assert_eq!(profile.tts_provider, "local");
    }
}
