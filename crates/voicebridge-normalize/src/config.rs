use std::collections::HashMap;

use serde::Deserialize;

/// On-disk shape of the normalization config file (§6.4), expressed as
/// TOML to match the rest of this workspace's human-editable config
/// files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub global: StageConfig,
    #[serde(default)]
    pub profiles: HashMap<String, StageConfig>,
    #[serde(default)]
    pub abbreviations: HashMap<String, String>,
    #[serde(default)]
    pub markdown_patterns: Vec<MarkdownPattern>,
    pub url_pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownPattern {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub multiline: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    #[serde(default = "default_true")]
    pub strip_markdown: bool,
    #[serde(default = "default_true")]
    pub strip_urls: bool,
    #[serde(default = "default_true")]
    pub strip_emoji: bool,
    #[serde(default = "default_true")]
    pub collapse_whitespace: bool,
    #[serde(default = "default_true")]
    pub trim: bool,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub abbreviations: HashMap<String, String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::builtin_defaults()
    }
}

impl StageConfig {
    /// Matches `SpeechNormalizer._builtin_defaults()`: used when no config
    /// file is present at all.
    #[must_use]
    pub fn builtin_defaults() -> Self {
        Self {
            strip_markdown: true,
            strip_urls: true,
            strip_emoji: true,
            collapse_whitespace: true,
            trim: true,
            max_length: 800,
            abbreviations: HashMap::new(),
        }
    }

    /// Merges a profile override on top of `self` (the global config).
    /// Abbreviations are additive, not replacing — matching
    /// `_merged_config`'s "merge abbreviations separately" behavior.
    #[must_use]
    pub fn merge_profile(&self, profile: &StageConfig) -> StageConfig {
        let mut merged = profile.clone();
        let mut abbrevs = self.abbreviations.clone();
        abbrevs.extend(profile.abbreviations.clone());
        merged.abbreviations = abbrevs;
        merged
    }
}

const fn default_true() -> bool {
    true
}

const fn default_max_length() -> usize {
    800
}

impl NormalizationConfig {
    /// Loads from `path`, falling back to built-in defaults (logged, not
    /// fatal) if the file is absent or malformed.
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(cfg) => {
                    tracing::info!("speech normalization config loaded from {}", path.display());
                    cfg
                }
                Err(e) => {
                    tracing::error!("failed to parse speech normalization config: {e} — using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::warn!(
                    "speech normalization config not found at {} — using built-in defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Effective config for `profile_id`: global merged with the profile
    /// override, or a clone of global if no such profile exists.
    #[must_use]
    pub fn effective(&self, profile_id: Option<&str>) -> StageConfig {
        match profile_id.and_then(|id| self.profiles.get(id)) {
            Some(profile) => self.global.merge_profile(profile),
            None => self.global.clone(),
        }
    }

    /// Abbreviations merged global + (if any) profile-specific, additive.
    #[must_use]
    pub fn merged_abbreviations(&self, profile_id: Option<&str>) -> HashMap<String, String> {
        let mut merged = self.abbreviations.clone();
        if let Some(profile) = profile_id.and_then(|id| self.profiles.get(id)) {
            merged.extend(profile.abbreviations.clone());
        }
        merged
    }
}
