use std::path::{Path, PathBuf};
use std::sync::RwLock;

use regex::Regex;

use crate::config::{MarkdownPattern, NormalizationConfig, StageConfig};

/// Cleans LLM response text before it reaches a TTS provider. Pipeline
/// order, mirrored exactly from the original `SpeechNormalizer.normalize`:
/// strip markdown → strip URLs → strip emoji → expand abbreviations →
/// collapse whitespace → trim → enforce max length.
pub struct SpeechNormalizer {
    config_path: PathBuf,
    config: RwLock<NormalizationConfig>,
}

impl SpeechNormalizer {
    #[must_use]
    pub fn new(config_path: PathBuf) -> Self {
        let config = NormalizationConfig::load(&config_path);
        Self { config_path, config: RwLock::new(config) }
    }

    /// Re-reads the config file from disk (e.g. after a hot-edit).
    pub fn reload(&self) {
        let fresh = NormalizationConfig::load(&self.config_path);
        *self.config.write().unwrap() = fresh;
        tracing::info!("speech normalization config reloaded");
    }

    #[must_use]
    pub fn config_for_profile(&self, profile_id: Option<&str>) -> StageConfig {
        self.config.read().unwrap().effective(profile_id)
    }

    #[must_use]
    pub fn normalize(&self, text: &str, profile_id: Option<&str>) -> String {
        if text.is_empty() {
            return text.to_string();
        }

        let config = self.config.read().unwrap();
        let stage = config.effective(profile_id);
        let mut text = text.to_string();

        if stage.strip_markdown {
            text = strip_markdown(&text, &config.markdown_patterns);
        }
        if stage.strip_urls {
            text = strip_urls(&text, config.url_pattern.as_deref());
        }
        if stage.strip_emoji {
            text = strip_emoji(&text);
        }

        let abbreviations = config.merged_abbreviations(profile_id);
        if !abbreviations.is_empty() {
            text = expand_abbreviations(&text, &abbreviations);
        }

        if stage.collapse_whitespace {
            text = collapse_whitespace(&text);
        }
        if stage.trim {
            text = text.trim().to_string();
        }

        enforce_max_length(&text, stage.max_length)
    }
}

fn strip_markdown(text: &str, patterns: &[MarkdownPattern]) -> String {
    if !patterns.is_empty() {
        let mut text = text.to_string();
        for entry in patterns {
            let builder = regex::RegexBuilder::new(&entry.pattern)
                .multi_line(entry.multiline)
                .build();
            match builder {
                Ok(re) => text = re.replace_all(&text, entry.replacement.as_str()).into_owned(),
                Err(e) => tracing::warn!("invalid markdown pattern {:?}: {e}", entry.pattern),
            }
        }
        return text;
    }

    // Built-in fallback patterns when no config patterns are supplied.
    let mut text = text.to_string();
    let subs: &[(&str, &str, bool)] = &[
        (r"```[\s\S]*?```", "", false),
        (r"`[^`]+`", "", false),
        (r"^#{1,6}\s+", "", true),
        (r"\*\*(.+?)\*\*", "$1", false),
        (r"__(.+?)__", "$1", false),
        (r"\*(.+?)\*", "$1", false),
        (r"_(.+?)_", "$1", false),
        (r"~~(.+?)~~", "$1", false),
        (r"^[-*_]{3,}$", "", true),
        (r"\[([^\]]+)\]\([^)]+\)", "$1", false),
        (r"!\[[^\]]*\]\([^)]+\)", "", false),
        (r"^>\s*", "", true),
        (r"^[\-\*\+]\s+", "", true),
        (r"^\d+\.\s+", "", true),
    ];
    for (pattern, replacement, multiline) in subs {
        if let Ok(re) = regex::RegexBuilder::new(pattern).multi_line(*multiline).build() {
            text = re.replace_all(&text, *replacement).into_owned();
        }
    }
    text
}

fn strip_urls(text: &str, configured_pattern: Option<&str>) -> String {
    let pattern = configured_pattern.unwrap_or(r"https?://\S+");
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(_) => Regex::new(r"https?://\S+").unwrap().replace_all(text, "").into_owned(),
    }
}

fn strip_emoji(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let cp = *c as u32;
            !((0x1F300..=0x1F9FF).contains(&cp)
                || (0x2600..=0x27BF).contains(&cp)
                || (0x1FA00..=0x1FAFF).contains(&cp)
                || (0x2702..=0x27B0).contains(&cp)
                || (0x24C2..=0x1F251).contains(&cp))
        })
        .collect()
}

/// Replace abbreviations longest-key-first so e.g. "API" doesn't shadow a
/// longer match, and word-boundary-anchored so "RAPID" is untouched by an
/// "API" rule.
fn expand_abbreviations(text: &str, abbreviations: &std::collections::HashMap<String, String>) -> String {
    let mut entries: Vec<_> = abbreviations.iter().collect();
    entries.sort_by_key(|(k, _)| std::cmp::Reverse(k.len()));

    let mut text = text.to_string();
    for (abbrev, expansion) in entries {
        if abbrev.is_empty() {
            continue;
        }
        let pattern = format!(r"\b{}\b", regex::escape(abbrev));
        match Regex::new(&pattern) {
            Ok(re) => text = re.replace_all(&text, expansion.as_str()).into_owned(),
            Err(e) => tracing::warn!("invalid abbreviation pattern for {abbrev:?}: {e}"),
        }
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    let spaces = Regex::new(r"[ \t]+").unwrap();
    let blank_lines = Regex::new(r"\n{2,}").unwrap();
    let newline = Regex::new(r"\n").unwrap();

    let text = spaces.replace_all(text, " ");
    let text = blank_lines.replace_all(&text, " ");
    newline.replace_all(&text, " ").into_owned()
}

fn enforce_max_length(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_len).collect();
    if let Some(cut) = truncated.rfind(". ") {
        if cut > max_len / 2 {
            return text.chars().take(cut + 1).collect();
        }
    }
    let mut hard_cut: String = truncated.trim_end().to_string();
    hard_cut.push_str("...");
    hard_cut
}

/// Convenience constructor that looks for the config file relative to a
/// project-root-style base directory, matching the original's
/// `config/speech_normalization.yaml` layout convention.
#[must_use]
pub fn default_config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config").join("speech_normalization.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn normalizer_with_defaults() -> SpeechNormalizer {
        SpeechNormalizer::new(PathBuf::from("/nonexistent/speech_normalization.toml"))
    }

    #[test]
    fn strips_markdown_and_urls() {
        let n = normalizer_with_defaults();
        let out = n.normalize("Hello **world**! Check https://example.com", None);
        assert_eq!(out, "Hello world! Check");
    }

    #[test]
    fn abbreviation_respects_word_boundary() {
        let n = normalizer_with_defaults();
        // "rapid" must not become "rapid" mangled by an "API" rule.
        let mut abbrevs = HashMap::new();
        abbrevs.insert("API".to_string(), "A P I".to_string());
        let out = expand_abbreviations("rapid API calls", &abbrevs);
        assert_eq!(out, "rapid A P I calls");
    }

    #[test]
    fn truncates_at_sentence_boundary_when_past_half_limit() {
        let text = "Sentence one. Sentence two. Sentence three.";
        let out = enforce_max_length(text, 20);
        assert_eq!(out, "Sentence one.");
    }

    #[test]
    fn hard_truncates_with_ellipsis_when_no_boundary_past_half() {
        let text = "a".repeat(100);
        let out = enforce_max_length(&text, 10);
        assert!(out.ends_with("..."));
        assert_eq!(out.len(), 13);
    }

    #[test]
    fn normalize_is_idempotent() {
        let n = normalizer_with_defaults();
        let once = n.normalize("Hello **world**! visit https://x.com 😀", None);
        let twice = n.normalize(&once, None);
        assert_eq!(once, twice);
    }
}
