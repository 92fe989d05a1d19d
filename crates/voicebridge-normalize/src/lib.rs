//! Speech Normalizer: a pure, config-driven text cleanup pipeline run on
//! every LLM-produced sentence before it is handed to a TTS provider.
//! Grounded in the original `services/speech_normalizer.py`.

mod config;
mod normalizer;

pub use config::{MarkdownPattern, NormalizationConfig, StageConfig};
pub use normalizer::{default_config_path, SpeechNormalizer};
