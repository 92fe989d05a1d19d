use async_trait::async_trait;

use voicebridge_core::ports::{TtsError, TtsProviderPort, TtsVoiceInfo};
use voicebridge_core::{AudioChunk, AudioFormat};
use voicebridge_audio::wavglue::{build, WavFormat};

/// A local, always-available provider producing silent PCM proportional to
/// the input length. Stands in for an on-device ONNX-style model (the
/// "local" provider kind named in the system overview table) without
/// pulling in an inference runtime this repository doesn't otherwise need.
pub struct LocalSilenceProvider {
    sample_rate: u32,
}

impl Default for LocalSilenceProvider {
    fn default() -> Self {
        Self { sample_rate: 24_000 }
    }
}

impl LocalSilenceProvider {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

#[async_trait]
impl TtsProviderPort for LocalSilenceProvider {
    fn id(&self) -> &str {
        "local"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn list_voices(&self) -> Vec<TtsVoiceInfo> {
        vec![TtsVoiceInfo {
            id: "default".to_string(),
            name: "Local default".to_string(),
            language: "en".to_string(),
            gender: None,
            description: Some("On-device placeholder voice".to_string()),
        }]
    }

    fn priority(&self) -> i32 {
        100
    }

    async fn synthesize(&self, text: &str, _voice: Option<&str>) -> Result<AudioChunk, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::Other("empty text".to_string()));
        }
        // ~12 samples per character is an arbitrary but stable stand-in
        // for "roughly as long as a real utterance would be".
        let sample_count = (text.chars().count() * 12).max(self.sample_rate as usize / 10);
        let pcm = vec![0u8; sample_count * 2];
        let bytes = build(
            WavFormat { sample_rate: self.sample_rate, channels: 1, bits_per_sample: 16 },
            &pcm,
        );
        Ok(AudioChunk {
            bytes,
            format: AudioFormat::Wav,
            sample_rate: self.sample_rate,
            channels: 1,
            bits_per_sample: 16,
        })
    }
}
