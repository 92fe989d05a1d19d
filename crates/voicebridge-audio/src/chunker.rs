use voicebridge_core::ports::{TtsError, TtsProviderPort};
use voicebridge_core::{AudioChunk, AudioFormat};

use crate::wavglue;

/// Default chunk size threshold (`C` in §4.7), matching the normalizer's
/// default `max_length`.
pub const DEFAULT_MAX_CHARS: usize = 800;

/// Greedily splits `text` on sentence-terminator boundaries into pieces
/// no longer than `max_chars`. A single sentence longer than `max_chars`
/// is emitted as its own (oversized) piece rather than cut mid-word.
#[must_use]
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let sentences = split_sentences(text);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if !current.is_empty() && current.chars().count() + sentence.chars().count() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(&sentence);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(text.to_string());
    }
    chunks
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let chars: Vec<char> = text.chars().collect();
    let mut byte_pos = 0;
    let mut char_idx = 0;

    while char_idx < chars.len() {
        let c = chars[char_idx];
        let c_len = c.len_utf8();
        if matches!(c, '.' | '!' | '?') {
            let next_is_boundary = char_idx + 1 >= chars.len() || chars[char_idx + 1].is_whitespace();
            if next_is_boundary {
                let end = byte_pos + c_len;
                sentences.push(text[start..end].to_string());
                start = end;
            }
        }
        byte_pos += c_len;
        char_idx += 1;
    }
    if start < bytes.len() {
        sentences.push(text[start..].to_string());
    }
    sentences
}

/// Synthesizes `text` via `provider`, splitting into multiple chunks and
/// recombining when the text exceeds `max_chars`. For WAV outputs, chunk
/// PCM payloads are concatenated into a single rebuilt container; other
/// formats are concatenated as opaque byte runs.
pub async fn synthesize_chunked(
    text: &str,
    provider: &dyn TtsProviderPort,
    voice: Option<&str>,
    max_chars: usize,
) -> Result<AudioChunk, TtsError> {
    let pieces = split_into_chunks(text, max_chars);

    if pieces.len() == 1 {
        return provider.synthesize(&pieces[0], voice).await;
    }

    let mut successes = Vec::new();
    for piece in &pieces {
        match provider.synthesize(piece, voice).await {
            Ok(chunk) => successes.push(chunk),
            Err(e) => tracing::warn!("chunk synthesis failed, continuing: {e}"),
        }
    }

    if successes.is_empty() {
        let retry_text: String = text.chars().take(max_chars).collect();
        return provider.synthesize(&retry_text, voice).await;
    }

    combine(successes)
}

fn combine(chunks: Vec<AudioChunk>) -> Result<AudioChunk, TtsError> {
    let format = chunks[0].format;
    let sample_rate = chunks[0].sample_rate;
    let channels = chunks[0].channels;
    let bits_per_sample = chunks[0].bits_per_sample;

    let bytes = if format == AudioFormat::Wav {
        let wavs: Vec<Vec<u8>> = chunks.iter().map(|c| c.bytes.clone()).collect();
        wavglue::concat(&wavs).map_err(|e| TtsError::Other(e.to_string()))?
    } else {
        chunks.iter().flat_map(|c| c.bytes.clone()).collect()
    };

    Ok(AudioChunk { bytes, format, sample_rate, channels, bits_per_sample })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chunk_when_under_limit() {
        let chunks = split_into_chunks("Hello there.", 800);
        assert_eq!(chunks, vec!["Hello there."]);
    }

    #[test]
    fn splits_on_sentence_boundaries_when_over_limit() {
        let text = "One. Two. Three. Four.";
        let chunks = split_into_chunks(text, 9);
        assert_eq!(chunks, vec!["One. Two.", " Three.", " Four."]);
    }

    #[test]
    fn oversized_single_sentence_is_its_own_chunk() {
        let text = "x".repeat(50);
        let chunks = split_into_chunks(&text, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 50);
    }
}
