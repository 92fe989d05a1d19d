//! Minimal RIFF/WAVE header parsing and rebuilding, enough to concatenate
//! the PCM payloads of several independently-synthesized WAV chunks into
//! one playable stream. Not a general-purpose WAV library — the Design
//! Notes call for exactly this narrow "wavglue" utility and nothing more.

#[derive(Debug, Clone, Copy)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum WavError {
    #[error("not a RIFF/WAVE container")]
    NotWav,
    #[error("truncated WAV header")]
    Truncated,
    #[error("no data subchunk found")]
    NoDataChunk,
}

/// Parses the `fmt ` subchunk and returns the byte range of the `data`
/// subchunk's payload.
pub fn parse(bytes: &[u8]) -> Result<(WavFormat, &[u8]), WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::NotWav);
    }

    let mut offset = 12;
    let mut format: Option<WavFormat> = None;
    let mut data: Option<&[u8]> = None;

    while offset + 8 <= bytes.len() {
        let chunk_id = &bytes[offset..offset + 4];
        let chunk_size = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().unwrap()) as usize;
        let body_start = offset + 8;
        let body_end = body_start.checked_add(chunk_size).ok_or(WavError::Truncated)?;
        if body_end > bytes.len() {
            return Err(WavError::Truncated);
        }
        let body = &bytes[body_start..body_end];

        match chunk_id {
            b"fmt " => {
                if body.len() < 16 {
                    return Err(WavError::Truncated);
                }
                format = Some(WavFormat {
                    channels: u16::from_le_bytes(body[2..4].try_into().unwrap()),
                    sample_rate: u32::from_le_bytes(body[4..8].try_into().unwrap()),
                    bits_per_sample: u16::from_le_bytes(body[14..16].try_into().unwrap()),
                });
            }
            b"data" => data = Some(body),
            _ => {}
        }

        // Chunks are word-aligned; skip the pad byte if chunk_size is odd.
        offset = body_end + (chunk_size % 2);
    }

    let format = format.ok_or(WavError::Truncated)?;
    let data = data.ok_or(WavError::NoDataChunk)?;
    Ok((format, data))
}

/// Builds a fresh 44-byte canonical WAV header followed by `pcm`.
#[must_use]
pub fn build(format: WavFormat, pcm: &[u8]) -> Vec<u8> {
    let byte_rate =
        format.sample_rate * u32::from(format.channels) * u32::from(format.bits_per_sample) / 8;
    let block_align = format.channels * format.bits_per_sample / 8;
    let data_len = pcm.len() as u32;
    let riff_len = 36 + data_len;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

/// Concatenates the PCM payloads of `wavs` (all assumed same format; the
/// first chunk's format wins) into one rebuilt WAV container.
pub fn concat(wavs: &[Vec<u8>]) -> Result<Vec<u8>, WavError> {
    let mut format = None;
    let mut pcm = Vec::new();
    for wav in wavs {
        let (fmt, data) = parse(wav)?;
        format.get_or_insert(fmt);
        pcm.extend_from_slice(data);
    }
    let format = format.ok_or(WavError::NoDataChunk)?;
    Ok(build(format, &pcm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wav(pcm: &[u8]) -> Vec<u8> {
        build(WavFormat { sample_rate: 24000, channels: 1, bits_per_sample: 16 }, pcm)
    }

    #[test]
    fn round_trips_format_and_data() {
        let pcm = vec![1, 2, 3, 4];
        let wav = sample_wav(&pcm);
        let (fmt, data) = parse(&wav).unwrap();
        assert_eq!(fmt.sample_rate, 24000);
        assert_eq!(fmt.channels, 1);
        assert_eq!(fmt.bits_per_sample, 16);
        assert_eq!(data, pcm.as_slice());
    }

    #[test]
    fn concat_sums_pcm_payload() {
        let a = sample_wav(&[1, 2]);
        let b = sample_wav(&[3, 4, 5]);
        let combined = concat(&[a, b]).unwrap();
        let (_, data) = parse(&combined).unwrap();
        assert_eq!(data, &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_non_wav_bytes() {
        assert!(matches!(parse(b"not a wav file"), Err(WavError::NotWav)));
    }
}
