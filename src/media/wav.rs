//! Raw PCM handling for speech output.
//!
//! The TTS models return headerless little-endian 16-bit mono PCM labelled
//! `audio/L16;codec=pcm;rate=24000`. Playback surfaces need a container, so
//! the client wraps it in a minimal RIFF/WAVE header.

use bytes::{BufMut, Bytes, BytesMut};
use mime::Mime;
use std::time::Duration;

/// Sample rate assumed when the MIME type does not carry one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// MIME type of wrapped audio.
pub const WAV_MIME: &str = "audio/wav";

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = (BITS_PER_SAMPLE / 8) as u32;
const HEADER_LEN: usize = 44;

/// Highest sample rate accepted from a MIME parameter.
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Reads the `rate=` parameter of an audio MIME type.
///
/// Missing, malformed and out-of-range rates fall back to [`DEFAULT_SAMPLE_RATE`].
pub fn parse_sample_rate(mime_type: &str) -> u32 {
    mime_type
        .parse::<Mime>()
        .ok()
        .and_then(|m| m.get_param("rate").and_then(|rate| rate.as_str().parse::<u32>().ok()))
        .filter(|rate| (1..=MAX_SAMPLE_RATE).contains(rate))
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

/// Whether the MIME type denotes headerless 16-bit PCM.
pub fn is_raw_pcm(mime_type: &str) -> bool {
    mime_type.parse::<Mime>().is_ok_and(|m| {
        m.type_() == mime::AUDIO
            && (m.subtype().as_str().eq_ignore_ascii_case("l16")
                || m.subtype().as_str().eq_ignore_ascii_case("pcm"))
    })
}

/// Playback length of `byte_len` bytes of 16-bit mono PCM.
pub fn estimate_duration(byte_len: usize, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    let bytes_per_second = f64::from(sample_rate) * f64::from(BYTES_PER_SAMPLE * u32::from(CHANNELS));
    Duration::from_secs_f64(byte_len as f64 / bytes_per_second)
}

/// Prefixes 16-bit mono PCM with a WAVE header.
pub fn wrap_pcm(pcm: &[u8], sample_rate: u32) -> Bytes {
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));

    let mut buf = BytesMut::with_capacity(HEADER_LEN + pcm.len());
    buf.put_slice(b"RIFF");
    buf.put_u32_le(data_len.saturating_add(36));
    buf.put_slice(b"WAVE");
    buf.put_slice(b"fmt ");
    buf.put_u32_le(16);
    buf.put_u16_le(1);
    buf.put_u16_le(CHANNELS);
    buf.put_u32_le(sample_rate);
    buf.put_u32_le(byte_rate);
    buf.put_u16_le(block_align);
    buf.put_u16_le(BITS_PER_SAMPLE);
    buf.put_slice(b"data");
    buf.put_u32_le(data_len);
    buf.put_slice(pcm);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_rate() {
        assert_eq!(parse_sample_rate("audio/L16;codec=pcm;rate=24000"), 24_000);
        assert_eq!(parse_sample_rate("audio/L16; rate=16000"), 16_000);
        assert_eq!(parse_sample_rate("audio/L16"), DEFAULT_SAMPLE_RATE);
        assert_eq!(parse_sample_rate("audio/L16;rate=fast"), DEFAULT_SAMPLE_RATE);
        assert_eq!(parse_sample_rate("not a mime"), DEFAULT_SAMPLE_RATE);
        assert_eq!(parse_sample_rate("audio/L16;rate=384000"), MAX_SAMPLE_RATE);
        assert_eq!(parse_sample_rate("audio/L16;codec=pcm;rate=4294967295"), DEFAULT_SAMPLE_RATE);
        assert_eq!(parse_sample_rate("audio/L16;rate=0"), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_wrap_pcm_saturates_byte_rate() {
        let wav = wrap_pcm(&[0u8; 4], u32::MAX);

        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), u32::MAX);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), u32::MAX);
    }

    #[test]
    fn test_is_raw_pcm() {
        assert!(is_raw_pcm("audio/L16;codec=pcm;rate=24000"));
        assert!(is_raw_pcm("audio/pcm"));
        assert!(!is_raw_pcm("audio/wav"));
        assert!(!is_raw_pcm("image/png"));
    }

    #[test]
    fn test_estimate_duration() {
        assert_eq!(estimate_duration(48_000, 24_000), Duration::from_secs(1));
        assert_eq!(estimate_duration(24_000, 24_000), Duration::from_millis(500));
        assert_eq!(estimate_duration(100, 0), Duration::ZERO);
    }

    #[test]
    fn test_wav_header_layout() {
        let pcm = [0u8, 1, 2, 3];
        let wav = wrap_pcm(&pcm, 24_000);

        assert_eq!(wav.len(), 48);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 40);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u16::from_le_bytes(wav[22..24].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 24_000);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 48_000);
        assert_eq!(u16::from_le_bytes(wav[34..36].try_into().unwrap()), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 4);
        assert_eq!(&wav[44..], &pcm);
    }
}
