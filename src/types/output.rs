//! Decoded generation results.

use bytes::Bytes;
use std::time::Duration;

use super::request::MediaKind;

/// A generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    /// Decoded image bytes.
    pub data: Bytes,
    /// MIME type reported by the service.
    pub mime_type: String,
    /// Model version that produced the image, if reported.
    pub model_version: Option<String>,
}

/// Generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOutput {
    /// The text, with all text parts of the first candidate concatenated.
    pub text: String,
    /// Model identifier that produced the text.
    pub model: String,
}

/// Generated speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioOutput {
    /// Decoded audio bytes, usually raw 16-bit PCM.
    pub data: Bytes,
    /// MIME type reported by the service, e.g. `audio/L16;codec=pcm;rate=24000`.
    pub mime_type: String,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Playback length estimated from the payload size.
    pub duration: Duration,
}

/// The result of a generation, matching the request variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutput {
    /// Image result.
    Image(ImageOutput),
    /// Text result.
    Text(TextOutput),
    /// Audio result.
    Audio(AudioOutput),
}

impl GenerationOutput {
    /// The lane that produced this output.
    pub fn kind(&self) -> MediaKind {
        match self {
            GenerationOutput::Image(_) => MediaKind::Image,
            GenerationOutput::Text(_) => MediaKind::Text,
            GenerationOutput::Audio(_) => MediaKind::Audio,
        }
    }

    /// Payload size in bytes.
    pub fn payload_len(&self) -> usize {
        match self {
            GenerationOutput::Image(o) => o.data.len(),
            GenerationOutput::Text(o) => o.text.len(),
            GenerationOutput::Audio(o) => o.data.len(),
        }
    }

    /// The image result, if this is one.
    pub fn into_image(self) -> Option<ImageOutput> {
        match self {
            GenerationOutput::Image(o) => Some(o),
            _ => None,
        }
    }

    /// The text result, if this is one.
    pub fn into_text(self) -> Option<TextOutput> {
        match self {
            GenerationOutput::Text(o) => Some(o),
            _ => None,
        }
    }

    /// The audio result, if this is one.
    pub fn into_audio(self) -> Option<AudioOutput> {
        match self {
            GenerationOutput::Audio(o) => Some(o),
            _ => None,
        }
    }
}
