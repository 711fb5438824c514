//! Caller-facing generation requests.
//!
//! Requests are built once and then handed to the client; there are no
//! setters after construction, only consuming `with_*` methods.

use bytes::Bytes;
use std::fmt;

use super::locale::Locale;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default nucleus sampling probability.
pub const DEFAULT_TOP_P: f32 = 0.95;

/// Default output size limit in tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Minimum prompt length, in characters, after trimming.
pub const MIN_PROMPT_CHARS: usize = 5;

/// Which model lane a request is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Image generation and editing.
    Image,
    /// Marketing text.
    Text,
    /// Narrated audio.
    Audio,
}

impl MediaKind {
    /// All kinds.
    pub const ALL: [MediaKind; 3] = [MediaKind::Image, MediaKind::Text, MediaKind::Audio];

    /// Stable identifier used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Text => "text",
            MediaKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling parameters sent with every request.
///
/// Bounds are checked when the request is validated, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: f32,
    /// Nucleus sampling probability, `0.0..=1.0`.
    pub top_p: f32,
    /// Output limit in tokens, `1..=8192`.
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl GenerationParams {
    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets top-p.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the output limit.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// An image to be edited, sent inline with the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    mime_type: String,
    data: Bytes,
}

impl ReferenceImage {
    /// Wraps raw image bytes.
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// MIME type of the image.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw image bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// A request for a generated or edited image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    prompt: String,
    reference: Option<ReferenceImage>,
    params: GenerationParams,
}

impl ImageRequest {
    /// Generate a new image from a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference: None,
            params: GenerationParams::default(),
        }
    }

    /// Edit `reference` according to the prompt.
    pub fn edit(prompt: impl Into<String>, reference: ReferenceImage) -> Self {
        Self {
            reference: Some(reference),
            ..Self::new(prompt)
        }
    }

    /// Replaces the sampling parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// The prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The image being edited, if this is an edit.
    pub fn reference(&self) -> Option<&ReferenceImage> {
        self.reference.as_ref()
    }

    /// Sampling parameters.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

/// A request for generated text in a given language.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    prompt: String,
    locale: Locale,
    params: GenerationParams,
}

impl TextRequest {
    /// Creates a text request.
    pub fn new(prompt: impl Into<String>, locale: Locale) -> Self {
        Self {
            prompt: prompt.into(),
            locale,
            params: GenerationParams::default(),
        }
    }

    /// Replaces the sampling parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// The prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Target language.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Sampling parameters.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

/// A request for narrated audio in a given language.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRequest {
    prompt: String,
    locale: Locale,
    voice: Option<String>,
    params: GenerationParams,
}

impl AudioRequest {
    /// Creates an audio request using the configured voice.
    pub fn new(prompt: impl Into<String>, locale: Locale) -> Self {
        Self {
            prompt: prompt.into(),
            locale,
            voice: None,
            params: GenerationParams::default(),
        }
    }

    /// Overrides the narration voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Replaces the sampling parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// The prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Target language.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Voice override, if any.
    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    /// Sampling parameters.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

/// Any generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    /// Image generation or edit.
    Image(ImageRequest),
    /// Text generation.
    Text(TextRequest),
    /// Audio generation.
    Audio(AudioRequest),
}

impl GenerationRequest {
    /// The lane serving this request.
    pub fn kind(&self) -> MediaKind {
        match self {
            GenerationRequest::Image(_) => MediaKind::Image,
            GenerationRequest::Text(_) => MediaKind::Text,
            GenerationRequest::Audio(_) => MediaKind::Audio,
        }
    }

    /// The prompt.
    pub fn prompt(&self) -> &str {
        match self {
            GenerationRequest::Image(r) => r.prompt(),
            GenerationRequest::Text(r) => r.prompt(),
            GenerationRequest::Audio(r) => r.prompt(),
        }
    }

    /// Sampling parameters.
    pub fn params(&self) -> &GenerationParams {
        match self {
            GenerationRequest::Image(r) => r.params(),
            GenerationRequest::Text(r) => r.params(),
            GenerationRequest::Audio(r) => r.params(),
        }
    }

    /// Target language, for text and audio.
    pub fn locale(&self) -> Option<Locale> {
        match self {
            GenerationRequest::Image(_) => None,
            GenerationRequest::Text(r) => Some(r.locale()),
            GenerationRequest::Audio(r) => Some(r.locale()),
        }
    }
}

impl From<ImageRequest> for GenerationRequest {
    fn from(request: ImageRequest) -> Self {
        GenerationRequest::Image(request)
    }
}

impl From<TextRequest> for GenerationRequest {
    fn from(request: TextRequest) -> Self {
        GenerationRequest::Text(request)
    }
}

impl From<AudioRequest> for GenerationRequest {
    fn from(request: AudioRequest) -> Self {
        GenerationRequest::Audio(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.top_p, 0.95);
        assert_eq!(params.max_output_tokens, 2048);
    }

    #[test]
    fn test_edit_request_keeps_reference() {
        let reference = ReferenceImage::new("image/png", vec![1u8, 2, 3]);
        let request = ImageRequest::edit("Make the sky purple", reference.clone());

        assert_eq!(request.reference(), Some(&reference));
        assert_eq!(request.params(), &GenerationParams::default());
    }

    #[test]
    fn test_request_accessors() {
        let request: GenerationRequest =
            AudioRequest::new("Say hello to everyone", Locale::Fr).with_voice("Puck").into();

        assert_eq!(request.kind(), MediaKind::Audio);
        assert_eq!(request.locale(), Some(Locale::Fr));
        assert_eq!(request.prompt(), "Say hello to everyone");
        assert!(GenerationRequest::from(ImageRequest::new("a cat")).locale().is_none());
    }
}
