//! Core types for the Gemini media client.
//!
//! Wire types for the `generateContent` endpoint, plus the caller-facing
//! requests and outputs.

pub mod content;
pub mod generation;
pub mod locale;
pub mod output;
pub mod product;
pub mod request;
pub mod safety;

// Re-exports for wire types
pub use content::{Blob, Content, Part, Role};
pub use generation::{
    Candidate, FinishReason, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    PrebuiltVoiceConfig, PromptFeedback, ResponseModality, SpeechConfig, UsageMetadata,
    VoiceConfig,
};
pub use safety::{default_safety_settings, HarmBlockThreshold, HarmCategory, SafetySetting};

// Re-exports for caller-facing types
pub use locale::Locale;
pub use output::{AudioOutput, GenerationOutput, ImageOutput, TextOutput};
pub use product::ProductBrief;
pub use request::{
    AudioRequest, GenerationParams, GenerationRequest, ImageRequest, MediaKind, ReferenceImage,
    TextRequest, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P, MIN_PROMPT_CHARS,
};
