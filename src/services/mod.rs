//! Service implementations for the Gemini media client.

pub mod generation;

pub use generation::{
    cache_key, product_audio_prompt, product_text_prompt, validate_request, GenerationService,
    GenerationServiceImpl,
};
