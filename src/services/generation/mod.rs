//! Media generation service.
//!
//! One service drives all three lanes (image, text, audio). Each lane owns a
//! model profile, a response cache and a quota tracker.

mod prompts;
mod service;
mod validation;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{GenerationError, MediaResult};
use crate::types::{
    AudioOutput, AudioRequest, GenerationOutput, GenerationRequest, ImageOutput, ImageRequest,
    TextOutput, TextRequest,
};

pub use prompts::{product_audio_prompt, product_text_prompt};
pub use service::{cache_key, GenerationServiceImpl};
pub use validation::{validate_params, validate_request, MAX_OUTPUT_TOKENS, MAX_TEMPERATURE};

/// Service for generating images, text and speech with Gemini models.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Runs a generation, stopping early if `cancel` fires.
    ///
    /// A cancelled generation returns [`GenerationError::Cancelled`] and leaves
    /// the cache and the quota tracker untouched.
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> MediaResult<GenerationOutput>;

    /// Generate (or edit) an image.
    async fn generate_image(&self, request: ImageRequest) -> MediaResult<ImageOutput> {
        self.generate(request.into(), &CancellationToken::new())
            .await?
            .into_image()
            .ok_or_else(|| GenerationError::malformed("image lane returned a non-image output"))
    }

    /// Generate text.
    async fn generate_text(&self, request: TextRequest) -> MediaResult<TextOutput> {
        self.generate(request.into(), &CancellationToken::new())
            .await?
            .into_text()
            .ok_or_else(|| GenerationError::malformed("text lane returned a non-text output"))
    }

    /// Generate speech.
    async fn generate_audio(&self, request: AudioRequest) -> MediaResult<AudioOutput> {
        self.generate(request.into(), &CancellationToken::new())
            .await?
            .into_audio()
            .ok_or_else(|| GenerationError::malformed("audio lane returned a non-audio output"))
    }
}
