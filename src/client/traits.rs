//! Client trait definitions for the Gemini media client.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MediaConfig;
use crate::error::MediaResult;
use crate::media::ScopedResource;
use crate::types::{Locale, ProductBrief};

/// The operations a storefront needs from the media client.
#[async_trait]
pub trait MediaClient: Send + Sync {
    /// Generate an image from a prompt. The returned resource is revoked on drop.
    async fn generate_image(&self, prompt: &str) -> MediaResult<ScopedResource>;

    /// Generate marketing copy for a product in the given language.
    async fn generate_product_text(&self, product: &ProductBrief, locale: Locale) -> MediaResult<String>;

    /// Generate a spoken advertisement for a product, as a WAV resource.
    async fn generate_product_audio(
        &self,
        product: &ProductBrief,
        locale: Locale,
    ) -> MediaResult<ScopedResource>;
}

/// Factory for creating media clients.
pub trait MediaClientFactory: Send + Sync {
    /// Create a new client with the given configuration.
    fn create(&self, config: MediaConfig) -> MediaResult<Arc<dyn MediaClient>>;
}
