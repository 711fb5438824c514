//! Main client implementation for Gemini media generation.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheKey;
use crate::config::{MediaConfig, RateLimitDisplay};
use crate::error::{GenerationError, MediaResult};
use crate::media::{wav, ResourceManager, ScopedResource};
use crate::observability::Logger;
use crate::resilience::RateLimitState;
use crate::services::{product_audio_prompt, product_text_prompt, GenerationService, GenerationServiceImpl};
use crate::types::{
    AudioRequest, GenerationOutput, GenerationRequest, ImageRequest, Locale, MediaKind,
    ProductBrief, ReferenceImage, TextRequest,
};

use super::builder::GeminiMediaClientBuilder;
use super::traits::{MediaClient, MediaClientFactory};

/// Client for generating product images, copy and narration with Gemini.
///
/// Every model lane keeps its own response cache and quota estimate for the
/// lifetime of the client. Binary results are registered with a
/// [`ResourceManager`] and handed out as [`ScopedResource`]s.
///
/// # Example
///
/// ```no_run
/// use integrations_gemini_media::{GeminiMediaClient, MediaClient};
/// use integrations_gemini_media::types::{Locale, ProductBrief};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiMediaClient::from_env()?;
///
/// let image = client.generate_image("A red bicycle on a beach").await?;
/// println!("render {}", image.url().unwrap_or_default());
///
/// let bike = ProductBrief::new("Roadster 500").with_category("Bicycles");
/// let copy = client.generate_product_text(&bike, Locale::Es).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiMediaClient {
    config: Arc<MediaConfig>,
    service: GenerationServiceImpl,
    resources: ResourceManager,
    logger: Arc<dyn Logger>,
}

impl GeminiMediaClient {
    /// Creates a new client builder.
    pub fn builder() -> GeminiMediaClientBuilder {
        GeminiMediaClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// See [`MediaConfig::from_env`] for the variables read.
    pub fn from_env() -> MediaResult<Self> {
        Self::new(MediaConfig::from_env()?)
    }

    /// Creates a client from a configuration object.
    pub fn new(config: MediaConfig) -> MediaResult<Self> {
        GeminiMediaClientBuilder::from_config(config).build()
    }

    pub(super) fn from_parts(
        config: Arc<MediaConfig>,
        service: GenerationServiceImpl,
        resources: ResourceManager,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            config,
            service,
            resources,
            logger,
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// The generation service backing this client.
    pub fn service(&self) -> &GenerationServiceImpl {
        &self.service
    }

    /// The registry of materialized resources.
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Runs any generation request.
    pub async fn generate(&self, request: impl Into<GenerationRequest>) -> MediaResult<GenerationOutput> {
        self.service
            .generate(request.into(), &CancellationToken::new())
            .await
    }

    /// Runs a generation request that stops when `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        request: impl Into<GenerationRequest>,
        cancel: &CancellationToken,
    ) -> MediaResult<GenerationOutput> {
        self.service.generate(request.into(), cancel).await
    }

    /// Edits a reference image according to `prompt`.
    pub async fn edit_image(&self, prompt: &str, reference: ReferenceImage) -> MediaResult<ScopedResource> {
        let image = self
            .service
            .generate_image(ImageRequest::edit(prompt, reference))
            .await?;
        let handle = self.resources.materialize_bytes(image.data, &image.mime_type);
        Ok(self.resources.scoped(handle))
    }

    /// Current quota estimate of a lane.
    pub fn rate_limits(&self, kind: MediaKind) -> RateLimitState {
        self.service.tracker(kind).current()
    }

    /// Published quota of the model serving a lane.
    pub fn rate_limit_display(&self, kind: MediaKind) -> RateLimitDisplay {
        self.service.profile(kind).limits
    }

    /// How many 429 responses a lane has seen.
    pub fn rate_limited_count(&self, kind: MediaKind) -> u64 {
        self.service.tracker(kind).rate_limited_count()
    }

    /// Drops every cached generation in every lane.
    pub fn clear_caches(&self) {
        for kind in MediaKind::ALL {
            self.service.cache(kind).clear();
        }
        self.logger.info("Cleared generation caches", json!({}));
    }

    /// Subscribes to the live key set of a lane's cache.
    pub fn cache_feed(&self, kind: MediaKind) -> watch::Receiver<Vec<CacheKey>> {
        self.service.cache(kind).subscribe()
    }
}

#[async_trait]
impl MediaClient for GeminiMediaClient {
    async fn generate_image(&self, prompt: &str) -> MediaResult<ScopedResource> {
        let image = self.service.generate_image(ImageRequest::new(prompt)).await?;
        let handle = self.resources.materialize_bytes(image.data, &image.mime_type);
        Ok(self.resources.scoped(handle))
    }

    async fn generate_product_text(&self, product: &ProductBrief, locale: Locale) -> MediaResult<String> {
        if product.name.trim().is_empty() {
            return Err(GenerationError::invalid_input("product name must not be empty"));
        }

        let prompt = product_text_prompt(product, locale);
        let output = self.service.generate_text(TextRequest::new(prompt, locale)).await?;
        Ok(output.text)
    }

    async fn generate_product_audio(
        &self,
        product: &ProductBrief,
        locale: Locale,
    ) -> MediaResult<ScopedResource> {
        if product.name.trim().is_empty() {
            return Err(GenerationError::invalid_input("product name must not be empty"));
        }

        let prompt = product_audio_prompt(product, locale);
        let audio = self.service.generate_audio(AudioRequest::new(prompt, locale)).await?;

        let handle = if wav::is_raw_pcm(&audio.mime_type) {
            let wrapped = wav::wrap_pcm(&audio.data, audio.sample_rate);
            self.resources.materialize_bytes(wrapped, wav::WAV_MIME)
        } else {
            self.resources.materialize_bytes(audio.data, &audio.mime_type)
        };

        self.logger.debug(
            "Materialized product narration",
            json!({
                "product": product.name,
                "locale": locale.code(),
                "duration_ms": audio.duration.as_millis() as u64,
                "url": handle.url(),
            }),
        );

        Ok(self.resources.scoped(handle))
    }
}

impl std::fmt::Debug for GeminiMediaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiMediaClient")
            .field("config", &"<redacted>")
            .field("resources", &self.resources)
            .finish()
    }
}

/// Factory producing [`GeminiMediaClient`]s with default dependencies.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClientFactory;

impl MediaClientFactory for DefaultClientFactory {
    fn create(&self, config: MediaConfig) -> MediaResult<Arc<dyn MediaClient>> {
        create_client(config)
    }
}

/// Create a client from configuration.
pub fn create_client(config: MediaConfig) -> MediaResult<Arc<dyn MediaClient>> {
    let client = GeminiMediaClient::new(config)?;
    Ok(Arc::new(client))
}

/// Create a client from environment variables.
pub fn create_client_from_env() -> MediaResult<Arc<dyn MediaClient>> {
    let config = MediaConfig::from_env()?;
    create_client(config)
}
