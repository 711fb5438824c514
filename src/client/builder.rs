//! Builder for creating media client instances.

use secrecy::SecretString;
use std::sync::Arc;

use crate::auth::{ApiKeyAuthManager, AuthManager};
use crate::config::MediaConfig;
use crate::error::{map_failure, MediaResult, RawFailure};
use crate::media::ResourceManager;
use crate::observability::{create_default_stack, Logger, MediaMetrics};
use crate::resilience::RetryPolicy;
use crate::services::GenerationServiceImpl;
use crate::transport::{HttpTransport, ReqwestTransport};

use super::client::GeminiMediaClient;

/// Service name used for the logger and as metric prefix.
const SERVICE_NAME: &str = "gemini_media";

/// Builder for creating a [`GeminiMediaClient`].
///
/// # Example
///
/// ```no_run
/// use integrations_gemini_media::GeminiMediaClientBuilder;
/// use secrecy::SecretString;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiMediaClientBuilder::new()
///     .api_key(SecretString::new("your-api-key".into()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct GeminiMediaClientBuilder {
    config: Option<MediaConfig>,
    api_key: Option<SecretString>,
    retry_policy: Option<RetryPolicy>,

    // Injectable dependencies for testing
    transport: Option<Arc<dyn HttpTransport>>,
    logger: Option<Arc<dyn Logger>>,
    metrics: Option<MediaMetrics>,
    resources: Option<ResourceManager>,
}

impl GeminiMediaClientBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: MediaConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::default()
        }
    }

    /// Sets the API key, using defaults for everything else.
    ///
    /// Ignored when a full configuration was supplied.
    pub fn api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Overrides the retry policy derived from the configuration.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets a custom HTTP transport (for testing).
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom logger.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets a custom metrics facade.
    pub fn metrics(mut self, metrics: MediaMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Shares an existing resource registry instead of creating one.
    pub fn resources(mut self, resources: ResourceManager) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no configuration or API key was given and none is found in the environment
    /// - the HTTP transport cannot be created
    pub fn build(self) -> MediaResult<GeminiMediaClient> {
        // Resolution order: explicit config -> explicit key -> environment
        let config = match (self.config, self.api_key) {
            (Some(config), _) => config,
            (None, Some(key)) => MediaConfig::builder().api_key(key).build()?,
            (None, None) => MediaConfig::from_env()?,
        };
        let config = Arc::new(config);

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                ReqwestTransport::new(config.timeout, config.connect_timeout)
                    .map_err(|e| map_failure(RawFailure::Transport(e)))?,
            ),
        };

        let auth_manager: Arc<dyn AuthManager> = Arc::new(ApiKeyAuthManager::from_config(&config));

        let (default_logger, default_metrics) = create_default_stack(SERVICE_NAME, config.log_level);
        let logger = self.logger.unwrap_or(default_logger);
        let metrics = self.metrics.unwrap_or(default_metrics);

        let mut service = GenerationServiceImpl::new(
            Arc::clone(&config),
            transport,
            auth_manager,
            Arc::clone(&logger),
            metrics,
        );
        if let Some(policy) = self.retry_policy {
            service = service.with_retry_policy(policy);
        }

        logger.info(
            "Gemini media client initialized",
            serde_json::json!({
                "base_url": config.base_url.as_str(),
                "api_version": config.api_version,
                "auth_method": format!("{:?}", config.auth_method),
                "image_model": config.image_model.model,
                "text_model": config.text_model.model,
                "audio_model": config.audio_model.model,
            }),
        );

        Ok(GeminiMediaClient::from_parts(
            config,
            service,
            self.resources.unwrap_or_default(),
            logger,
        ))
    }
}
