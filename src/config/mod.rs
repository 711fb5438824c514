//! Configuration types for the Gemini media client.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::error::{GenerationError, MediaResult};
use crate::types::MediaKind;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default request timeout (120 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries after a rate-limited response.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default lifetime of a cached generation (30 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

/// Estimated token cost charged to the local quota per successful call.
pub const DEFAULT_TOKENS_PER_CALL: u64 = 500;

/// Default prebuilt voice for narrated audio.
pub const DEFAULT_VOICE: &str = "Kore";

/// Default model for image generation and editing.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Default model for marketing copy.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";

/// Default text-to-speech model.
pub const DEFAULT_AUDIO_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Authentication method for API key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Use x-goog-api-key header.
    Header,
    /// Use ?key= query parameter.
    #[default]
    QueryParam,
}

/// Log level for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Error level - only errors.
    Error,
    /// Warning level - errors and warnings.
    Warn,
    /// Info level - general information.
    #[default]
    Info,
    /// Debug level - detailed information.
    Debug,
    /// Trace level - very detailed information.
    Trace,
}

/// Retry configuration for rate-limited responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Published quota of a model, used to seed and replenish the local estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDisplay {
    /// Requests per minute.
    pub requests_per_minute: u32,
    /// Tokens per minute.
    pub tokens_per_minute: u64,
    /// Requests per day.
    pub requests_per_day: u32,
}

/// A model identifier paired with its quota.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelProfile {
    /// Model identifier, without the `models/` prefix.
    pub model: String,
    /// Published limits for the model.
    pub limits: RateLimitDisplay,
}

impl ModelProfile {
    /// Creates a profile.
    pub fn new(model: impl Into<String>, limits: RateLimitDisplay) -> Self {
        Self {
            model: model.into(),
            limits,
        }
    }

    /// Default profile for a media kind.
    pub fn default_for(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Self::new(
                DEFAULT_IMAGE_MODEL,
                RateLimitDisplay {
                    requests_per_minute: 10,
                    tokens_per_minute: 200_000,
                    requests_per_day: 100,
                },
            ),
            MediaKind::Text => Self::new(
                DEFAULT_TEXT_MODEL,
                RateLimitDisplay {
                    requests_per_minute: 15,
                    tokens_per_minute: 1_000_000,
                    requests_per_day: 1_500,
                },
            ),
            MediaKind::Audio => Self::new(
                DEFAULT_AUDIO_MODEL,
                RateLimitDisplay {
                    requests_per_minute: 3,
                    tokens_per_minute: 10_000,
                    requests_per_day: 15,
                },
            ),
        }
    }
}

/// Configuration for the media client.
///
/// Immutable once built; the client copies what it needs at construction.
#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// API key (required).
    pub api_key: SecretString,
    /// Base URL for the API.
    pub base_url: Url,
    /// API version.
    pub api_version: String,
    /// Request timeout enforced by the transport.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Where the API key is placed on each request.
    pub auth_method: AuthMethod,
    /// Log level.
    pub log_level: LogLevel,
    /// Lifetime of cached generations.
    pub cache_ttl: Duration,
    /// Token estimate charged to the quota tracker per successful call.
    pub tokens_per_call: u64,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Prebuilt voice used for narrated audio.
    pub voice: String,
    /// Image model profile.
    pub image_model: ModelProfile,
    /// Text model profile.
    pub text_model: ModelProfile,
    /// Audio model profile.
    pub audio_model: ModelProfile,
}

impl MediaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> MediaConfigBuilder {
        MediaConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> MediaResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// Reads `GEMINI_API_KEY` (falling back to `GOOGLE_API_KEY`),
    /// `GEMINI_BASE_URL`, `GEMINI_API_VERSION`, `GEMINI_TIMEOUT_SECS` and the
    /// `GEMINI_{IMAGE,TEXT,AUDIO}_MODEL` overrides.
    pub fn from_lookup<F>(lookup: F) -> MediaResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("GOOGLE_API_KEY"))
            .ok_or_else(|| GenerationError::Configuration {
                message: "GEMINI_API_KEY is not set".to_string(),
            })?;

        let mut builder = Self::builder().api_key(SecretString::new(api_key));

        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            builder = builder.base_url(&base_url)?;
        }
        if let Some(version) = lookup("GEMINI_API_VERSION") {
            builder = builder.api_version(&version);
        }
        if let Some(secs) = lookup("GEMINI_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        for (var, kind) in [
            ("GEMINI_IMAGE_MODEL", MediaKind::Image),
            ("GEMINI_TEXT_MODEL", MediaKind::Text),
            ("GEMINI_AUDIO_MODEL", MediaKind::Audio),
        ] {
            if let Some(model) = lookup(var) {
                let limits = ModelProfile::default_for(kind).limits;
                builder = builder.model_profile(kind, ModelProfile::new(model, limits));
            }
        }

        builder.build()
    }

    /// The model profile serving a media kind.
    pub fn profile(&self, kind: MediaKind) -> &ModelProfile {
        match kind {
            MediaKind::Image => &self.image_model,
            MediaKind::Text => &self.text_model,
            MediaKind::Audio => &self.audio_model,
        }
    }
}

/// Builder for MediaConfig.
#[derive(Default)]
pub struct MediaConfigBuilder {
    api_key: Option<SecretString>,
    base_url: Option<Url>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    auth_method: Option<AuthMethod>,
    log_level: Option<LogLevel>,
    cache_ttl: Option<Duration>,
    tokens_per_call: Option<u64>,
    retry: Option<RetryConfig>,
    voice: Option<String>,
    image_model: Option<ModelProfile>,
    text_model: Option<ModelProfile>,
    audio_model: Option<ModelProfile>,
}

impl MediaConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: &str) -> MediaResult<Self> {
        self.base_url = Some(Url::parse(base_url)?);
        Ok(self)
    }

    /// Set the API version.
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the authentication method.
    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the cache TTL.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set the per-call token estimate.
    pub fn tokens_per_call(mut self, tokens: u64) -> Self {
        self.tokens_per_call = Some(tokens);
        self
    }

    /// Set the retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Set the narration voice.
    pub fn voice(mut self, voice: &str) -> Self {
        self.voice = Some(voice.to_string());
        self
    }

    /// Replace the model profile for one media kind.
    pub fn model_profile(mut self, kind: MediaKind, profile: ModelProfile) -> Self {
        match kind {
            MediaKind::Image => self.image_model = Some(profile),
            MediaKind::Text => self.text_model = Some(profile),
            MediaKind::Audio => self.audio_model = Some(profile),
        }
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MediaResult<MediaConfig> {
        let api_key = self
            .api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| GenerationError::Configuration {
                message: "an API key is required".to_string(),
            })?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let profiles = [
            self.image_model.unwrap_or_else(|| ModelProfile::default_for(MediaKind::Image)),
            self.text_model.unwrap_or_else(|| ModelProfile::default_for(MediaKind::Text)),
            self.audio_model.unwrap_or_else(|| ModelProfile::default_for(MediaKind::Audio)),
        ];
        if profiles.iter().any(|p| p.model.trim().is_empty()) {
            return Err(GenerationError::Configuration {
                message: "model identifier must not be empty".to_string(),
            });
        }
        let [image_model, text_model, audio_model] = profiles;

        Ok(MediaConfig {
            api_key,
            base_url,
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            connect_timeout: self
                .connect_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            auth_method: self.auth_method.unwrap_or_default(),
            log_level: self.log_level.unwrap_or_default(),
            cache_ttl: self.cache_ttl.unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            tokens_per_call: self.tokens_per_call.unwrap_or(DEFAULT_TOKENS_PER_CALL),
            retry: self.retry.unwrap_or_default(),
            voice: self.voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            image_model,
            text_model,
            audio_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MediaConfig::builder()
            .api_key(SecretString::new("test-key".into()))
            .build()
            .unwrap();

        assert_eq!(config.base_url.as_str(), "https://generativelanguage.googleapis.com/");
        assert_eq!(config.api_version, "v1beta");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.auth_method, AuthMethod::QueryParam);
        assert_eq!(config.cache_ttl, Duration::from_secs(1800));
        assert_eq!(config.tokens_per_call, 500);
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.voice, "Kore");
        assert_eq!(config.profile(MediaKind::Text).model, "gemini-2.0-flash");
        assert_eq!(config.profile(MediaKind::Audio).limits.requests_per_day, 15);
    }

    #[test]
    fn test_custom_config() {
        let config = MediaConfig::builder()
            .api_key(SecretString::new("test-key".into()))
            .api_version("v1")
            .timeout(Duration::from_secs(60))
            .auth_method(AuthMethod::Header)
            .model_profile(
                MediaKind::Image,
                ModelProfile::new(
                    "imagen-test",
                    RateLimitDisplay {
                        requests_per_minute: 1,
                        tokens_per_minute: 2,
                        requests_per_day: 3,
                    },
                ),
            )
            .build()
            .unwrap();

        assert_eq!(config.api_version, "v1");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.auth_method, AuthMethod::Header);
        assert_eq!(config.profile(MediaKind::Image).model, "imagen-test");
    }

    #[test]
    fn test_missing_api_key() {
        let result = MediaConfig::builder().build();
        assert!(matches!(result, Err(GenerationError::Configuration { .. })));

        let blank = MediaConfig::builder().api_key(SecretString::new("  ".into())).build();
        assert!(blank.is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = MediaConfig::builder().base_url("not a url");
        assert!(matches!(result, Err(GenerationError::Configuration { .. })));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("GOOGLE_API_KEY", "fallback-key"),
            ("GEMINI_BASE_URL", "http://localhost:8080"),
            ("GEMINI_TIMEOUT_SECS", "5"),
            ("GEMINI_TEXT_MODEL", "gemini-1.5-flash"),
        ]
        .into_iter()
        .collect();

        let config = MediaConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_key.expose_secret(), "fallback-key");
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.text_model.model, "gemini-1.5-flash");
        assert_eq!(config.text_model.limits.requests_per_day, 1_500);
    }

    #[test]
    fn test_from_lookup_without_key() {
        let result = MediaConfig::from_lookup(|_| None);
        assert!(result.is_err());
    }
}
