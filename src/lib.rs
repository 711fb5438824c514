//! # Gemini Media Client
//!
//! Resilient Rust client for generating product imagery, marketing copy and
//! narrated audio with the Google Gemini (Generative AI) API.
//!
//! ## Features
//!
//! - Three model lanes (image, text, audio) behind one `generateContent` transport
//! - Image editing from a reference image
//! - Localized product copy and text-to-speech narration, wrapped as WAV
//! - Per-lane TTL response cache keyed by the normalized prompt
//! - Exponential retry of rate-limited calls, with a local quota estimate
//! - A closed error taxonomy with localized user-facing messages
//! - Revocable handles for generated media, released automatically on drop
//! - Cancellation through `tokio_util::sync::CancellationToken`
//! - Structured logging and metrics on top of `tracing`
//! - Secure credential handling with `SecretString`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_gemini_media::{create_client, MediaConfig};
//! use integrations_gemini_media::types::{Locale, ProductBrief};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MediaConfig::builder()
//!         .api_key(SecretString::new("your-api-key".into()))
//!         .build()?;
//!
//!     let client = create_client(config)?;
//!
//!     // Or create from environment variables
//!     // let client = create_client_from_env()?;
//!
//!     let image = client.generate_image("A red bicycle on a beach").await?;
//!     let bike = ProductBrief::new("Roadster 500").with_category("Bicycles");
//!     let copy = client.generate_product_text(&bike, Locale::Fr).await?;
//!     let narration = client.generate_product_audio(&bike, Locale::Fr).await?;
//!
//!     // `image` and `narration` are revoked when they go out of scope.
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Main client interface and factory functions
//! - `config` - Configuration types, builder and model profiles
//! - `auth` - API key placement
//! - `transport` - HTTP transport layer, request builder and response parser
//! - `error` - Error types and taxonomy
//! - `types` - Wire types, requests and outputs
//! - `services` - Generation service (validation, retries, extraction)
//! - `resilience` - Retry policy and quota tracking
//! - `cache` - TTL response cache
//! - `media` - Resource handles and WAV wrapping

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod transport;
pub mod types;

// Development/testing module - always available for integration tests
pub mod mocks;

// Re-exports for convenience
pub use auth::{ApiKeyAuthManager, AuthManager};
pub use cache::{CacheKey, ResponseCache};
pub use client::{
    create_client, create_client_from_env, DefaultClientFactory, GeminiMediaClient,
    GeminiMediaClientBuilder, MediaClient, MediaClientFactory,
};
pub use config::{
    AuthMethod, LogLevel, MediaConfig, MediaConfigBuilder, ModelProfile, RateLimitDisplay,
    RetryConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
pub use error::{ErrorKind, GenerationError, MediaResult};
pub use media::{ResourceHandle, ResourceManager, ScopedResource};
pub use resilience::{RateLimitState, RateLimitTracker, RetryPolicy};
pub use services::{GenerationService, GenerationServiceImpl};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBuilder, ResponseParser,
    TransportError,
};

// Type re-exports
pub use types::{
    AudioOutput, AudioRequest, GenerationOutput, GenerationParams, GenerationRequest, ImageOutput,
    ImageRequest, Locale, MediaKind, ProductBrief, ReferenceImage, TextOutput, TextRequest,
};

// Observability re-exports
pub use observability::{
    DefaultLogger, DefaultMetricsRecorder, Logger, MediaMetrics, MetricsRecorder, StructuredLogger,
    TracingMetricsRecorder,
};

pub use tokio_util::sync::CancellationToken;
