//! Client interface and factory for the Gemini media client.
//!
//! Provides [`GeminiMediaClient`], which owns one generation lane per model
//! and the registry of materialized resources, plus its builder.

mod builder;
mod client;
mod traits;

// Re-export public API
pub use builder::GeminiMediaClientBuilder;
pub use client::{create_client, create_client_from_env, DefaultClientFactory, GeminiMediaClient};
pub use traits::{MediaClient, MediaClientFactory};
