//! Observability layer for the Gemini media client.
//!
//! Provides trait-based abstractions for:
//! - **Logging**: Structured logging with sensitive data redaction
//! - **Metrics**: Metrics recording (counters, histograms, gauges)
//!
//! Both sit on top of `tracing`; install any subscriber to see the output.
//!
//! # Examples
//!
//! ```rust
//! use integrations_gemini_media::observability::{Logger, StructuredLogger};
//! use integrations_gemini_media::config::LogLevel;
//! use serde_json::json;
//!
//! let logger = StructuredLogger::new("gemini.media").with_level(LogLevel::Debug);
//! logger.info("Generating image", json!({"model": "gemini-2.0-flash-preview-image-generation"}));
//! ```
//!
//! ```rust
//! use integrations_gemini_media::observability::{MediaMetrics, TracingMetricsRecorder};
//! use integrations_gemini_media::types::MediaKind;
//! use std::sync::Arc;
//!
//! let metrics = MediaMetrics::new("gemini_media", Arc::new(TracingMetricsRecorder::new()));
//! metrics.record_generation(MediaKind::Image, None, 1234);
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{redact_key_params, redact_sensitive_fields, redact_url, DefaultLogger, Logger, StructuredLogger};
pub use metrics::{DefaultMetricsRecorder, MediaMetrics, MetricsRecorder, TracingMetricsRecorder};

use std::sync::Arc;

use crate::config::LogLevel;

/// Create a default observability stack.
///
/// Returns a (logger, metrics) pair backed by `tracing`.
///
/// # Arguments
/// * `service_name` - The service name used as logger name and metric prefix
/// * `level` - Minimum level emitted by the logger
pub fn create_default_stack(service_name: &str, level: LogLevel) -> (Arc<dyn Logger>, MediaMetrics) {
    let logger = Arc::new(StructuredLogger::new(service_name).with_level(level));
    let metrics = MediaMetrics::new(service_name, Arc::new(TracingMetricsRecorder::new()));

    (logger, metrics)
}

/// Create a no-op observability stack.
///
/// Suitable for tests or when observability is disabled.
pub fn create_noop_stack(service_name: &str) -> (Arc<dyn Logger>, MediaMetrics) {
    let logger = Arc::new(DefaultLogger::new(service_name));
    let metrics = MediaMetrics::new(service_name, Arc::new(DefaultMetricsRecorder::new()));

    (logger, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaKind;
    use serde_json::json;

    #[test]
    fn test_create_default_stack() {
        let (logger, metrics) = create_default_stack("test", LogLevel::Debug);
        logger.info("test", json!({"api_key": "hidden"}));
        metrics.record_cache_lookup(MediaKind::Image, true);
    }

    #[test]
    fn test_create_noop_stack() {
        let (logger, metrics) = create_noop_stack("test");
        logger.error("test", json!({}));
        metrics.record_rate_limit(MediaKind::Audio);
    }
}
