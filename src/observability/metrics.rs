//! Metrics recording for the Gemini media client.
//!
//! Provides trait-based metrics recording with support for counters, histograms, and gauges.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ErrorKind;
use crate::resilience::RateLimitState;
use crate::types::{MediaKind, UsageMetadata};

/// Metrics recorder trait.
///
/// This trait provides methods for recording various types of metrics
/// (counters, histograms, gauges) with optional labels.
pub trait MetricsRecorder: Send + Sync {
    /// Increment a counter metric.
    ///
    /// # Arguments
    /// * `name` - The metric name
    /// * `labels` - Optional labels as key-value pairs
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]);

    /// Record a histogram value.
    ///
    /// # Arguments
    /// * `name` - The metric name
    /// * `value` - The value to record
    /// * `labels` - Optional labels as key-value pairs
    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]);

    /// Record a gauge value.
    ///
    /// # Arguments
    /// * `name` - The metric name
    /// * `value` - The current value
    /// * `labels` - Optional labels as key-value pairs
    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]);
}

/// Media-generation metrics with convenience methods.
#[derive(Clone)]
pub struct MediaMetrics {
    prefix: String,
    recorder: Arc<dyn MetricsRecorder>,
}

impl MediaMetrics {
    /// Create a new metrics facade.
    ///
    /// # Arguments
    /// * `prefix` - Metric name prefix (e.g., "gemini_media")
    /// * `recorder` - The underlying metrics recorder implementation
    pub fn new(prefix: &str, recorder: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            prefix: prefix.to_string(),
            recorder,
        }
    }

    fn name(&self, metric: &str) -> String {
        format!("{}_{}", self.prefix, metric)
    }

    /// Record a finished generation, successful or not.
    ///
    /// # Arguments
    /// * `kind` - The lane that served the request
    /// * `outcome` - `None` on success, otherwise the failure kind
    /// * `duration_ms` - Wall time including retries
    pub fn record_generation(&self, kind: MediaKind, outcome: Option<ErrorKind>, duration_ms: u64) {
        let outcome_label = outcome.map_or("ok", ErrorKind::as_str);

        self.recorder.increment_counter(
            &self.name("generations_total"),
            &[("kind", kind.as_str()), ("outcome", outcome_label)],
        );
        self.recorder.record_histogram(
            &self.name("generation_duration_ms"),
            duration_ms as f64,
            &[("kind", kind.as_str())],
        );

        if outcome.is_some() {
            self.recorder.increment_counter(
                &self.name("errors_total"),
                &[("kind", kind.as_str()), ("error", outcome_label)],
            );
        }
    }

    /// Record a cache lookup.
    pub fn record_cache_lookup(&self, kind: MediaKind, hit: bool) {
        let metric = if hit { "cache_hits_total" } else { "cache_misses_total" };
        self.recorder
            .increment_counter(&self.name(metric), &[("kind", kind.as_str())]);
    }

    /// Record a retry about to be issued.
    pub fn record_retry(&self, kind: MediaKind, attempt: u32) {
        let attempt_str = attempt.to_string();
        self.recorder.increment_counter(
            &self.name("retries_total"),
            &[("kind", kind.as_str()), ("attempt", &attempt_str)],
        );
    }

    /// Record a 429 response.
    pub fn record_rate_limit(&self, kind: MediaKind) {
        self.recorder
            .increment_counter(&self.name("rate_limits_total"), &[("kind", kind.as_str())]);
    }

    /// Record a generation the model stopped early.
    pub fn record_stopped(&self, kind: MediaKind, reason: &str) {
        self.recorder.increment_counter(
            &self.name("stopped_total"),
            &[("kind", kind.as_str()), ("reason", reason)],
        );
    }

    /// Record the current quota estimate.
    pub fn record_quota(&self, kind: MediaKind, state: &RateLimitState) {
        self.recorder.record_gauge(
            &self.name("quota_remaining_requests"),
            f64::from(state.remaining_requests),
            &[("kind", kind.as_str())],
        );
        self.recorder.record_gauge(
            &self.name("quota_remaining_tokens"),
            state.remaining_tokens as f64,
            &[("kind", kind.as_str())],
        );
    }

    /// Record token usage reported by the service.
    pub fn record_tokens(&self, kind: MediaKind, usage: &UsageMetadata) {
        self.recorder.record_histogram(
            &self.name("prompt_tokens"),
            f64::from(usage.prompt_token_count),
            &[("kind", kind.as_str())],
        );
        self.recorder.record_histogram(
            &self.name("total_tokens"),
            f64::from(usage.total_token_count),
            &[("kind", kind.as_str())],
        );
    }

    /// Record the size of a decoded payload.
    pub fn record_payload(&self, kind: MediaKind, bytes: usize) {
        self.recorder.record_histogram(
            &self.name("payload_bytes"),
            bytes as f64,
            &[("kind", kind.as_str())],
        );
    }
}

impl std::fmt::Debug for MediaMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaMetrics").field("prefix", &self.prefix).finish()
    }
}

/// Tracing-based metrics recorder implementation.
///
/// This recorder emits metrics as tracing events, which can be consumed
/// by various tracing subscribers.
#[derive(Debug, Default)]
pub struct TracingMetricsRecorder;

impl TracingMetricsRecorder {
    /// Create a new tracing metrics recorder.
    pub fn new() -> Self {
        Self
    }
}

impl MetricsRecorder for TracingMetricsRecorder {
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]) {
        let labels_map: HashMap<&str, &str> = labels.iter().copied().collect();
        tracing::trace!(
            metric_type = "counter",
            metric_name = name,
            metric_value = 1,
            labels = ?labels_map,
            "Counter incremented"
        );
    }

    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let labels_map: HashMap<&str, &str> = labels.iter().copied().collect();
        tracing::trace!(
            metric_type = "histogram",
            metric_name = name,
            metric_value = value,
            labels = ?labels_map,
            "Histogram recorded"
        );
    }

    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let labels_map: HashMap<&str, &str> = labels.iter().copied().collect();
        tracing::trace!(
            metric_type = "gauge",
            metric_name = name,
            metric_value = value,
            labels = ?labels_map,
            "Gauge recorded"
        );
    }
}

/// Default metrics recorder implementation (no-op).
#[derive(Debug, Default)]
pub struct DefaultMetricsRecorder;

impl DefaultMetricsRecorder {
    /// Creates a new no-op recorder.
    pub fn new() -> Self {
        Self
    }
}

impl MetricsRecorder for DefaultMetricsRecorder {
    fn increment_counter(&self, _name: &str, _labels: &[(&str, &str)]) {}

    fn record_histogram(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}

    fn record_gauge(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RecordingMetricsRecorder;

    fn metrics() -> (Arc<RecordingMetricsRecorder>, MediaMetrics) {
        let recorder = Arc::new(RecordingMetricsRecorder::new());
        let metrics = MediaMetrics::new("gemini_media", recorder.clone());
        (recorder, metrics)
    }

    #[test]
    fn test_record_successful_generation() {
        let (recorder, metrics) = metrics();
        metrics.record_generation(MediaKind::Image, None, 1234);

        assert_eq!(recorder.counter("gemini_media_generations_total"), 1);
        assert_eq!(recorder.counter("gemini_media_errors_total"), 0);
        assert_eq!(
            recorder.histogram_values("gemini_media_generation_duration_ms"),
            vec![1234.0]
        );
    }

    #[test]
    fn test_record_failed_generation_labels_kind() {
        let (recorder, metrics) = metrics();
        metrics.record_generation(MediaKind::Audio, Some(ErrorKind::Forbidden), 10);

        let labels = recorder.counter_labels("gemini_media_errors_total");
        assert_eq!(labels.len(), 1);
        assert!(labels[0].contains(&("error".to_string(), "forbidden".to_string())));
    }

    #[test]
    fn test_record_cache_lookups() {
        let (recorder, metrics) = metrics();
        metrics.record_cache_lookup(MediaKind::Text, true);
        metrics.record_cache_lookup(MediaKind::Text, false);
        metrics.record_cache_lookup(MediaKind::Text, true);

        assert_eq!(recorder.counter("gemini_media_cache_hits_total"), 2);
        assert_eq!(recorder.counter("gemini_media_cache_misses_total"), 1);
    }

    #[test]
    fn test_noop_and_tracing_recorders_accept_everything() {
        for recorder in [
            Arc::new(DefaultMetricsRecorder::new()) as Arc<dyn MetricsRecorder>,
            Arc::new(TracingMetricsRecorder::new()),
        ] {
            recorder.increment_counter("test.counter", &[("kind", "image")]);
            recorder.record_histogram("test.histogram", 123.45, &[]);
            recorder.record_gauge("test.gauge", 67.89, &[]);
        }
    }
}
