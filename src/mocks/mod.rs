//! Mock implementations for testing.
//!
//! This module provides a scripted transport and a recording metrics backend
//! for exercising the media client without network access.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::observability::MetricsRecorder;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ScriptedResponse {
    delay: Option<Duration>,
    result: Result<HttpResponse, TransportError>,
}

/// Mock HTTP transport for testing.
///
/// Responses are returned in the order they were enqueued. Every request is
/// recorded, including ones that get no scripted response. Clones share the
/// same script and request log.
///
/// # Example
///
/// ```
/// use integrations_gemini_media::mocks::MockHttpTransport;
/// use integrations_gemini_media::transport::{HttpMethod, HttpRequest, HttpTransport};
/// use std::collections::HashMap;
///
/// # tokio_test::block_on(async {
/// let transport = MockHttpTransport::new();
/// transport.enqueue_json_response(200, r#"{"status": "ok"}"#);
///
/// let request = HttpRequest {
///     method: HttpMethod::Get,
///     url: "https://example.com".to_string(),
///     headers: HashMap::new(),
///     body: None,
/// };
///
/// let response = transport.send(request).await.unwrap();
/// assert_eq!(response.status, 200);
/// transport.verify_request_count(1);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockHttpTransport {
    responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttpTransport {
    /// Create a new mock HTTP transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a response to be returned by the next request.
    pub fn enqueue_response(&self, response: Result<HttpResponse, TransportError>) {
        lock(&self.responses).push_back(ScriptedResponse {
            delay: None,
            result: response,
        });
    }

    /// Enqueue a response that is returned only after `delay`.
    pub fn enqueue_delayed_response(
        &self,
        delay: Duration,
        response: Result<HttpResponse, TransportError>,
    ) {
        lock(&self.responses).push_back(ScriptedResponse {
            delay: Some(delay),
            result: response,
        });
    }

    /// Enqueue a JSON response with the given status code and body.
    pub fn enqueue_json_response(&self, status: u16, body: &str) {
        self.enqueue_json_response_with_headers(status, body, &[]);
    }

    /// Enqueue a JSON response with extra headers.
    pub fn enqueue_json_response_with_headers(&self, status: u16, body: &str, headers: &[(&str, &str)]) {
        let mut header_map = HashMap::new();
        header_map.insert("content-type".to_string(), "application/json".to_string());
        for (name, value) in headers {
            header_map.insert((*name).to_string(), (*value).to_string());
        }

        self.enqueue_response(Ok(HttpResponse {
            status,
            headers: header_map,
            body: Bytes::from(body.to_string()),
        }));
    }

    /// Enqueue a transport failure.
    pub fn enqueue_error(&self, error: TransportError) {
        self.enqueue_response(Err(error));
    }

    /// Get all requests that were made.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Get the last request that was made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// The JSON body of the request at `index`.
    pub fn request_json(&self, index: usize) -> Option<serde_json::Value> {
        lock(&self.requests)
            .get(index)
            .and_then(|r| r.body.as_ref())
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of scripted responses not yet consumed.
    pub fn pending_responses(&self) -> usize {
        lock(&self.responses).len()
    }

    /// Verify that exactly `expected` requests were made.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = self.request_count();
        assert_eq!(actual, expected, "Expected {expected} requests, got {actual}");
    }

    /// Verify that a request was made with the expected method and URL.
    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = lock(&self.requests);
        assert!(index < requests.len(), "No request at index {index}");

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {method:?}, got {:?}", request.method);
        assert!(
            request.url.contains(url_contains),
            "Expected URL to contain '{url_contains}', got '{}'",
            request.url
        );
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);

        let scripted = lock(&self.responses).pop_front();
        match scripted {
            Some(ScriptedResponse { delay, result }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(TransportError::Connection(
                "No response configured in MockHttpTransport".to_string(),
            )),
        }
    }
}

type Labels = Vec<(String, String)>;

/// Metrics recorder that keeps everything in memory for assertions.
#[derive(Default)]
pub struct RecordingMetricsRecorder {
    counters: Mutex<Vec<(String, Labels)>>,
    histograms: Mutex<Vec<(String, f64, Labels)>>,
    gauges: Mutex<Vec<(String, f64, Labels)>>,
}

fn own_labels(labels: &[(&str, &str)]) -> Labels {
    labels
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl RecordingMetricsRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times counter `name` was incremented.
    pub fn counter(&self, name: &str) -> usize {
        lock(&self.counters).iter().filter(|(n, _)| n == name).count()
    }

    /// Labels of each increment of counter `name`.
    pub fn counter_labels(&self, name: &str) -> Vec<Labels> {
        lock(&self.counters)
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, labels)| labels.clone())
            .collect()
    }

    /// Every value recorded for histogram `name`.
    pub fn histogram_values(&self, name: &str) -> Vec<f64> {
        lock(&self.histograms)
            .iter()
            .filter(|(n, _, _)| n == name)
            .map(|(_, v, _)| *v)
            .collect()
    }

    /// Last value of gauge `name`.
    pub fn gauge(&self, name: &str) -> Option<f64> {
        lock(&self.gauges)
            .iter()
            .rev()
            .find(|(n, _, _)| n == name)
            .map(|(_, v, _)| *v)
    }
}

impl MetricsRecorder for RecordingMetricsRecorder {
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]) {
        lock(&self.counters).push((name.to_string(), own_labels(labels)));
    }

    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        lock(&self.histograms).push((name.to_string(), value, own_labels(labels)));
    }

    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        lock(&self.gauges).push((name.to_string(), value, own_labels(labels)));
    }
}
