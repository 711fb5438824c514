//! HTTP response parser for the Gemini API.
//!
//! Turns a raw [`HttpResponse`] into either a typed body or a classified
//! [`GenerationError`].

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use super::http::HttpResponse;
use crate::error::{map_failure, GenerationError, RawFailure};

/// Parser for HTTP responses from the Gemini API.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a response into `T`.
    ///
    /// Non-2xx statuses become classified errors; a 2xx body that does not
    /// deserialize becomes [`GenerationError::MalformedResponse`].
    pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, GenerationError> {
        if !response.is_success() {
            return Err(Self::parse_error_response(response));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            map_failure(RawFailure::Malformed {
                message: format!("response does not match the expected schema: {e}"),
            })
        })
    }

    /// Maps an error response to a [`GenerationError`].
    pub fn parse_error_response(response: HttpResponse) -> GenerationError {
        if let Some(id) = Self::extract_request_id(&response.headers) {
            tracing::debug!(request_id = %id, status = response.status, "API error response");
        }

        map_failure(RawFailure::Status {
            status: response.status,
            headers: response.headers,
            body: response.body,
        })
    }

    /// Parses a `Retry-After` header expressed in seconds.
    ///
    /// ```
    /// use integrations_gemini_media::transport::ResponseParser;
    /// use std::collections::HashMap;
    /// use std::time::Duration;
    ///
    /// let mut headers = HashMap::new();
    /// headers.insert("retry-after".to_string(), "60".to_string());
    /// assert_eq!(ResponseParser::parse_retry_after(&headers), Some(Duration::from_secs(60)));
    /// ```
    pub fn parse_retry_after(headers: &HashMap<String, String>) -> Option<Duration> {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("retry-after"))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Extracts the request ID from response headers for debugging.
    pub fn extract_request_id(headers: &HashMap<String, String>) -> Option<String> {
        const REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "x-goog-request-id", "request-id"];

        headers
            .iter()
            .find(|(key, _)| REQUEST_ID_HEADERS.iter().any(|h| key.eq_ignore_ascii_case(h)))
            .map(|(_, value)| value.clone())
    }
}
