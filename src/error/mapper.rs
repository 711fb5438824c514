//! Error classification for HTTP statuses, transport failures and bad payloads.

use bytes::Bytes;
use serde::Deserialize;
use std::collections::HashMap;

use super::kind::ErrorKind;
use super::types::GenerationError;
use crate::transport::{ResponseParser, TransportError};

/// Structured API error response from Gemini.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    pub error: ApiErrorDetail,
}

/// Detailed error information from the API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    /// HTTP status echoed by the service.
    #[serde(default)]
    pub code: i32,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Canonical status name, e.g. `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub status: String,
}

/// A failure as observed before classification.
#[derive(Debug)]
pub enum RawFailure {
    /// The service answered with a non-success status.
    Status {
        status: u16,
        headers: HashMap<String, String>,
        body: Bytes,
    },
    /// No response was received.
    Transport(TransportError),
    /// A success response whose body did not match the expected schema.
    Malformed { message: String },
}

/// Maps a raw failure onto the closed taxonomy.
pub fn classify(failure: &RawFailure) -> ErrorKind {
    match failure {
        RawFailure::Status { status, .. } => classify_status(*status),
        RawFailure::Transport(_) => ErrorKind::Transport,
        RawFailure::Malformed { .. } => ErrorKind::MalformedResponse,
    }
}

fn classify_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::InvalidInput,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        429 => ErrorKind::RateLimited,
        500 => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

/// Converts a raw failure into a [`GenerationError`] carrying its details.
pub fn map_failure(failure: RawFailure) -> GenerationError {
    match failure {
        RawFailure::Status { status, headers, body } => {
            let mut error = map_http_status_with_body(status, &body);
            if let GenerationError::RateLimited { retry_after, .. } = &mut error {
                *retry_after = ResponseParser::parse_retry_after(&headers);
            }
            error
        }
        RawFailure::Transport(err) => GenerationError::Transport {
            message: err.to_string(),
        },
        RawFailure::Malformed { message } => GenerationError::MalformedResponse { message },
    }
}

/// Maps an HTTP status and error body to a [`GenerationError`].
///
/// The body is parsed as the Gemini `{"error": {...}}` envelope when possible;
/// otherwise its text is used verbatim.
pub fn map_http_status_with_body(status: u16, body: &[u8]) -> GenerationError {
    let message = extract_message(body);
    match classify_status(status) {
        ErrorKind::InvalidInput => GenerationError::InvalidInput { message },
        ErrorKind::Unauthorized => GenerationError::Unauthorized { message },
        ErrorKind::Forbidden => GenerationError::Forbidden { message },
        ErrorKind::RateLimited => GenerationError::RateLimited {
            message,
            retry_after: None,
        },
        ErrorKind::ServerError => GenerationError::Server { status, message },
        _ => GenerationError::Unknown {
            status: Some(status),
            message,
        },
    }
}

fn extract_message(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorResponse>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
        if !envelope.error.status.is_empty() {
            return envelope.error.status;
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        "no error details".to_string()
    } else {
        text
    }
}
