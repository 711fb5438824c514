//! Main error type for the Gemini media client.

use std::time::Duration;
use thiserror::Error;

use super::kind::ErrorKind;
use crate::types::Locale;

/// Result type alias for media generation operations.
pub type MediaResult<T> = Result<T, GenerationError>;

/// Top-level error type for media generation.
#[derive(Error, Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum GenerationError {
    /// The request was rejected before or by the service.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The client was configured incorrectly.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The API key is missing or invalid.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The API key may not use the model.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// The service returned 429. `retry_after` is the hint it sent, if any.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// The service failed internally.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// No response was received.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The caller cancelled the generation.
    #[error("Request cancelled")]
    Cancelled,

    /// A success response did not have the expected shape.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The model finished for a reason other than `STOP`, or the prompt was blocked.
    #[error("Generation stopped: {reason}")]
    Stopped { reason: String },

    /// Any other status or failure.
    #[error("Unexpected error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Unknown { status: Option<u16>, message: String },
}

impl GenerationError {
    /// Creates an [`GenerationError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        GenerationError::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a [`GenerationError::MalformedResponse`].
    pub fn malformed(message: impl Into<String>) -> Self {
        GenerationError::MalformedResponse {
            message: message.into(),
        }
    }

    /// The closed classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::InvalidInput { .. } | GenerationError::Configuration { .. } => {
                ErrorKind::InvalidInput
            }
            GenerationError::Unauthorized { .. } => ErrorKind::Unauthorized,
            GenerationError::Forbidden { .. } => ErrorKind::Forbidden,
            GenerationError::RateLimited { .. } => ErrorKind::RateLimited,
            GenerationError::Server { .. } => ErrorKind::ServerError,
            GenerationError::Transport { .. } | GenerationError::Cancelled => ErrorKind::Transport,
            GenerationError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            GenerationError::Stopped { .. } | GenerationError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns true if the retry policy may re-issue the request.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Retry-After hint sent by the service, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GenerationError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Message suitable for display to an end user.
    pub fn user_message(&self) -> String {
        self.localized_user_message(Locale::En)
    }

    /// Localized display message. Stopped generations embed the finish reason.
    pub fn localized_user_message(&self, locale: Locale) -> String {
        match self {
            GenerationError::Stopped { reason } => match locale {
                Locale::Es => format!("La generación se detuvo antes de completarse: {reason}"),
                _ => format!("Generation stopped before completing: {reason}"),
            },
            other => other.kind().localized_message(locale).to_string(),
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::MalformedResponse {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for GenerationError {
    fn from(err: url::ParseError) -> Self {
        GenerationError::Configuration {
            message: format!("invalid URL: {err}"),
        }
    }
}

impl From<base64::DecodeError> for GenerationError {
    fn from(err: base64::DecodeError) -> Self {
        GenerationError::MalformedResponse {
            message: format!("payload is not valid base64: {err}"),
        }
    }
}
