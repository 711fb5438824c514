//! Transport layer error types.

/// Failure to obtain any HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established or was dropped.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The request exceeded the transport timeout.
    #[error("Timeout")]
    Timeout,
    /// The request was sent but the response could not be read.
    #[error("Request error: {0}")]
    Request(String),
}
