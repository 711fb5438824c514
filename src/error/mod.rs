//! Error types for the Gemini media client.
//!
//! Every failure the client can produce is a [`GenerationError`], and every
//! [`GenerationError`] collapses into exactly one [`ErrorKind`].

mod kind;
mod mapper;
mod types;

pub use kind::ErrorKind;
pub use mapper::{classify, map_failure, map_http_status_with_body, ApiErrorDetail, ApiErrorResponse, RawFailure};
pub use types::{GenerationError, MediaResult};
