//! Resilience layer for the Gemini media client.
//!
//! Holds the stateless [`RetryPolicy`] consulted after each failed attempt and
//! the per-model [`RateLimitTracker`] advanced by every response.

mod rate_tracker;
mod retry;

pub use rate_tracker::{next_local_midnight, RateLimitState, RateLimitTracker};
pub use retry::RetryPolicy;
