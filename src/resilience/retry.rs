//! Retry policy for rate-limited generations.
//!
//! The policy is stateless: the caller owns the attempt counter and asks the
//! policy, after each failure, whether and when to try again.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::ErrorKind;

/// Decides whether a failed attempt is re-issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Creates a policy from configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_delay,
        }
    }

    /// Creates a policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retrying after failure number `attempt` (zero-based).
    ///
    /// Only [`ErrorKind::RateLimited`] is retried. The delay doubles with each
    /// attempt: with the defaults, attempt 0 waits 1 s, attempt 1 waits 2 s and
    /// attempt 2 gives up.
    ///
    /// # Arguments
    ///
    /// * `kind` - Classification of the failure just observed
    /// * `attempt` - Number of retries already performed
    pub fn should_retry(&self, kind: ErrorKind, attempt: u32) -> Option<Duration> {
        if !kind.is_retryable() || attempt >= self.max_retries {
            return None;
        }

        let factor = 2u32.checked_pow(attempt)?;
        self.base_delay.checked_mul(factor)
    }

    /// Maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
