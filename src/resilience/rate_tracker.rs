//! Local, optimistic estimate of remaining quota for one model.
//!
//! The tracker never talks to the service. It is advanced by the outcome of
//! each call and is only meant for display and diagnostics.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::RateLimitDisplay;

/// How long the quota is considered exhausted after a 429.
const RATE_LIMIT_COOLDOWN_SECS: i64 = 60;

/// Snapshot of the estimated quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    /// Requests left in the current window.
    pub remaining_requests: u32,
    /// Tokens left in the current window.
    pub remaining_tokens: u64,
    /// When the estimate is next replenished.
    pub reset_at: DateTime<Local>,
}

/// Tracks the estimated quota of a single model.
#[derive(Debug)]
pub struct RateLimitTracker {
    limits: RateLimitDisplay,
    state: Mutex<RateLimitState>,
    rate_limited_count: AtomicU64,
}

impl RateLimitTracker {
    /// Creates a tracker seeded with the published limits.
    pub fn new(limits: RateLimitDisplay) -> Self {
        Self::new_at(limits, Local::now())
    }

    /// Creates a tracker as of `now`.
    pub fn new_at(limits: RateLimitDisplay, now: DateTime<Local>) -> Self {
        Self {
            limits,
            state: Mutex::new(Self::full(limits, now)),
            rate_limited_count: AtomicU64::new(0),
        }
    }

    /// The published limits this tracker was seeded with.
    pub fn limits(&self) -> RateLimitDisplay {
        self.limits
    }

    /// Current estimate, replenished if the reset time has passed.
    pub fn current(&self) -> RateLimitState {
        self.current_at(Local::now())
    }

    /// Current estimate as of `now`.
    pub fn current_at(&self, now: DateTime<Local>) -> RateLimitState {
        let mut state = self.lock();
        if now >= state.reset_at {
            *state = Self::full(self.limits, now);
            tracing::debug!(reset_at = %state.reset_at, "Quota estimate replenished");
        }
        *state
    }

    /// Records a successful call costing `estimated_tokens`.
    pub fn on_success(&self, estimated_tokens: u64) {
        self.on_success_at(estimated_tokens, Local::now());
    }

    /// Records a successful call as of `now`.
    pub fn on_success_at(&self, estimated_tokens: u64, now: DateTime<Local>) {
        let mut state = self.lock();
        if now >= state.reset_at {
            *state = Self::full(self.limits, now);
        }
        state.remaining_requests = state.remaining_requests.saturating_sub(1);
        state.remaining_tokens = state.remaining_tokens.saturating_sub(estimated_tokens);
        state.reset_at = state.reset_at.min(next_local_midnight(now));
    }

    /// Records a 429 response.
    pub fn on_rate_limited(&self) {
        self.on_rate_limited_at(Local::now());
    }

    /// Records a 429 response as of `now`.
    pub fn on_rate_limited_at(&self, now: DateTime<Local>) {
        let mut state = self.lock();
        state.remaining_requests = 0;
        state.remaining_tokens = 0;
        state.reset_at = now + ChronoDuration::seconds(RATE_LIMIT_COOLDOWN_SECS);
        let count = self.rate_limited_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(reset_at = %state.reset_at, count, "Rate limit recorded");
    }

    /// Number of 429 responses recorded since creation.
    pub fn rate_limited_count(&self) -> u64 {
        self.rate_limited_count.load(Ordering::Relaxed)
    }

    fn full(limits: RateLimitDisplay, now: DateTime<Local>) -> RateLimitState {
        RateLimitState {
            remaining_requests: limits.requests_per_day,
            remaining_tokens: limits.tokens_per_minute,
            reset_at: next_local_midnight(now),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The first instant of the local day after `now`.
///
/// Falls back to 24 hours later when midnight does not exist in the local
/// zone (DST transitions at midnight).
pub fn next_local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .unwrap_or_else(|| now + ChronoDuration::hours(24))
}
