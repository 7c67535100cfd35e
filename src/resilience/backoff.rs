//! Exponential backoff scheduling.
//!
//! # Responsibilities
//! - Compute the wait before each retry (exponential, clamped, optional jitter)
//! - Enforce the attempt-count and elapsed-time ceilings
//! - Wait in a way the caller can interrupt
//!
//! # Design Decisions
//! - State is per operation and never shared
//! - The elapsed ceiling is checked first and wins over remaining retries
//! - Jitter never pushes a wait past `max_interval`

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};

use crate::config::RetryConfig;
use crate::error::Exhaustion;
use crate::resilience::CallContext;

/// Backoff progress for one operation.
#[derive(Debug, Clone)]
pub struct BackoffState {
    current_interval: Duration,
    started_at: Instant,
}

impl BackoffState {
    /// Start tracking a new operation now.
    pub fn start(config: &RetryConfig) -> Self {
        Self {
            current_interval: config.initial_interval().min(config.max_interval()),
            started_at: Instant::now(),
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// The wait the next call to `next_interval` returns, before jitter.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Instant after which no attempt may run.
    pub fn elapsed_ceiling(&self, config: &RetryConfig) -> Instant {
        self.started_at + config.max_elapsed_time()
    }
}

/// Return the next wait and advance the state.
pub fn next_interval(state: &mut BackoffState, config: &RetryConfig) -> Duration {
    let max = config.max_interval();
    let interval = state.current_interval.min(max);
    state.current_interval = scale(interval, config.multiplier, max);

    if config.jitter {
        apply_jitter(interval, max)
    } else {
        interval
    }
}

/// Multiply in nanoseconds so 100ms * 2.0 is exactly 200ms.
fn scale(interval: Duration, multiplier: f64, max: Duration) -> Duration {
    let scaled = interval.as_nanos() as f64 * multiplier;
    if !scaled.is_finite() || scaled >= max.as_nanos() as f64 {
        max
    } else {
        Duration::from_nanos(scaled.round() as u64)
    }
}

/// Add 0 to 10% of the interval, capped at `max`.
fn apply_jitter(interval: Duration, max: Duration) -> Duration {
    let jitter_range = interval.as_nanos() as u64 / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };
    (interval + Duration::from_nanos(jitter)).min(max)
}

/// True once `elapsed` is strictly past the max elapsed time. Reaching the
/// ceiling exactly is still within budget.
pub fn exceeds_elapsed_ceiling(elapsed: Duration, config: &RetryConfig) -> bool {
    elapsed > config.max_elapsed_time()
}

/// Outcome of the retry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Stop(Exhaustion),
}

/// Decide whether attempt `attempt_ordinal` (0-based) may be followed by
/// another one.
pub fn should_retry(attempt_ordinal: u32, elapsed: Duration, config: &RetryConfig) -> RetryDecision {
    if exceeds_elapsed_ceiling(elapsed, config) {
        RetryDecision::Stop(Exhaustion::MaxElapsedTime)
    } else if attempt_ordinal >= config.max_retries {
        RetryDecision::Stop(Exhaustion::MaxRetries)
    } else {
        RetryDecision::Retry
    }
}

/// Why a wait ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitInterrupted {
    Cancelled,
    DeadlineExceeded,
}

/// Sleep for `interval` unless the caller cancels or the deadline passes.
pub async fn wait(ctx: &CallContext, interval: Duration) -> Result<(), WaitInterrupted> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(WaitInterrupted::Cancelled),
        _ = ctx.expired() => Err(WaitInterrupted::DeadlineExceeded),
        _ = time::sleep(interval) => Ok(()),
    }
}
