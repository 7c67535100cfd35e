//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Operation from the executor:
//!     → timeouts.rs (category deadline composed with the caller's)
//!     → loop:
//!         transport call
//!         → classifier.rs (success / retryable / terminal)
//!         → backoff.rs (ceilings, interruptible wait)
//! ```
//!
//! # Design Decisions
//! - Every operation has a deadline unless explicitly disabled
//! - Only transient failures are retried: network, 429, 502, 503, 504
//! - Caller cancellation reaches both suspension points (transport, wait)
//! - All state lives on one operation's stack; nothing is shared

pub mod backoff;
pub mod classifier;
pub mod context;
pub mod timeouts;

pub use backoff::{exceeds_elapsed_ceiling, next_interval, should_retry, BackoffState, RetryDecision};
pub use classifier::{classify, ClassifiedOutcome, RetryCause};
pub use context::CallContext;
pub use timeouts::run_with_timeout;
