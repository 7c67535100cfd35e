//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a whole logical operation (all of its attempts) in a deadline
//! - Key the deadline to the operation category
//! - Return promptly on expiry or caller cancellation
//!
//! # Design Decisions
//! - The category deadline composes with any inherited deadline; the tighter
//!   one wins
//! - First result wins: the operation runs as its own task and is detached,
//!   not aborted, when the deadline fires. A write already on the wire may
//!   still land after the caller has seen `DeadlineExceeded`; callers that
//!   need exactly-once semantics layer idempotency keys on top
//! - The detached task observes the same deadline and makes no new attempts

use std::future::Future;

use tracing::Instrument;

use crate::client::Category;
use crate::config::TimeoutConfig;
use crate::error::ClientError;
use crate::resilience::CallContext;

/// Run `body` under the category's deadline.
///
/// `body` receives the narrowed context and must honor it at its own
/// suspension points.
pub async fn run_with_timeout<T, F, Fut>(
    ctx: &CallContext,
    category: Category,
    config: &TimeoutConfig,
    body: F,
) -> Result<T, ClientError>
where
    F: FnOnce(CallContext) -> Fut,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    T: Send + 'static,
{
    let timeout = config.for_category(category);
    let scoped = if timeout.is_zero() {
        ctx.clone()
    } else {
        ctx.with_timeout(timeout)
    };

    let task = tokio::spawn(body(scoped.clone()).in_current_span());

    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(ClientError::Cancelled),
        _ = scoped.expired() => {
            tracing::warn!(
                category = %category,
                timeout_ms = timeout.as_millis() as u64,
                "Operation deadline exceeded, discarding pending result"
            );
            Err(ClientError::DeadlineExceeded { category })
        }
        joined = task => match joined {
            Ok(result) => result,
            Err(e) => Err(ClientError::Task(e.to_string())),
        },
    }
}
