//! Metrics collection.
//!
//! # Metrics
//! - `iam_client_attempts_total` (counter): transport attempts by category
//! - `iam_client_retries_total` (counter): scheduled retries by category, cause
//! - `iam_client_outcomes_total` (counter): final outcomes by category, kind
//! - `iam_client_operation_duration_seconds` (histogram): end-to-end latency
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; the embedding application picks
//!   the recorder. Without one every call is a no-op

use std::time::Duration;

use crate::client::Category;
use crate::error::ErrorKind;

/// Record one transport attempt.
pub fn record_attempt(category: Category) {
    metrics::counter!("iam_client_attempts_total", "category" => category.as_str()).increment(1);
}

/// Record one scheduled retry.
pub fn record_retry(category: Category, cause: ErrorKind) {
    metrics::counter!(
        "iam_client_retries_total",
        "category" => category.as_str(),
        "cause" => cause.as_str()
    )
    .increment(1);
}

/// Record the final outcome of an operation. `None` means success.
pub fn record_outcome(category: Category, failure: Option<ErrorKind>, elapsed: Duration) {
    let kind = failure.map_or("success", |k| k.as_str());
    metrics::counter!(
        "iam_client_outcomes_total",
        "category" => category.as_str(),
        "kind" => kind
    )
    .increment(1);
    metrics::histogram!(
        "iam_client_operation_duration_seconds",
        "category" => category.as_str()
    )
    .record(elapsed.as_secs_f64());
}
