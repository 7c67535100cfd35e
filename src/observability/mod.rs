//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request executor produces:
//!     → logging.rs (diagnostic request/response/retry events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → tracing subscriber (stderr for the CLI, whatever the host installs)
//!     → metrics recorder chosen by the host application
//! ```
//!
//! # Design Decisions
//! - Every operation runs in an `iam_request` span carrying its request ID
//! - Observers never influence retries or outcomes

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, DiagnosticLogger, LogLevel};
