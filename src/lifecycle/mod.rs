//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → cancel the token → in-flight operation returns Cancelled
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative: the signal only fires the token, the
//!   executor notices at its next suspension point

pub mod signals;

pub use signals::cancel_on_ctrl_c;
