//! Resilient client for the Hii Retail IAM API.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──▶ client::groups ──▶ client::executor ──────────────┐
//!                                   │                             │
//!                                   │  resilience::timeouts       │
//!                                   │    (category deadline)      │
//!                                   │  retry loop:                │
//!                                   │    transport ──▶ classifier │
//!                                   │        ▲            │       │
//!                                   │        └── backoff ◀┘       │
//!                                   ▼                             │
//!                        decoded resource / ClientError ◀─────────┘
//!
//!   cross-cutting: config, observability (tracing + metrics), lifecycle
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use client::{CallOptions, Category, Group, IamClient, IamClientBuilder};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind, Exhaustion};
pub use resilience::CallContext;
