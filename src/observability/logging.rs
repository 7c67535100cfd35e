//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for the binary
//! - Record request/response pairs, retries and final failures
//!
//! # Design Decisions
//! - The diagnostic logger only observes; no return value feeds control flow
//! - `debug` dumps full requests and responses, `info` only the request line
//!   and status line, `none` turns it off
//! - The bearer credential is never written to a log

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ClientError;
use crate::resilience::RetryCause;
use crate::transport::{TransportRequest, TransportResponse};

/// Diagnostic verbosity, ordered from quiet to verbose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Error,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// `tracing` level directive that admits every event this level emits.
    /// `none` still admits the governor's warnings.
    pub fn tracing_directive(&self) -> &'static str {
        match self {
            LogLevel::None | LogLevel::Error => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Observer for attempts, outcomes and retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticLogger {
    level: LogLevel,
}

impl DiagnosticLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// A logger that records nothing.
    pub fn disabled() -> Self {
        Self::new(LogLevel::None)
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && self.level >= level
    }

    pub fn log_request(&self, request: &TransportRequest, attempt: u32) {
        if self.enabled(LogLevel::Debug) {
            tracing::debug!(attempt, "HTTP Request:\n{}", dump_request(request));
        } else if self.enabled(LogLevel::Info) {
            tracing::info!(
                attempt,
                method = %request.method,
                url = %request.url,
                "HTTP Request"
            );
        }
    }

    pub fn log_response(&self, response: &TransportResponse) {
        if self.enabled(LogLevel::Debug) {
            tracing::debug!("HTTP Response:\n{}", dump_response(response));
        } else if self.enabled(LogLevel::Info) {
            tracing::info!(
                status = response.status.as_u16(),
                reason = response.status.canonical_reason().unwrap_or(""),
                "HTTP Response"
            );
        }
    }

    /// Record that attempt `attempt` will follow after `wait`.
    pub fn log_retry(&self, attempt: u32, cause: &RetryCause, wait: Duration) {
        if self.enabled(LogLevel::Info) {
            tracing::info!(
                attempt,
                cause = %cause,
                wait_ms = wait.as_millis() as u64,
                "Retry attempt scheduled"
            );
        }
    }

    pub fn log_failure(&self, error: &ClientError) {
        if self.enabled(LogLevel::Error) {
            tracing::error!(kind = %error.kind(), error = %error, "Request failed");
        }
    }
}

fn dump_request(request: &TransportRequest) -> String {
    let mut out = format!("{} {}\n", request.method, request.url);
    dump_headers(&mut out, &request.headers);
    if let Some(body) = &request.body {
        out.push('\n');
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}

fn dump_response(response: &TransportResponse) -> String {
    let mut out = format!(
        "{} {}\n",
        response.status.as_u16(),
        response.status.canonical_reason().unwrap_or("")
    );
    dump_headers(&mut out, &response.headers);
    if !response.body.is_empty() {
        out.push('\n');
        out.push_str(&response.body_text());
    }
    out
}

fn dump_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        if *name == AUTHORIZATION {
            let _ = writeln!(out, "{}: Bearer [REDACTED]", name);
        } else {
            let _ = writeln!(out, "{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides `filter`.
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
