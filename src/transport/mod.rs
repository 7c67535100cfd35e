//! Transport subsystem.
//!
//! # Responsibilities
//! - Perform exactly one HTTP round trip per call
//! - Return status, headers and body as-is
//! - Return promptly when the caller cancels
//!
//! # Design Decisions
//! - No retry, timeout or status interpretation here; that lives in
//!   `resilience` and `client::executor`
//! - `Transport` is a trait so the executor can be driven by an in-memory
//!   transport in tests

use std::fmt;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::resilience::CallContext;

pub mod http;

pub use self::http::HttpTransport;

/// A fully built request, ready to put on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A raw response. The body has been read to completion.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Body as text, lossily decoded. Used for error details.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// DNS, connect, reset, TLS or body read failure.
    #[error("failed to execute request: {0}")]
    Network(String),

    /// The caller's cancellation token fired mid-flight.
    #[error("request cancelled")]
    Cancelled,
}

/// Issues one HTTP request.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(
        &self,
        ctx: &CallContext,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError>;
}
