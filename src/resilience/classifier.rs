//! Outcome classification.
//!
//! # Responsibilities
//! - Decide whether an attempt succeeded, should be retried, or failed for good
//! - Map terminal failures onto typed `ClientError`s
//!
//! # Design Decisions
//! - Network errors, 429 and 502/503/504 are transient; everything else >= 400
//!   is terminal, so a 400 is never retried
//! - 404 is `NotFound` only when the operation names an existing resource
//!   (read, update, delete of an id); a 404 on create or list is opaque
//! - Transport cancellation is terminal: a cancelled caller is never retried

use std::fmt;

use reqwest::StatusCode;

use crate::client::Operation;
use crate::error::{ClientError, ErrorKind};
use crate::transport::{TransportError, TransportResponse};

/// Result of classifying one attempt.
#[derive(Debug)]
pub enum ClassifiedOutcome {
    Success(TransportResponse),
    Retryable(RetryCause),
    TerminalError(ClientError),
}

/// Why an attempt is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryCause {
    Network(String),
    RateLimited { status: u16, body: String },
    ServerUnavailable { status: u16, body: String },
}

impl RetryCause {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RetryCause::Network(_) => ErrorKind::NetworkFailure,
            RetryCause::RateLimited { .. } => ErrorKind::RateLimited,
            RetryCause::ServerUnavailable { .. } => ErrorKind::ServerUnavailable,
        }
    }

    /// Convert into the error carried by `RetriesExhausted`.
    pub fn into_error(self) -> ClientError {
        match self {
            RetryCause::Network(message) => ClientError::Network(message),
            RetryCause::RateLimited { status, body } => ClientError::RateLimited { status, body },
            RetryCause::ServerUnavailable { status, body } => {
                ClientError::ServerUnavailable { status, body }
            }
        }
    }
}

impl fmt::Display for RetryCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryCause::Network(message) => write!(f, "network failure: {}", message),
            RetryCause::RateLimited { status, .. } => write!(f, "rate limited (HTTP {})", status),
            RetryCause::ServerUnavailable { status, .. } => {
                write!(f, "server unavailable (HTTP {})", status)
            }
        }
    }
}

/// Whether a status code is transient by policy.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Classify the result of one transport call.
pub fn classify(
    operation: &Operation,
    result: Result<TransportResponse, TransportError>,
) -> ClassifiedOutcome {
    let response = match result {
        Ok(response) => response,
        Err(TransportError::Network(message)) => {
            return ClassifiedOutcome::Retryable(RetryCause::Network(message));
        }
        Err(TransportError::Cancelled) => {
            return ClassifiedOutcome::TerminalError(ClientError::Cancelled);
        }
    };

    let status = response.status;
    if status.as_u16() < 400 {
        return ClassifiedOutcome::Success(response);
    }

    if is_retryable_status(status) {
        let body = response.body_text();
        let cause = if status == StatusCode::TOO_MANY_REQUESTS {
            RetryCause::RateLimited {
                status: status.as_u16(),
                body,
            }
        } else {
            RetryCause::ServerUnavailable {
                status: status.as_u16(),
                body,
            }
        };
        return ClassifiedOutcome::Retryable(cause);
    }

    if status == StatusCode::NOT_FOUND && operation.category().expects_existing() {
        if let Some(resource) = operation.resource() {
            return ClassifiedOutcome::TerminalError(ClientError::NotFound {
                resource_type: resource.resource_type.clone(),
                id: resource.id.clone(),
            });
        }
    }

    ClassifiedOutcome::TerminalError(ClientError::Api {
        status: status.as_u16(),
        body: response.body_text(),
    })
}
