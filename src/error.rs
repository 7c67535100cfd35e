//! Client error taxonomy.
//!
//! # Design Decisions
//! - Every failure that crosses the client boundary is a `ClientError`
//! - Callers branch on `ErrorKind`, never on message text
//! - Retryable causes are absorbed by the executor; they only surface as the
//!   `source` of `RetriesExhausted`

use std::fmt;

use thiserror::Error;

use crate::client::Category;
use crate::config::ValidationError;

/// Kind of a client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    RateLimited,
    ServerUnavailable,
    NetworkFailure,
    Decoding,
    Cancelled,
    DeadlineExceeded,
    RetriesExhausted,
    Other,
}

impl ErrorKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ServerUnavailable => "server_unavailable",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::Decoding => "decoding",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::RetriesExhausted => "retries_exhausted",
            ErrorKind::Other => "other",
        }
    }

    /// Kinds the executor absorbs and retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::ServerUnavailable | ErrorKind::NetworkFailure
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which ceiling ended the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhaustion {
    /// `max_retries` retries were spent.
    MaxRetries,
    /// The elapsed-time ceiling passed.
    MaxElapsedTime,
}

impl fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exhaustion::MaxRetries => f.write_str("max retries exceeded"),
            Exhaustion::MaxElapsedTime => f.write_str("max elapsed time exceeded"),
        }
    }
}

/// Errors returned by the IAM client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The targeted resource does not exist.
    #[error("{resource_type} with ID {id} not found")]
    NotFound { resource_type: String, id: String },

    /// The server asked us to slow down (429).
    #[error("rate limited (HTTP {status}): {body}")]
    RateLimited { status: u16, body: String },

    /// Upstream gateway failure (502, 503, 504).
    #[error("server unavailable (HTTP {status}): {body}")]
    ServerUnavailable { status: u16, body: String },

    /// Transport-level failure (DNS, connection reset, TLS).
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered but the body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decoding(#[source] serde_json::Error),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation's deadline fired before it completed.
    #[error("{category} operation exceeded its deadline")]
    DeadlineExceeded { category: Category },

    /// The retry loop gave up. `source` is the last retryable cause seen.
    #[error("giving up after {attempts} attempts ({reason}): {source}")]
    RetriesExhausted {
        attempts: u32,
        reason: Exhaustion,
        #[source]
        source: Box<ClientError>,
    },

    /// Any other non-success response.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The request could not be built (bad URL, bad header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The client was constructed from invalid settings.
    #[error("invalid client configuration: {0}")]
    Configuration(#[from] ValidationError),

    /// The task running the operation panicked or was aborted.
    #[error("request task failed: {0}")]
    Task(String),
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::RateLimited { .. } => ErrorKind::RateLimited,
            ClientError::ServerUnavailable { .. } => ErrorKind::ServerUnavailable,
            ClientError::Network(_) => ErrorKind::NetworkFailure,
            ClientError::Decoding(_) => ErrorKind::Decoding,
            ClientError::Cancelled => ErrorKind::Cancelled,
            ClientError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            ClientError::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            ClientError::Api { .. }
            | ClientError::Encoding(_)
            | ClientError::InvalidRequest(_)
            | ClientError::Configuration(_)
            | ClientError::Task(_) => ErrorKind::Other,
        }
    }

    /// True when the resource is already absent.
    ///
    /// Collaborators treat this as success for deletes and as
    /// "drop from state" for reads.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True for causes the retry loop would absorb. Only observable on the
    /// `source` of `RetriesExhausted`.
    pub fn is_retryable_kind(&self) -> bool {
        self.kind().is_retryable()
    }

    /// The last retryable cause, if the retry loop gave up.
    pub fn last_cause(&self) -> Option<&ClientError> {
        match self {
            ClientError::RetriesExhausted { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ClientError::NotFound {
            resource_type: "group".into(),
            id: "g1".into(),
        };
        assert_eq!(err.to_string(), "group with ID g1 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_exhausted_carries_cause() {
        let err = ClientError::RetriesExhausted {
            attempts: 4,
            reason: Exhaustion::MaxRetries,
            source: Box::new(ClientError::ServerUnavailable {
                status: 503,
                body: "down".into(),
            }),
        };
        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
        assert_eq!(err.last_cause().map(ClientError::kind), Some(ErrorKind::ServerUnavailable));
        assert!(err.to_string().contains("max retries exceeded"));
        assert!(!err.is_retryable_kind());
        assert!(err.last_cause().unwrap().is_retryable_kind());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_api_error_is_other() {
        let err = ClientError::Api {
            status: 400,
            body: "bad".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(!err.is_not_found());
        assert!(err.last_cause().is_none());
    }
}
