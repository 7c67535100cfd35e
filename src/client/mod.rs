//! IAM API client subsystem.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → groups.rs (typed resource operations)
//!     → operation.rs (category, method, path, body, request ID)
//!     → executor.rs
//!         → resilience (deadline, retry loop, backoff)
//!         → transport (one HTTP round trip per attempt)
//!     → decoded resource or ClientError
//! ```
//!
//! # Design Decisions
//! - Default retry and timeout configuration is fixed at construction and
//!   shared by every operation; `with_call_options` scopes overrides
//! - The transport is a trait object so tests can script responses

pub mod executor;
pub mod groups;
pub mod operation;

pub use executor::{CallOptions, RequestExecutor};
pub use groups::Group;
pub use operation::{Category, Operation, ResourceRef};

use std::sync::Arc;

use crate::config::{ClientConfig, RetryConfig, TimeoutConfig};
use crate::error::ClientError;
use crate::observability::{DiagnosticLogger, LogLevel};
use crate::transport::{HttpTransport, Transport};

/// Client for the IAM API.
#[derive(Debug, Clone)]
pub struct IamClient {
    executor: RequestExecutor,
    options: CallOptions,
}

impl IamClient {
    /// Client with default retry, timeout and logging behavior.
    pub fn new(base_url: &str, token: &str) -> Result<Self, ClientError> {
        Self::builder(base_url, token).build()
    }

    /// Client configured from a loaded `ClientConfig`.
    pub fn from_config(config: &ClientConfig, token: &str) -> Result<Self, ClientError> {
        Self::builder(&config.base_url, token)
            .retry_config(config.retry.clone())
            .timeout_config(config.timeouts.clone())
            .log_level(config.logging.level)
            .build()
    }

    pub fn builder(base_url: &str, token: &str) -> IamClientBuilder {
        IamClientBuilder {
            base_url: base_url.to_string(),
            token: token.to_string(),
            transport: None,
            retry: RetryConfig::default(),
            timeouts: TimeoutConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// A clone of this client whose calls use `options` instead of the
    /// defaults. The original is unaffected.
    pub fn with_call_options(&self, options: CallOptions) -> Self {
        Self {
            executor: self.executor.clone(),
            options,
        }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    fn call_options(&self) -> &CallOptions {
        &self.options
    }
}

/// Builder for [`IamClient`].
pub struct IamClientBuilder {
    base_url: String,
    token: String,
    transport: Option<Arc<dyn Transport>>,
    retry: RetryConfig,
    timeouts: TimeoutConfig,
    log_level: LogLevel,
}

impl IamClientBuilder {
    /// Replace the default `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout_config(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn build(self) -> Result<IamClient, ClientError> {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()) as Arc<dyn Transport>);
        let executor = RequestExecutor::new(
            &self.base_url,
            &self.token,
            transport,
            self.retry,
            self.timeouts,
            DiagnosticLogger::new(self.log_level),
        )?;

        Ok(IamClient {
            executor,
            options: CallOptions::default(),
        })
    }
}
