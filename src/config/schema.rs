//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::Category;
use crate::observability::logging::LogLevel;

/// Root configuration for the IAM client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://iam-api.retailsvc.com").
    pub base_url: String,

    /// Retry configuration.
    pub retry: RetryConfig,

    /// Per-category timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,

    /// Wait before the first retry in milliseconds.
    pub initial_interval_ms: u64,

    /// Upper bound for any single wait in milliseconds.
    pub max_interval_ms: u64,

    /// Growth factor applied to the wait after every retry.
    pub multiplier: f64,

    /// Hard ceiling on the whole retry loop in milliseconds.
    pub max_elapsed_ms: u64,

    /// Add up to 10% random jitter to each wait.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval_ms: 100,
            max_interval_ms: 10_000,
            multiplier: 2.0,
            max_elapsed_ms: 30_000,
            jitter: false,
        }
    }
}

impl RetryConfig {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn max_elapsed_time(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }
}

/// Timeout per operation category.
///
/// A category without its own entry uses `default_ms`. A resolved value of 0
/// disables the category deadline; inherited deadlines still apply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub default_ms: u64,
    pub create_ms: Option<u64>,
    pub read_ms: Option<u64>,
    pub update_ms: Option<u64>,
    pub delete_ms: Option<u64>,
    pub list_ms: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_ms: 30_000,
            create_ms: Some(60_000),
            read_ms: Some(30_000),
            update_ms: Some(60_000),
            delete_ms: Some(60_000),
            list_ms: Some(60_000),
        }
    }
}

impl TimeoutConfig {
    /// Same timeout for every category.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            default_ms: timeout.as_millis() as u64,
            create_ms: None,
            read_ms: None,
            update_ms: None,
            delete_ms: None,
            list_ms: None,
        }
    }

    /// Resolve the timeout for a category.
    pub fn for_category(&self, category: Category) -> Duration {
        let entry = match category {
            Category::Create => self.create_ms,
            Category::Read => self.read_ms,
            Category::Update => self.update_ms,
            Category::Delete => self.delete_ms,
            Category::List => self.list_ms,
        };
        Duration::from_millis(entry.unwrap_or(self.default_ms))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Diagnostic logger level (none, error, info, debug).
    pub level: LogLevel,

    /// `tracing` filter used when `RUST_LOG` is unset. Derived from `level`
    /// when absent.
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Filter for the `tracing` subscriber: the explicit `filter`, or one
    /// that lets through everything `level` emits.
    pub fn effective_filter(&self) -> String {
        match &self.filter {
            Some(filter) => filter.clone(),
            None => {
                let directive = self.level.tracing_directive();
                format!("iam_client={},iam_cli={}", directive, directive)
            }
        }
    }
}
