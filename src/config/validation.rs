//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the base URL
//! - Validate value ranges (intervals > 0, multiplier >= 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the client

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("base_url is empty")]
    MissingBaseUrl,

    #[error("base_url '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("retry.multiplier must be >= 1.0 (got {0})")]
    Multiplier(f64),

    #[error("retry.initial_interval_ms must be > 0")]
    ZeroInitialInterval,

    #[error("retry.max_interval_ms ({max}) must be >= retry.initial_interval_ms ({initial})")]
    IntervalOrder { initial: u64, max: u64 },

    #[error("retry.max_elapsed_ms must be > 0")]
    ZeroMaxElapsed,

    #[error("timeouts.default_ms must be > 0")]
    ZeroDefaultTimeout,
}

/// Validate a full client configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_base_url(&config.base_url) {
        errors.push(e);
    }

    let retry = &config.retry;
    if !(retry.multiplier >= 1.0) {
        errors.push(ValidationError::Multiplier(retry.multiplier));
    }
    if retry.initial_interval_ms == 0 {
        errors.push(ValidationError::ZeroInitialInterval);
    }
    if retry.max_interval_ms < retry.initial_interval_ms {
        errors.push(ValidationError::IntervalOrder {
            initial: retry.initial_interval_ms,
            max: retry.max_interval_ms,
        });
    }
    if retry.max_elapsed_ms == 0 {
        errors.push(ValidationError::ZeroMaxElapsed);
    }

    if config.timeouts.default_ms == 0 {
        errors.push(ValidationError::ZeroDefaultTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse a base URL. Only http and https are accepted.
pub fn validate_base_url(raw: &str) -> Result<Url, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingBaseUrl);
    }

    let url = Url::parse(trimmed).map_err(|e| ValidationError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ClientConfig {
        ClientConfig {
            base_url: "https://iam-api.retailsvc.com".to_string(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.base_url = String::new();
        config.retry.multiplier = 0.5;
        config.retry.max_elapsed_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingBaseUrl));
        assert!(errors.contains(&ValidationError::Multiplier(0.5)));
        assert!(errors.contains(&ValidationError::ZeroMaxElapsed));
    }

    #[test]
    fn test_interval_order() {
        let mut config = valid_config();
        config.retry.initial_interval_ms = 500;
        config.retry.max_interval_ms = 100;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::IntervalOrder { initial: 500, max: 100 }]
        );
    }

    #[test]
    fn test_base_url_scheme() {
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(matches!(
            validate_base_url("ftp://example.com"),
            Err(ValidationError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            validate_base_url("not a url"),
            Err(ValidationError::InvalidBaseUrl { .. })
        ));
    }
}
