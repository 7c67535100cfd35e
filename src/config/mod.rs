//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → passed by value into every IamClient
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no global mutable default
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The bearer credential never lives in the config file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ClientConfig, LoggingConfig, RetryConfig, TimeoutConfig};
pub use validation::{validate_base_url, validate_config, ValidationError};
