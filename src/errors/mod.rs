//! Centralized error handling for the Mercedes me exporter
//!
//! # Error Categories
//!
//! - **Configuration Errors**: missing credentials or vehicle id, fatal at startup
//! - **Authentication Errors**: no usable access token, skip the poll cycle
//! - **Fetch Errors**: vehicle data API failures, skip the poll cycle
//! - **Translation Errors**: unknown or malformed resource values, skip the item
//!
//! # Usage
//!
//! ```rust
//! use mercedes_me_exporter::errors::{AppError, AppResult, ConfigError};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::from(ConfigError::missing("VEHICLE_ID")))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for configuration Results
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for token Results
pub type AuthResult<T> = Result<T, AuthError>;

/// Convenience type alias for vehicle data Results
pub type FetchResult<T> = Result<T, FetchError>;
