//! Error type definitions for the Mercedes me exporter
//!
//! Errors are split by the scope in which they are contained:
//! configuration errors stop the process at startup, authentication and
//! fetch errors abort a single poll cycle, and translation errors skip a
//! single resource within a cycle.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
///
/// Only startup code returns this; the poll loop contains every
/// recoverable error before it reaches this level.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Token acquisition errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Metric registration or encoding errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// The exposition listener could not bind
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Listener I/O errors while serving
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration errors, fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting is absent or empty
    #[error("No {field} found in the configuration")]
    MissingField { field: String },

    /// A setting is present but unusable
    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },

    /// The layered configuration could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Token acquisition errors, contained to one poll cycle
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token file exists yet
    #[error("Token file {} not found", path.display())]
    MissingToken { path: PathBuf },

    /// The token file exists but cannot be parsed
    #[error("Token file {} is invalid: {message}", path.display())]
    InvalidTokenFile { path: PathBuf, message: String },

    /// The stored token carries no refresh token
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The token endpoint could not be reached
    #[error("Token refresh request failed: {message}")]
    RefreshFailed { message: String },

    /// The token endpoint answered with a non-success status
    #[error("Token refresh rejected: {status} - {message}")]
    Rejected { status: u16, message: String },
}

/// Vehicle data API errors, contained to one poll cycle
#[derive(Error, Debug)]
pub enum FetchError {
    /// Request timed out
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Connection or protocol failure
    #[error("Transport error: {url} - {message}")]
    Transport { url: String, message: String },

    /// The API refused the access token
    #[error("Unauthorized: {status} from {url}")]
    Unauthorized { url: String, status: u16 },

    /// Non-success status on the resource listing
    #[error("HTTP error: {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body did not have the expected shape
    #[error("Decode error: {url} - {message}")]
    Decode { url: String, message: String },

    /// Cached resource listing could not be read or written
    #[error("Resources file {}: {message}", path.display())]
    ResourcesFile { path: PathBuf, message: String },
}

/// Per-resource translation errors, contained to one item
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// The resource name has no registered metric
    #[error("Unknown resource: {resource}")]
    UnknownResource { resource: String },

    /// A binary resource carried something other than "true"/"false"
    #[error("Invalid state for {resource}: {value:?}")]
    InvalidState { resource: String, value: String },

    /// A numeric resource carried an unparsable value
    #[error("Invalid number for {resource}: {value:?}")]
    InvalidNumber { resource: String, value: String },

    /// The translated value does not fit the registered metric
    #[error("Metric kind mismatch for {resource}")]
    KindMismatch { resource: String },
}

impl ConfigError {
    /// Create a missing field error
    pub fn missing<S: Into<String>>(field: S) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Classify a reqwest error for the given URL
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_decode() {
            Self::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Whether the failure means the access token is no longer accepted
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl TranslationError {
    /// Short label used for the translation error counter
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownResource { .. } => "unknown_resource",
            Self::InvalidState { .. } => "invalid_state",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::KindMismatch { .. } => "kind_mismatch",
        }
    }

    /// Name of the resource the error refers to
    pub fn resource(&self) -> &str {
        match self {
            Self::UnknownResource { resource }
            | Self::InvalidState { resource, .. }
            | Self::InvalidNumber { resource, .. }
            | Self::KindMismatch { resource } => resource,
        }
    }
}
