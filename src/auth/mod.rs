//! Access token handling
//!
//! The poll loop only ever asks a [`TokenProvider`] for "a currently valid
//! token". Expiry tracking, refresh and persistence live behind that trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::errors::AuthResult;

pub mod oauth;
pub mod token_store;

pub use oauth::OAuthTokenProvider;
pub use token_store::StoredToken;

/// Tokens this close to expiry are refreshed before use
pub const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Supplies bearer tokens for the vehicle data API
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token that is valid right now, refreshing it first if needed
    async fn ensure_valid_token(&self) -> AuthResult<AccessToken>;

    /// Force a refresh; returns whether a new token was obtained
    async fn refresh(&self) -> bool;
}

/// Bearer token handed to the resource fetcher
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new<S: Into<String>>(value: S, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is still usable at `now`, leaving `EXPIRY_SKEW_SECONDS` of margin
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && self.expires_at - Duration::seconds(EXPIRY_SKEW_SECONDS) > now
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
