//! File-backed OAuth2 token provider
//!
//! Keeps the current token in memory, refreshes it with the refresh-token
//! grant shortly before it expires and writes every refreshed token back to
//! the token file.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{AccessToken, StoredToken, TokenProvider};
use crate::config::Config;
use crate::errors::{AuthError, AuthResult};

pub struct OAuthTokenProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    token_file: PathBuf,
    // Held across the refresh request so concurrent callers never refresh twice
    current: Mutex<Option<StoredToken>>,
}

impl OAuthTokenProvider {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            token_url: config.api.token_url.clone(),
            client_id: config.credentials.client_id.clone(),
            client_secret: config.credentials.client_secret.clone(),
            token_file: config.storage.token_file.clone(),
            current: Mutex::new(None),
        }
    }

    /// Return the cached token, reading the token file on first use
    async fn current_token(&self, slot: &mut Option<StoredToken>) -> AuthResult<StoredToken> {
        match slot {
            Some(token) => Ok(token.clone()),
            None => {
                let token = StoredToken::load(&self.token_file).await?;
                *slot = Some(token.clone());
                Ok(token)
            }
        }
    }

    /// Refresh `current`, persist the result and store it in `slot`
    async fn refresh_into(
        &self,
        slot: &mut Option<StoredToken>,
        current: &StoredToken,
    ) -> AuthResult<StoredToken> {
        let refreshed = self.request_refresh(current).await?;

        if let Err(e) = refreshed.save(&self.token_file).await {
            // The in-memory token is still good until the process restarts
            warn!(
                "Failed to persist refreshed token to {}: {}",
                self.token_file.display(),
                e
            );
        }

        *slot = Some(refreshed.clone());
        Ok(refreshed)
    }

    async fn request_refresh(&self, current: &StoredToken) -> AuthResult<StoredToken> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;

        debug!("Requesting token refresh from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let mut refreshed: StoredToken =
            response.json().await.map_err(|e| AuthError::RefreshFailed {
                message: format!("invalid token response: {}", e),
            })?;

        // The endpoint may omit the refresh token when it is unchanged
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = current.refresh_token.clone();
        }

        let refreshed = refreshed.stamped(Utc::now());
        info!("Access token refreshed, valid until {}", refreshed.expires_at());
        Ok(refreshed)
    }
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn ensure_valid_token(&self) -> AuthResult<AccessToken> {
        let mut slot = self.current.lock().await;
        let current = self.current_token(&mut slot).await?;

        let token = current.to_access_token();
        if token.is_valid_at(Utc::now()) {
            return Ok(token);
        }

        debug!("Access token expired or about to expire, refreshing");
        let refreshed = self.refresh_into(&mut slot, &current).await?;
        Ok(refreshed.to_access_token())
    }

    async fn refresh(&self) -> bool {
        let mut slot = self.current.lock().await;
        let current = match self.current_token(&mut slot).await {
            Ok(token) => token,
            Err(e) => {
                error!("Error refreshing token: {}", e);
                return false;
            }
        };

        match self.refresh_into(&mut slot, &current).await {
            Ok(_) => true,
            Err(e) => {
                error!("Error refreshing token: {}", e);
                false
            }
        }
    }
}
