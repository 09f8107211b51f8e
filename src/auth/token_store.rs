//! On-disk OAuth token
//!
//! The token file holds the token endpoint's JSON response, stamped with an
//! absolute `expires_at` so expiry survives process restarts.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::AccessToken;
use crate::errors::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Lifetime in seconds, as returned by the token endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Absolute expiry as a unix timestamp in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl StoredToken {
    /// Read the token file at `path`
    pub async fn load(path: &Path) -> AuthResult<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::MissingToken {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(AuthError::InvalidTokenFile {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        let token: Self =
            serde_json::from_str(&contents).map_err(|e| AuthError::InvalidTokenFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!("Loaded token from {}", path.display());
        Ok(token)
    }

    /// Write the token to `path`, replacing the previous file atomically
    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!("Saved token to {}", path.display());
        Ok(())
    }

    /// Fill in `expires_at` from `expires_in`, counting from `now`
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        if let Some(expires_in) = self.expires_in {
            self.expires_at = Some(now.timestamp() + expires_in);
        }
        self
    }

    /// Expiry instant; unknown expiry is treated as already expired
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn to_access_token(&self) -> AccessToken {
        AccessToken::new(self.access_token.clone(), self.expires_at())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoredToken::load(&dir.path().join(".mercedesme_token"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingToken { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mercedesme_token");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = StoredToken::load(&path).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidTokenFile { .. }));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mercedesme_token");
        let token = StoredToken {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(3600),
            expires_at: Some(1_700_003_600),
        };

        token.save(&path).await.unwrap();
        assert_eq!(StoredToken::load(&path).await.unwrap(), token);
    }

    #[test]
    fn test_stamped_and_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = StoredToken {
            access_token: "access".to_string(),
            refresh_token: None,
            token_type: None,
            expires_in: Some(3600),
            expires_at: None,
        };
        assert_eq!(token.expires_at(), DateTime::<Utc>::UNIX_EPOCH);

        let stamped = token.stamped(now);
        assert_eq!(stamped.expires_at, Some(1_700_003_600));
        assert_eq!(stamped.to_access_token().expires_at().timestamp(), 1_700_003_600);
    }
}
