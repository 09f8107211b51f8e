//! HTTP client for the Mercedes me vehicle data API
//!
//! Each cycle lists the vehicle's resources (or reads the cached listing) and
//! then requests every resource value with bounded concurrency.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::catalog::{read_resources_file, write_resources_file, ResourceLink};
use super::{RawResource, RawValue, ResourceFetcher};
use crate::auth::AccessToken;
use crate::config::Config;
use crate::errors::{FetchError, FetchResult};

pub struct VehicleDataClient {
    client: Client,
    base_url: String,
    resources_file: Option<PathBuf>,
    concurrency: usize,
}

impl VehicleDataClient {
    pub fn new(config: &Config, client: Client) -> Self {
        let resources_file = config
            .storage
            .enable_resources_file
            .then(|| config.storage.resources_file.clone());

        Self {
            client,
            base_url: config.api.base_url.clone(),
            resources_file,
            concurrency: config.api.fetch_concurrency.max(1),
        }
    }

    /// Resources the vehicle exposes, from the resources file when enabled
    pub async fn list_resources(
        &self,
        vehicle_id: &str,
        token: &AccessToken,
    ) -> FetchResult<Vec<ResourceLink>> {
        if let Some(path) = &self.resources_file {
            if let Some(links) = read_resources_file(path).await? {
                return Ok(links);
            }
        }

        let url = format!(
            "{}/vehicles/{}/resources",
            self.base_url.trim_end_matches('/'),
            vehicle_id
        );
        debug!("Requesting resource listing from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.value())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let status = response.status();
        if is_auth_failure(status) {
            return Err(FetchError::Unauthorized {
                url,
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let links: Vec<ResourceLink> = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;
        debug!("Vehicle exposes {} resources", links.len());

        if let Some(path) = &self.resources_file {
            if let Err(e) = write_resources_file(path, &links).await {
                warn!("Failed to cache resource listing: {}", e);
            }
        }

        Ok(links)
    }

    /// Current value of one resource
    ///
    /// Missing values and per-resource HTTP errors yield an invalid resource;
    /// only transport failures and rejected tokens fail the whole cycle.
    pub async fn fetch_value(
        &self,
        link: &ResourceLink,
        token: &AccessToken,
    ) -> FetchResult<RawResource> {
        let url = link.url(&self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.value())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let status = response.status();
        if is_auth_failure(status) {
            return Err(FetchError::Unauthorized {
                url,
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT {
            debug!(resource = %link.name, "No value available");
            return Ok(RawResource::invalid(&link.name));
        }
        if !status.is_success() {
            warn!(resource = %link.name, status = status.as_u16(), "Resource request failed");
            return Ok(RawResource::invalid(&link.name));
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(resource = %link.name, error = %e, "Resource response is not JSON");
                return Ok(RawResource::invalid(&link.name));
            }
        };

        Ok(match extract_value(&link.name, &body) {
            Some(value) => RawResource::new(&link.name, value),
            None => {
                debug!(resource = %link.name, "Response carries no value");
                RawResource::invalid(&link.name)
            }
        })
    }
}

#[async_trait]
impl ResourceFetcher for VehicleDataClient {
    async fn fetch_all(
        &self,
        vehicle_id: &str,
        token: &AccessToken,
    ) -> FetchResult<Vec<RawResource>> {
        let links = self.list_resources(vehicle_id, token).await?;

        stream::iter(links)
            .map(|link| async move { self.fetch_value(&link, token).await })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Pull the value for `name` out of a resource response.
///
/// Accepts `{"<name>": {"value": ..., "timestamp": ...}}` and the same object
/// wrapped in a single-element array.
pub fn extract_value(name: &str, body: &serde_json::Value) -> Option<RawValue> {
    let entry = match body {
        serde_json::Value::Array(items) => items.iter().find_map(|item| item.get(name))?,
        other => other.get(name)?,
    };
    RawValue::from_json(entry.get("value")?)
}
