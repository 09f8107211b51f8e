//! Resource listing for a vehicle
//!
//! The API lists the resources a vehicle exposes as `{name, href, version}`
//! entries. The listing can optionally be cached in a resources file so that
//! it is requested only once.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::errors::{FetchError, FetchResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub name: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ResourceLink {
    /// Absolute URL of the resource value under `base_url`
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if self.href.starts_with('/') {
            format!("{}{}", base, self.href)
        } else {
            format!("{}/{}", base, self.href)
        }
    }
}

/// Read a cached listing; `Ok(None)` when the file does not exist yet
pub async fn read_resources_file(path: &Path) -> FetchResult<Option<Vec<ResourceLink>>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(FetchError::ResourcesFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    let links = serde_json::from_str(&contents).map_err(|e| FetchError::ResourcesFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!("Read resource listing from {}", path.display());
    Ok(Some(links))
}

pub async fn write_resources_file(path: &Path, links: &[ResourceLink]) -> FetchResult<()> {
    let to_error = |message: String| FetchError::ResourcesFile {
        path: path.to_path_buf(),
        message,
    };
    let contents = serde_json::to_string_pretty(links).map_err(|e| to_error(e.to_string()))?;
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| to_error(e.to_string()))?;
    debug!("Wrote {} resources to {}", links.len(), path.display());
    Ok(())
}
