//! Shared HTTP client
//!
//! One `reqwest::Client` is built at startup and cloned into the token
//! provider and the vehicle data client, so both share a connection pool.

use reqwest::Client;
use tracing::debug;

use crate::config::ApiConfig;
use crate::errors::AppResult;

pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

pub fn build_http_client(config: &ApiConfig) -> AppResult<Client> {
    let timeout = config.request_timeout();
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent())
        .build()?;

    debug!(
        timeout_seconds = config.request_timeout_seconds,
        "Created HTTP client"
    );
    Ok(client)
}
