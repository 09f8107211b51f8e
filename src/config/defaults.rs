//! Configuration default values
//!
//! This module contains all the default values for configuration options,
//! making them easily changeable in one central location.

// Files
pub const DEFAULT_CREDENTIALS_FILE: &str = ".mercedesme_credentials";
pub const DEFAULT_TOKEN_FILE: &str = ".mercedesme_token";
pub const DEFAULT_RESOURCES_FILE: &str = ".mercedesme_resources";
pub const DEFAULT_ENABLE_RESOURCES_FILE: bool = false;

// Exporter listener defaults
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_POLLING_INTERVAL_SECONDS: u64 = 5;

// Mercedes me API defaults
pub const DEFAULT_API_BASE_URL: &str = "https://api.mercedes-benz.com/vehicledata/v2";
pub const DEFAULT_TOKEN_URL: &str = "https://id.mercedes-benz.com/as/token.oauth2";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

// Setting keys, as they appear in the credentials file and the environment
pub const CONF_CLIENT_ID: &str = "CLIENT_ID";
pub const CONF_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const CONF_VEHICLE_ID: &str = "VEHICLE_ID";
pub const CONF_POLLING_INTERVAL: &str = "POLLING_INTERVAL_SECONDS";
pub const CONF_FETCH_CONCURRENCY: &str = "FETCH_CONCURRENCY";
pub const CONF_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECONDS";
