use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::{ConfigError, ConfigResult};

pub mod defaults;

use defaults::*;

/// Flat settings as read from the credentials file and the environment.
///
/// Keys are matched case-insensitively, so `CLIENT_ID=...` in the file and
/// `CLIENT_ID` in the environment both land in `client_id`.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    client_id: Option<String>,
    client_secret: Option<String>,
    vehicle_id: Option<String>,
    enable_resources_file: Option<bool>,
    exporter_addr: Option<String>,
    exporter_port: Option<u16>,
    polling_interval_seconds: Option<u64>,
    token_file: Option<PathBuf>,
    resources_file: Option<PathBuf>,
    api_base_url: Option<String>,
    token_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    fetch_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub exporter: ExporterConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

/// OAuth client credentials and the vehicle to poll
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub client_id: String,
    pub client_secret: String,
    pub vehicle_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    pub host: String,
    pub port: u16,
    pub polling_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token_url: String,
    pub request_timeout_seconds: u64,
    /// Maximum number of resource values requested in parallel
    pub fetch_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub token_file: PathBuf,
    pub resources_file: PathBuf,
    /// Cache the vehicle's resource listing on disk instead of asking the API every cycle
    pub enable_resources_file: bool,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("vehicle_id", &self.vehicle_id)
            .finish()
    }
}

impl Config {
    /// Load configuration from the file named by `CONFIG_FILE`, falling back
    /// to the default credentials file, with the environment layered on top.
    pub fn load() -> ConfigResult<Self> {
        let config_file = std::env::var("CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CREDENTIALS_FILE.to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> ConfigResult<Self> {
        Self::load_from_sources(config_file.as_ref(), None)
    }

    /// Load configuration from `config_file` and an environment snapshot.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// independent of the variables set on the machine running them.
    pub fn load_from_sources(
        config_file: &Path,
        env: Option<HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        if config_file.is_file() {
            info!("Reading credentials from {}", config_file.display());
        } else {
            warn!(
                "Credential file {} not found, using environment vars instead",
                config_file.display()
            );
        }

        let environment = ::config::Environment::default()
            .source(env.map(|vars| vars.into_iter().collect::<::config::Map<_, _>>()));

        let raw: RawSettings = ::config::Config::builder()
            .add_source(LowercaseKeys(
                ::config::File::from(config_file)
                    .format(::config::FileFormat::Ini)
                    .required(false),
            ))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> ConfigResult<Self> {
        let client_id = required(raw.client_id, CONF_CLIENT_ID)?;
        let client_secret = required(raw.client_secret, CONF_CLIENT_SECRET)?;
        let vehicle_id = required(raw.vehicle_id, CONF_VEHICLE_ID)?;

        let polling_interval_seconds = raw
            .polling_interval_seconds
            .unwrap_or(DEFAULT_POLLING_INTERVAL_SECONDS);
        if polling_interval_seconds == 0 {
            return Err(ConfigError::invalid(
                CONF_POLLING_INTERVAL,
                "must be at least 1 second",
            ));
        }

        let fetch_concurrency = raw.fetch_concurrency.unwrap_or(DEFAULT_FETCH_CONCURRENCY);
        if fetch_concurrency == 0 {
            return Err(ConfigError::invalid(
                CONF_FETCH_CONCURRENCY,
                "must be at least 1",
            ));
        }

        let request_timeout_seconds = raw
            .request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
        if request_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                CONF_REQUEST_TIMEOUT,
                "must be at least 1 second",
            ));
        }

        Ok(Self {
            credentials: CredentialsConfig {
                client_id,
                client_secret,
                vehicle_id,
            },
            exporter: ExporterConfig {
                host: optional(raw.exporter_addr).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.exporter_port.unwrap_or(DEFAULT_PORT),
                polling_interval_seconds,
            },
            api: ApiConfig {
                base_url: optional(raw.api_base_url)
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                token_url: optional(raw.token_url).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
                request_timeout_seconds,
                fetch_concurrency,
            },
            storage: StorageConfig {
                token_file: raw
                    .token_file
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
                resources_file: raw
                    .resources_file
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCES_FILE)),
                enable_resources_file: raw
                    .enable_resources_file
                    .unwrap_or(DEFAULT_ENABLE_RESOURCES_FILE),
            },
        })
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.exporter.polling_interval_seconds)
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Source adapter that lowercases every key of the wrapped source.
///
/// The INI format keeps keys as written while `Environment` lowercases them;
/// both layers must land on the same field names.
#[derive(Debug, Clone)]
struct LowercaseKeys<S>(S);

impl<S> ::config::Source for LowercaseKeys<S>
where
    S: ::config::Source + Clone + Send + Sync + 'static,
{
    fn clone_into_box(&self) -> Box<dyn ::config::Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<::config::Map<String, ::config::Value>, ::config::ConfigError> {
        Ok(self
            .0
            .collect()?
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect())
    }
}

/// Strip whitespace and the quotes dotenv-style files put around values
fn clean_value(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| clean_value(&v).to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> ConfigResult<String> {
    optional(value).ok_or_else(|| ConfigError::missing(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn missing_file() -> PathBuf {
        PathBuf::from("/nonexistent/.mercedesme_credentials")
    }

    #[test]
    fn test_load_from_environment_only() {
        let config = Config::load_from_sources(
            &missing_file(),
            Some(env(&[
                ("CLIENT_ID", "client"),
                ("CLIENT_SECRET", "secret"),
                ("VEHICLE_ID", "WDD1234567890"),
            ])),
        )
        .unwrap();

        assert_eq!(config.credentials.client_id, "client");
        assert_eq!(config.credentials.vehicle_id, "WDD1234567890");
        assert_eq!(config.exporter.host, DEFAULT_HOST);
        assert_eq!(config.exporter.port, DEFAULT_PORT);
        assert_eq!(config.polling_interval(), Duration::from_secs(5));
        assert!(!config.storage.enable_resources_file);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_vehicle_id_is_rejected() {
        let err = Config::load_from_sources(
            &missing_file(),
            Some(env(&[("CLIENT_ID", "client"), ("CLIENT_SECRET", "secret")])),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "VEHICLE_ID"));
    }

    #[test]
    fn test_empty_client_secret_is_rejected() {
        let err = Config::load_from_sources(
            &missing_file(),
            Some(env(&[
                ("CLIENT_ID", "client"),
                ("CLIENT_SECRET", "  "),
                ("VEHICLE_ID", "WDD1234567890"),
            ])),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "CLIENT_SECRET"));
    }

    #[test]
    fn test_credentials_file_with_environment_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CLIENT_ID=\"file-client\"").unwrap();
        writeln!(file, "CLIENT_SECRET=file-secret").unwrap();
        writeln!(file, "VEHICLE_ID=WDD0000000001").unwrap();
        writeln!(file, "ENABLE_RESOURCES_FILE=true").unwrap();

        let config = Config::load_from_sources(
            file.path(),
            Some(env(&[
                ("VEHICLE_ID", "WDD0000000002"),
                ("EXPORTER_PORT", "9100"),
                ("POLLING_INTERVAL_SECONDS", "60"),
            ])),
        )
        .unwrap();

        assert_eq!(config.credentials.client_id, "file-client");
        assert_eq!(config.credentials.client_secret, "file-secret");
        assert_eq!(config.credentials.vehicle_id, "WDD0000000002");
        assert!(config.storage.enable_resources_file);
        assert_eq!(config.exporter.port, 9100);
        assert_eq!(config.polling_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_credentials_file_alone() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CLIENT_ID = abc").unwrap();
        writeln!(file, "CLIENT_SECRET='s3cr;et'").unwrap();
        writeln!(file, "VEHICLE_ID=WDD1").unwrap();
        writeln!(file, "ENABLE_RESOURCES_FILE=true").unwrap();
        writeln!(file, "EXPORTER_PORT=9101").unwrap();

        let config = Config::load_from_sources(file.path(), Some(HashMap::new())).unwrap();

        assert_eq!(config.credentials.client_id, "abc");
        assert_eq!(config.credentials.client_secret, "s3cr;et");
        assert_eq!(config.credentials.vehicle_id, "WDD1");
        assert!(config.storage.enable_resources_file);
        assert_eq!(config.exporter.port, 9101);
    }

    #[test]
    fn test_zero_polling_interval_is_rejected() {
        let err = Config::load_from_sources(
            &missing_file(),
            Some(env(&[
                ("CLIENT_ID", "client"),
                ("CLIENT_SECRET", "secret"),
                ("VEHICLE_ID", "WDD1234567890"),
                ("POLLING_INTERVAL_SECONDS", "0"),
            ])),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = CredentialsConfig {
            client_id: "client".to_string(),
            client_secret: "hunter2".to_string(),
            vehicle_id: "WDD1234567890".to_string(),
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("  \"quoted\" "), "quoted");
        assert_eq!(clean_value("'single'"), "single");
        assert_eq!(clean_value("plain"), "plain");
        assert_eq!(clean_value("\""), "\"");
    }
}
