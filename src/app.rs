//! Process wiring
//!
//! Builds every component from a loaded [`Config`] in startup order and runs
//! the poll loop next to the exposition server. Anything that fails here is
//! fatal; once [`Exporter::run`] starts only a shutdown stops the process.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::auth::{OAuthTokenProvider, TokenProvider};
use crate::config::Config;
use crate::errors::AppResult;
use crate::metrics::MetricRegistry;
use crate::poller::{Poller, PollerOptions};
use crate::utils::build_http_client;
use crate::vehicle::VehicleDataClient;
use crate::web::WebServer;

pub struct Exporter {
    server: WebServer,
    poller: Poller,
    metrics: Arc<MetricRegistry>,
    shutdown: CancellationToken,
}

impl Exporter {
    /// Require a valid token, register the metrics and bind the listener
    pub async fn start(config: &Config) -> AppResult<Self> {
        let client = build_http_client(&config.api)?;
        let tokens = Arc::new(OAuthTokenProvider::new(config, client.clone()));

        tokens.ensure_valid_token().await?;
        info!("Access token is valid");

        let metrics = Arc::new(MetricRegistry::new()?);
        info!("Registered {} vehicle metrics", metrics.len());

        let server = WebServer::bind(&config.exporter, metrics.clone()).await?;

        let fetcher = Arc::new(VehicleDataClient::new(config, client));
        let poller = Poller::new(
            tokens,
            fetcher,
            metrics.clone(),
            PollerOptions::from_config(config),
        );

        Ok(Self {
            server,
            poller,
            metrics,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub fn metrics(&self) -> Arc<MetricRegistry> {
        self.metrics.clone()
    }

    /// Token that stops the poll loop and the server when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve and poll until shutdown; returns the number of poll cycles run
    pub async fn run(self) -> AppResult<u64> {
        let server_handle = tokio::spawn(self.server.serve(self.shutdown.clone()));

        let cycles = self.poller.run(self.shutdown.clone()).await;

        self.shutdown.cancel();
        match server_handle.await {
            Ok(result) => result?,
            Err(e) => error!("Web server task panicked: {}", e),
        }
        Ok(cycles)
    }
}
