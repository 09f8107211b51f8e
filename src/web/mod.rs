//! Web layer module
//!
//! Serves the Prometheus exposition endpoint and a health probe. Handlers
//! only read the shared [`MetricRegistry`]; the poll loop is its only writer.

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ExporterConfig;
use crate::errors::{AppError, AppResult};
use crate::metrics::MetricRegistry;

pub mod handlers;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<MetricRegistry>,
    pub started_at: DateTime<Utc>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics::prometheus_metrics))
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Web server bound to its listening socket
pub struct WebServer {
    app: Router,
    listener: TcpListener,
    addr: SocketAddr,
}

impl WebServer {
    /// Bind the exposition endpoint. Binding happens before the first poll
    /// cycle so a busy port fails startup.
    pub async fn bind(config: &ExporterConfig, metrics: Arc<MetricRegistry>) -> AppResult<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|source| AppError::Bind {
                address: format!("{}:{}", config.host, config.port),
                source,
            })?;
        let addr = listener.local_addr()?;

        let app = create_router(AppState {
            metrics,
            started_at: Utc::now(),
        });

        Ok(Self {
            app,
            listener,
            addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `shutdown` is cancelled, then drain in-flight requests
    pub async fn serve(self, shutdown: CancellationToken) -> AppResult<()> {
        info!("Serving metrics on http://{}/metrics", self.addr);

        let shutdown_signal = async move {
            shutdown.cancelled().await;
            info!("Web server received cancellation signal, shutting down gracefully");
        };

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;
        Ok(())
    }
}
