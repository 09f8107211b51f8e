use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mercedes_me_exporter::{app::Exporter, config::Config, errors::AppResult};

#[derive(Parser)]
#[command(name = "mercedes-me-exporter")]
#[command(version)]
#[command(about = "Prometheus exporter for Mercedes me vehicle telemetry")]
#[command(long_about = None)]
struct Cli {
    /// Credentials file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listening address
    #[arg(short = 'l', long, value_name = "ADDR")]
    address: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("mercedes_me_exporter={},tower_http=trace", cli.log_level)
    } else {
        format!("mercedes_me_exporter={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mercedes me exporter v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Mercedes me exporter stopped");
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    if let Some(address) = cli.address {
        config.exporter.host = address;
    }
    if let Some(port) = cli.port {
        config.exporter.port = port;
    }

    let exporter = Exporter::start(&config).await?;
    tokio::spawn(wait_for_signal(exporter.shutdown_token()));

    exporter.run().await?;
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received Ctrl+C, shutting down gracefully");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down gracefully");
        }
    }

    shutdown.cancel();
}
