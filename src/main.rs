//! Routing facade server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::handlers ──▶ Dispatcher
//!                     (request id,      (RouteQuery)        │
//!                      timeout, limit)                      ▼
//!                                                   ProviderAdapter ──▶ UpstreamClient ──▶ Provider
//!                                                           │
//!                                                           ▼
//!     Client Response                               RouteResult ──▶ ResponseFormatter
//!     ◀──────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use route_facade::config::{self, FacadeConfig};
use route_facade::lifecycle::{signals, Shutdown};
use route_facade::observability::{logging, metrics};
use route_facade::HttpServer;

#[derive(Parser)]
#[command(name = "route-facade")]
#[command(about = "HTTP facade over third-party route planners", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => FacadeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    config::check_config(&config)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "route-facade starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        yours = config.providers.yours.enabled,
        ecan = config.providers.ecan.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
