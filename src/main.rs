//! Script Router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request     ┌─────────┐    ┌──────────┐    ┌────────────┐    ┌──────────┐
//!     ──────────────────▶│  http   │───▶│ dispatch │───▶│   filter   │───▶│ routing  │
//!                        │ server  │    │  WebApp  │    │   chain    │    │ registry │
//!                        └─────────┘    └────┬─────┘    └────────────┘    └────┬─────┘
//!                                            │                                 │
//!     Client Response    ┌─────────┐    ┌────▼─────┐                           │
//!     ◀──────────────────│ render  │◀───│ Outcome  │◀──────── handler ◀────────┘
//!                        └─────────┘    └──────────┘
//!
//!     Cross-cutting: config · observability (tracing, metrics) · lifecycle (signals, shutdown)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use script_router::config::{load_config, AppConfig};
use script_router::http::HttpServer;
use script_router::lifecycle::{spawn_signal_listener, Shutdown};
use script_router::observability::{init_logging, init_metrics};
use script_router::WebApp;

#[derive(Parser)]
#[command(name = "script-router")]
#[command(about = "Serve the routes and filters declared in a config file", long_about = None)]
struct Args {
    /// Path to the TOML config file; defaults apply when omitted.
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
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!("script-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        routes = config.routes.len(),
        filters = config.filters.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = Arc::new(WebApp::from_config(&config)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    HttpServer::new(app, &config).run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
