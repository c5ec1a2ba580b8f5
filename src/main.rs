//! Static site dev server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────┐
//!                        │                  SERVER                     │
//!                        │                                             │
//!   Client Request       │  ┌─────────┐   ┌────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│ logging │──▶│ shield │──▶│  vendor   │  │
//!                        │  │ timing  │   │ filter │   │  proxy    │  │
//!                        │  │ headers │   └───┬────┘   └─────┬─────┘  │
//!                        │  └─────────┘      404/429      hit/fetch   │
//!                        │                                  │         │
//!                        │              ┌───────────────────┴──────┐  │
//!   Client Response      │              │ reload routes (/sse)     │  │
//!   ◀────────────────────┼──────────────│ static file fallback     │  │
//!                        │              └──────────────────────────┘  │
//!                        │                                             │
//!                        │  ┌────────────────────────────────────────┐ │
//!                        │  │          Cross-Cutting Concerns         │ │
//!                        │  │  config · file watcher · metrics ·      │ │
//!                        │  │  graceful shutdown                      │ │
//!                        │  └────────────────────────────────────────┘ │
//!                        └────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitekit::config::loader::load_config;
use sitekit::config::ServerConfig;
use sitekit::http::HttpServer;
use sitekit::lifecycle::Shutdown;
use sitekit::observability::metrics;

#[derive(Parser)]
#[command(name = "sitekit")]
#[command(about = "Static site server with live reload and vendor asset caching", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitekit=debug,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        dev = config.dev,
        static_dir = %config.static_dir,
        vendor_assets = config.vendor.assets.len(),
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
