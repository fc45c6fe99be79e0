//! Domain Router
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum, tower layers)
//!                         │
//!                         ▼
//!                     routing::Dispatcher ◀── ArcSwap ◀── config::watcher
//!                         │  1. domain-constrained routes
//!                         │  2. shared routes
//!                         │  3. domain / global default on "/"
//!                         ▼
//!                     middleware chain (rate_limit, csrf, ...)
//!                         │
//!                         ▼
//!     Client Response ◀── action
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use domain_router::config::{load_config, ConfigWatcher};
use domain_router::lifecycle::signals::shutdown_on_signal;
use domain_router::observability::{logging, metrics};
use domain_router::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "domain-router")]
#[command(about = "Domain-aware HTTP router", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    /// Do not reload the route table when the file changes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("domain-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let (watcher, config_updates) = ConfigWatcher::new(&args.config);
    let _watch_guard = if args.no_watch {
        None
    } else {
        Some(watcher.run()?)
    };

    let shutdown = Shutdown::new();
    shutdown_on_signal(shutdown.clone());

    let server = HttpServer::from_config(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
