//! Hotlink-bypassing forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌───────────────────────────────────────────────┐
//!     ?url=..&ref=..        │                 HOTLINK PROXY                 │
//!     ──────────────────────┼─▶ http server ──▶ forward::target             │
//!                           │   (request id,     (target, referer, origin)  │
//!                           │    trace span)            │                   │
//!                           │                           ▼                   │
//!                           │                   forward::client ────────────┼──▶ Upstream
//!                           │                   UA/Referer/Origin/Range     │
//!     Client Response       │                           │                   │
//!     ◀─────────────────────┼── forward::relay ◀────────┘ ◀─────────────────┼─── status,
//!     status/headers/stream │   (header policy, body stream)                │    headers, body
//!                           └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use hotlink_proxy::config::load_config;
use hotlink_proxy::observability::{logging, metrics};
use hotlink_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "hotlink-proxy", version, about = "Forwarding proxy with spoofed referer headers")]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("hotlink-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.socket_addr(),
        endpoints = config.endpoints.len(),
        config_file = ?cli.config,
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

    let listener = TcpListener::bind(config.listener.socket_addr()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    tracing::debug!(
        user_agent = %server.config().upstream.user_agent,
        max_redirects = server.config().upstream.max_redirects,
        "Upstream client ready"
    );
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
