//! Payment processor simulator.
//!
//! # Architecture Overview
//!
//! ```text
//!     PAYMENT|<amount>\n   ┌──────────────────────────────────────────────┐
//!     ─────────────────────┼─▶ net::listener ─▶ net::transport            │
//!                          │                      │ one task per conn     │
//!                          │                      ▼                       │
//!                          │                 net::handler ─▶ protocol     │
//!                          │                      │                       │
//!                          │                      ▼                       │
//!                          │       processing (validation ─▶ delay)       │
//!     RESPONSE|..|..\n     │                      │                       │
//!     ◀────────────────────┼──────────────────────┘                       │
//!                          │  config · lifecycle · observability · time   │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use payment_simulator::config::load_config;
use payment_simulator::lifecycle::{self, signals};
use payment_simulator::observability::{logging, metrics};
use payment_simulator::Error;

#[derive(Parser)]
#[command(name = "payment-simulator")]
#[command(about = "Simulated downstream payment processor over a line-based TCP protocol", long_about = None)]
struct Cli {
    /// TOML configuration file; APP_* environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override server.host.
    #[arg(long)]
    host: Option<String>,

    /// Override server.port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).map_err(Error::from)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.server.bind_address(),
        graceful_shutdown_timeout = ?config.server.graceful_shutdown_timeout,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| Error::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr).map_err(Error::from)?;
    }

    let shutdown = signals::shutdown_token().map_err(Error::Signals)?;

    if let Err(e) = lifecycle::run(config, shutdown).await {
        tracing::error!(error = %e, "Run failed");
        return Err(Error::from(e).into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
