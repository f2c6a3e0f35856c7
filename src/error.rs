//! Crate-level error for process startup.

use thiserror::Error;

use crate::config::ConfigError;
use crate::net::TransportError;

/// Anything that stops the simulator from starting or running.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
