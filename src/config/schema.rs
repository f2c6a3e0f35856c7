//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the simulator.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// TCP endpoint and shutdown behaviour.
    pub server: ServerConfig,

    /// Thresholds of the simulated processing delay.
    pub processing: ProcessingConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener and connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or IP to bind.
    pub host: String,

    /// TCP port; 0 picks an ephemeral port.
    pub port: u16,

    /// How long in-flight requests may keep running after shutdown begins.
    #[serde(with = "crate::config::duration")]
    pub graceful_shutdown_timeout: Duration,

    /// Longest accepted frame in bytes, terminator excluded.
    pub max_line_length: usize,
}

impl ServerConfig {
    /// `host:port` as handed to the resolver.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 11111,
            graceful_shutdown_timeout: Duration::from_secs(3),
            max_line_length: 64 * 1024,
        }
    }
}

/// Processing delay thresholds, in amount units (one unit = one millisecond).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Amounts at or below this complete immediately.
    pub min_amount_to_wait: i64,

    /// Upper bound of the simulated delay.
    pub max_amount_to_wait: i64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            min_amount_to_wait: 100,
            max_amount_to_wait: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Force debug-level logging.
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
