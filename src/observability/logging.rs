//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber once at startup
//! - Pick the filter from `RUST_LOG`, falling back to configuration
//!
//! # Design Decisions
//! - `RUST_LOG` always wins so operators can raise verbosity without a config change
//! - `debug = true` (or `APP_INIT_DEBUG`) is shorthand for the debug level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directive derived from configuration alone.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    let level = if config.debug {
        "debug"
    } else {
        config.log_level.as_str()
    };
    format!("payment_simulator={level},warn")
}

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_ok() && config.debug {
        tracing::debug!("Initializing debug level logging");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_overrides_level() {
        let mut config = ObservabilityConfig::default();
        assert_eq!(default_directive(&config), "payment_simulator=info,warn");

        config.debug = true;
        config.log_level = "error".into();
        assert_eq!(default_directive(&config), "payment_simulator=debug,warn");
    }
}
