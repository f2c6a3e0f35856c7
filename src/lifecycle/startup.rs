//! Startup orchestration.
//!
//! # Responsibilities
//! - Compose the processing chain from configuration
//! - Bind the transport and serve until shutdown
//!
//! # Design Decisions
//! - Subsystems initialize in order, not concurrently
//! - The listener binds last (traffic only when ready)

use tokio_util::sync::CancellationToken;

use crate::config::SimulatorConfig;
use crate::net::{Transport, TransportError};
use crate::processing;
use crate::time::SystemClock;

/// Run the simulator until `shutdown` is cancelled and the drain completes.
pub async fn run(config: SimulatorConfig, shutdown: CancellationToken) -> Result<(), TransportError> {
    let clock = SystemClock::shared();
    let service = processing::build_service(&config.processing, clock.clone());

    tracing::debug!(
        min_amount_to_wait = config.processing.min_amount_to_wait,
        max_amount_to_wait = config.processing.max_amount_to_wait,
        "Processing chain ready"
    );

    Transport::new(config.server, service, clock).start(shutdown).await
}
