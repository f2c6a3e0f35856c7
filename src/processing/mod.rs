//! Payment processing subsystem.
//!
//! # Data Flow
//! ```text
//! amount
//!     → validation.rs (reject negative amounts)
//!     → delay.rs (simulated downstream latency)
//!     → Ok(()) | ServiceError
//! ```
//!
//! # Design Decisions
//! - Services are stateless past their immutable thresholds and are shared via `Arc`
//! - The chain is built from the `PaymentService` trait so tests can swap any link

pub mod delay;
pub mod service;
pub mod validation;

use std::sync::Arc;

pub use delay::DelayService;
pub use service::{PaymentService, ServiceError};
pub use validation::ValidationService;

use crate::config::ProcessingConfig;
use crate::time::Clock;

/// Build the production chain: validation in front of the delay simulation.
pub fn build_service(config: &ProcessingConfig, clock: Arc<dyn Clock>) -> Arc<dyn PaymentService> {
    Arc::new(ValidationService::new(DelayService::new(config, clock)))
}
