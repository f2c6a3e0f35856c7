//! Payment processor simulator.
//!
//! Serves a newline-delimited `PAYMENT|<amount>` protocol over TCP, answers
//! every frame with `RESPONSE|<STATUS>|<Reason>`, and shuts down in two
//! phases: stop accepting at once, then cancel whatever is still running
//! once the grace period has elapsed.

// Core subsystems
pub mod config;
pub mod net;
pub mod processing;
pub mod protocol;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod time;

pub use config::SimulatorConfig;
pub use error::{Error, Result};
pub use lifecycle::Shutdown;
pub use net::{Transport, TransportState};
pub use processing::{PaymentService, ServiceError};
pub use protocol::{PaymentRequest, Response, Status};
