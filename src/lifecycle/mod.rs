//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build processing chain → Bind transport → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Grace period → Stop processing → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Cancel the process-wide shutdown token
//! ```
//!
//! # Design Decisions
//! - Fail fast: a bind failure is fatal and returned to `main`
//! - Shutdown phases are one-shot and sticky; late observers see them immediately
//! - Shutdown is bounded by the grace period plus at most one in-flight call

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::run;
