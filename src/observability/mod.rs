//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → stderr/stdout subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Connection ID and peer address ride on a span around each handler
//! - Metric updates are fire-and-forget; without an exporter they are no-ops

pub mod logging;
pub mod metrics;
