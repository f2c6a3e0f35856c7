//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (loader.rs)
//!     → APP_* environment overrides (loader.rs)
//!     → validation.rs (semantic checks)
//!     → SimulatorConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the server never re-reads it
//! - All fields have defaults to allow minimal (or no) config files
//! - Validation separates syntactic (serde) from semantic checks

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ObservabilityConfig, ProcessingConfig, ServerConfig, SimulatorConfig};
pub use validation::{validate_config, ValidationError};
