//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds non-negative and ordered)
//! - Check addresses that are only parsed later (metrics endpoint)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SimulatorConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SimulatorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("server.max_line_length must be greater than zero")]
    ZeroLineLength,

    #[error("processing.{field} must not be negative (got {value})")]
    NegativeThreshold { field: &'static str, value: i64 },

    #[error("processing.min_amount_to_wait ({min}) exceeds max_amount_to_wait ({max})")]
    ThresholdOrder { min: i64, max: i64 },

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check the whole configuration, collecting every error found.
pub fn validate_config(config: &SimulatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.server.max_line_length == 0 {
        errors.push(ValidationError::ZeroLineLength);
    }

    let processing = &config.processing;
    for (field, value) in [
        ("min_amount_to_wait", processing.min_amount_to_wait),
        ("max_amount_to_wait", processing.max_amount_to_wait),
    ] {
        if value < 0 {
            errors.push(ValidationError::NegativeThreshold { field, value });
        }
    }
    if processing.min_amount_to_wait > processing.max_amount_to_wait {
        errors.push(ValidationError::ThresholdOrder {
            min: processing.min_amount_to_wait,
            max: processing.max_amount_to_wait,
        });
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
