//! Processing contract shared by every link of the chain.

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a payment service.
///
/// The `Display` text is what ends up (capitalized) in the rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid amount")]
    InvalidAmount,

    /// Failure reported by a downstream service, message kept verbatim.
    #[error("{0}")]
    Downstream(String),
}

/// Processes a payment amount.
#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn process(&self, amount: i64) -> Result<(), ServiceError>;
}
