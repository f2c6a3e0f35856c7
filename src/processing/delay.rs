//! Simulated downstream latency.
//!
//! Amounts at or below `min_amount_to_wait` complete at once. Larger amounts
//! suspend the caller for `amount` milliseconds, capped at `max_amount_to_wait`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::service::{PaymentService, ServiceError};
use crate::config::ProcessingConfig;
use crate::time::Clock;

/// Stand-in for real payment work; its only effect is wall-clock time.
#[derive(Clone)]
pub struct DelayService {
    min_amount_to_wait: i64,
    max_amount_to_wait: i64,
    clock: Arc<dyn Clock>,
}

impl DelayService {
    pub fn new(config: &ProcessingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_amount_to_wait: config.min_amount_to_wait,
            max_amount_to_wait: config.max_amount_to_wait,
            clock,
        }
    }

    /// Delay applied to `amount`, `None` when it completes immediately.
    pub fn delay_for(&self, amount: i64) -> Option<Duration> {
        if amount <= self.min_amount_to_wait {
            return None;
        }
        let millis = amount.min(self.max_amount_to_wait).max(0);
        Some(Duration::from_millis(millis as u64))
    }
}

impl std::fmt::Debug for DelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayService")
            .field("min_amount_to_wait", &self.min_amount_to_wait)
            .field("max_amount_to_wait", &self.max_amount_to_wait)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PaymentService for DelayService {
    async fn process(&self, amount: i64) -> Result<(), ServiceError> {
        if let Some(delay) = self.delay_for(amount) {
            tracing::trace!(amount, delay_ms = delay.as_millis() as u64, "Simulating processing delay");
            self.clock.sleep(delay).await;
        }
        Ok(())
    }
}
