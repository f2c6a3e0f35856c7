//! Amount validation in front of another service.

use async_trait::async_trait;

use super::service::{PaymentService, ServiceError};

/// Rejects negative amounts before delegating to the inner service.
#[derive(Debug, Clone)]
pub struct ValidationService<S> {
    inner: S,
}

impl<S> ValidationService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: PaymentService> PaymentService for ValidationService<S> {
    async fn process(&self, amount: i64) -> Result<(), ServiceError> {
        if amount < 0 {
            tracing::debug!(amount, "Rejecting negative amount");
            return Err(ServiceError::InvalidAmount);
        }

        self.inner.process(amount).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts how often it is called.
    #[derive(Clone, Default)]
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PaymentService for Counting {
        async fn process(&self, _amount: i64) -> Result<(), ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn negative_amount_never_reaches_inner() {
        let inner = Counting::default();
        let service = ValidationService::new(inner.clone());

        assert_eq!(service.process(-1).await, Err(ServiceError::InvalidAmount));
        assert_eq!(service.process(i64::MIN).await, Err(ServiceError::InvalidAmount));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_amount_is_delegated() {
        let inner = Counting::default();
        let service = ValidationService::new(inner.clone());

        assert_eq!(service.process(0).await, Ok(()));
        assert_eq!(service.process(1).await, Ok(()));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
