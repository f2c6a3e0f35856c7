//! Two-phase shutdown signal.

use tokio_util::sync::CancellationToken;

/// Coordinator for graceful shutdown.
///
/// Holds one token per phase. Each phase fires at most once and stays fired;
/// tasks waiting on it, now or later, resolve immediately after that.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    /// Listener must close; no new connections.
    accepting: CancellationToken,
    /// Grace period over; in-flight requests are answered with `Cancelled`.
    processing: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token observed by the accept loop.
    pub fn accepting_token(&self) -> CancellationToken {
        self.accepting.clone()
    }

    /// Token observed by connection handlers.
    pub fn processing_token(&self) -> CancellationToken {
        self.processing.clone()
    }

    /// Enter the stop-accepting phase.
    pub fn stop_accepting(&self) {
        self.accepting.cancel();
    }

    /// Enter the stop-processing phase. Implies stop-accepting.
    pub fn stop_processing(&self) {
        self.accepting.cancel();
        self.processing.cancel();
    }

    pub fn is_accepting_stopped(&self) -> bool {
        self.accepting.is_cancelled()
    }

    pub fn is_processing_stopped(&self) -> bool {
        self.processing.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_fire_independently() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_accepting_stopped());
        assert!(!shutdown.is_processing_stopped());

        shutdown.stop_accepting();
        assert!(shutdown.is_accepting_stopped());
        assert!(!shutdown.is_processing_stopped());

        shutdown.stop_processing();
        assert!(shutdown.is_processing_stopped());
    }

    #[test]
    fn stop_processing_implies_stop_accepting() {
        let shutdown = Shutdown::new();
        shutdown.stop_processing();
        assert!(shutdown.is_accepting_stopped());
    }

    #[tokio::test]
    async fn late_subscriber_sees_signal() {
        let shutdown = Shutdown::new();
        shutdown.stop_processing();

        // Token handed out after the broadcast is already cancelled.
        let token = shutdown.processing_token();
        token.cancelled().await;

        // Firing again is a no-op.
        shutdown.stop_processing();
        assert!(token.is_cancelled());
    }
}
