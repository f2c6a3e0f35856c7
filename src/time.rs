//! Time source abstraction.
//!
//! # Responsibilities
//! - Provide "sleep for duration" to the delay simulation and the shutdown timer
//! - Allow tests to drive the grace period deterministically
//!
//! # Design Decisions
//! - `SystemClock` delegates to Tokio's timer, so paused Tokio time applies to it
//! - `VirtualClock` only moves when told to; sleepers are counted so a test can
//!   wait until a timer is armed before advancing

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

/// A monotonic clock able to suspend the calling task.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Shared handle, the form the transport and services consume.
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(SystemClock)
    }
}

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Manually advanced clock for tests.
///
/// ```
/// use std::time::Duration;
/// use payment_simulator::time::VirtualClock;
///
/// let clock = VirtualClock::new();
/// clock.advance(Duration::from_secs(1));
/// assert_eq!(clock.elapsed(), Duration::from_secs(1));
/// ```
#[derive(Debug)]
pub struct VirtualClock {
    /// Virtual time since creation.
    now: watch::Sender<Duration>,
    /// Number of tasks currently suspended in `sleep`.
    sleepers: watch::Sender<usize>,
}

impl VirtualClock {
    pub fn new() -> Self {
        let (now, _) = watch::channel(Duration::ZERO);
        let (sleepers, _) = watch::channel(0);
        Self { now, sleepers }
    }

    /// Virtual time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.now.borrow()
    }

    /// Move virtual time forward, waking every sleeper whose deadline passed.
    pub fn advance(&self, by: Duration) {
        self.now.send_modify(|now| *now += by);
    }

    /// Number of tasks currently sleeping on this clock.
    pub fn sleepers(&self) -> usize {
        *self.sleepers.borrow()
    }

    /// Wait until at least `count` tasks are sleeping on this clock.
    pub async fn wait_for_sleepers(&self, count: usize) {
        let mut rx = self.sleepers.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|sleeping| *sleeping >= count).await;
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for VirtualClock {
    async fn sleep(&self, duration: Duration) {
        let mut rx = self.now.subscribe();
        let deadline = *rx.borrow_and_update() + duration;

        self.sleepers.send_modify(|sleeping| *sleeping += 1);
        let _registered = SleeperGuard {
            sleepers: &self.sleepers,
        };

        let _ = rx.wait_for(|now| *now >= deadline).await;
    }
}

/// Deregisters a sleeper even when its future is dropped mid-wait.
struct SleeperGuard<'a> {
    sleepers: &'a watch::Sender<usize>,
}

impl Drop for SleeperGuard<'_> {
    fn drop(&mut self) {
        self.sleepers.send_modify(|sleeping| *sleeping -= 1);
    }
}
