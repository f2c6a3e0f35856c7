//! Connection identity and outstanding-work tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count live connection handlers and detached processing calls
//! - Let shutdown wait until that count reaches zero

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outstanding-work counter.
///
/// Every unit of work holds a [`WorkGuard`]; [`WorkTracker::wait_idle`]
/// resolves once all guards are dropped. Backed by a watch channel so waiting
/// never polls.
#[derive(Debug, Clone)]
pub struct WorkTracker {
    active: Arc<watch::Sender<usize>>,
}

impl WorkTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            active: Arc::new(tx),
        }
    }

    /// Record a new unit of work. Returns a guard that decrements on drop.
    pub fn track(&self) -> WorkGuard {
        self.active.send_modify(|active| *active += 1);
        WorkGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Current number of outstanding units.
    pub fn active(&self) -> usize {
        *self.active.borrow()
    }

    /// Wait until no work is outstanding. Returns at once if already idle.
    pub async fn wait_idle(&self) {
        let mut rx = self.active.subscribe();
        // The tracker keeps the sender alive, so the channel cannot close here.
        let _ = rx.wait_for(|active| *active == 0).await;
    }
}

impl Default for WorkTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard held for the lifetime of one unit of work.
/// Decrements the tracker when dropped, including on panic unwind.
#[derive(Debug)]
pub struct WorkGuard {
    active: Arc<watch::Sender<usize>>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.active.send_modify(|active| *active -= 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("conn-"));
    }

    #[test]
    fn tracker_counts() {
        let tracker = WorkTracker::new();
        assert_eq!(tracker.active(), 0);

        let guard1 = tracker.track();
        let guard2 = tracker.clone().track();
        assert_eq!(tracker.active(), 2);

        drop(guard1);
        assert_eq!(tracker.active(), 1);

        drop(guard2);
        assert_eq!(tracker.active(), 0);
    }

    #[tokio::test]
    async fn wait_idle_returns_when_already_idle() {
        WorkTracker::new().wait_idle().await;
    }

    #[tokio::test]
    async fn wait_idle_blocks_until_last_guard_drops() {
        let tracker = WorkTracker::new();
        let guard = tracker.track();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_idle().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish once idle")
            .unwrap();
    }

    #[tokio::test]
    async fn guard_released_when_task_panics() {
        let tracker = WorkTracker::new();
        let guard = tracker.track();

        let task = tokio::spawn(async move {
            let _guard = guard;
            panic!("processing blew up");
        });
        assert!(task.await.is_err());
        assert_eq!(tracker.active(), 0);
    }
}
