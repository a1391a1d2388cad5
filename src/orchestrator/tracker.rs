//! In-flight probe tracking.
//!
//! `stop()` never discards probes already on the wire, so shutdown waits on this
//! count before reading final state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts probe rounds currently running.
#[derive(Debug, Clone, Default)]
pub struct ProbeTracker {
    active: Arc<AtomicU64>,
}

impl ProbeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a round as started. The count drops when the guard does.
    pub fn track(&self) -> ProbeGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ProbeGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Resolve once no round is in flight.
    pub async fn wait_idle(&self) {
        while self.active.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Decrements the in-flight count on drop.
#[derive(Debug)]
pub struct ProbeGuard {
    active: Arc<AtomicU64>,
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_count_rounds() {
        let tracker = ProbeTracker::new();
        let a = tracker.track();
        let b = tracker.track();
        assert_eq!(tracker.active_count(), 2);
        drop(a);
        assert_eq!(tracker.active_count(), 1);
        drop(b);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_idle_returns_after_last_guard() {
        let tracker = ProbeTracker::new();
        let guard = tracker.track();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            drop(guard);
        });
        tracker.wait_idle().await;
        assert_eq!(tracker.active_count(), 0);
    }
}
