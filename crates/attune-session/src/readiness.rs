//! One-shot initialization readiness latch.

use tokio::sync::watch;
use tracing::warn;

/// Initialization phases. `Ready` is terminal; the latch never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Uninitialized,
    AwaitingReadiness,
    Ready,
}

/// Owner side of the latch. Constructed once at startup; readiness is
/// signaled exactly once, after the property factory exists.
#[derive(Debug)]
pub struct ReadinessLatch {
    tx: watch::Sender<InitPhase>,
}

impl ReadinessLatch {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(InitPhase::Uninitialized);
        Self { tx }
    }

    /// Mark that initialization has started.
    pub fn begin(&self) {
        self.tx.send_if_modified(|phase| {
            if *phase == InitPhase::Uninitialized {
                *phase = InitPhase::AwaitingReadiness;
                true
            } else {
                false
            }
        });
    }

    /// Signal readiness. Repeat signals are ignored.
    pub fn signal(&self) {
        let mut repeated = false;
        self.tx.send_if_modified(|phase| {
            if *phase == InitPhase::Ready {
                repeated = true;
                false
            } else {
                *phase = InitPhase::Ready;
                true
            }
        });
        if repeated {
            warn!("readiness signaled more than once");
        }
    }

    #[must_use]
    pub fn phase(&self) -> InitPhase {
        *self.tx.borrow()
    }

    /// A waiter handle for gating device handling.
    #[must_use]
    pub fn subscribe(&self) -> Readiness {
        Readiness { rx: self.tx.subscribe() }
    }
}

impl Default for ReadinessLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Waiter side of the latch.
#[derive(Debug, Clone)]
pub struct Readiness {
    rx: watch::Receiver<InitPhase>,
}

impl Readiness {
    /// Wait until initialization is complete; returns immediately once ready.
    ///
    /// A dropped latch counts as ready, so teardown cannot strand waiters.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|phase| *phase == InitPhase::Ready).await;
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow() == InitPhase::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_phase_progression_is_one_way() {
        let latch = ReadinessLatch::new();
        assert_eq!(latch.phase(), InitPhase::Uninitialized);

        latch.begin();
        assert_eq!(latch.phase(), InitPhase::AwaitingReadiness);

        // begin() after the transition is a no-op.
        latch.begin();
        assert_eq!(latch.phase(), InitPhase::AwaitingReadiness);

        latch.signal();
        assert_eq!(latch.phase(), InitPhase::Ready);

        latch.signal();
        assert_eq!(latch.phase(), InitPhase::Ready);
    }

    #[tokio::test]
    async fn test_waiters_park_until_signal() {
        let latch = ReadinessLatch::new();
        latch.begin();
        let readiness = latch.subscribe();

        let waiter = tokio::spawn(async move {
            readiness.wait().await;
        });

        // The waiter must still be parked.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        latch.signal();
        tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_wait_after_ready_returns_immediately() {
        let latch = ReadinessLatch::new();
        latch.begin();
        latch.signal();

        let readiness = latch.subscribe();
        assert!(readiness.is_ready());
        tokio::time::timeout(Duration::from_millis(100), readiness.wait()).await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_latch_releases_waiters() {
        let latch = ReadinessLatch::new();
        let readiness = latch.subscribe();
        drop(latch);
        tokio::time::timeout(Duration::from_millis(100), readiness.wait()).await.unwrap();
    }
}
