//! # Rate Gate
//!
//! Enforces a minimum interval between remote catalog calls. Every call
//! site acquires the gate before touching the network; the gate is the
//! single serialization point, so concurrent callers are spaced out just
//! like sequential ones. Time comes from the injected [`Clock`], which
//! keeps the spacing testable under tokio's paused virtual time.

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::trace;

/// Minimum-interval gate shared by all remote call sites.
pub struct RateGate {
    min_interval: Duration,
    clock: Arc<dyn Clock>,
    /// Instant of the most recent release; the lock is held across the
    /// wait so acquisitions serialize.
    last: Mutex<Option<DateTime<Utc>>>,
}

impl RateGate {
    pub fn new(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_interval,
            clock,
            last: Mutex::new(None),
        }
    }

    /// Waits until at least `min_interval` has passed since the previous
    /// acquisition, then records the new one.
    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let elapsed = (self.clock.now() - previous)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!(wait_ms = wait.as_millis() as u64, "Rate gate waiting");
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(self.clock.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clock that tracks tokio's (possibly paused) virtual time.
    struct VirtualClock {
        epoch: DateTime<Utc>,
        origin: tokio::time::Instant,
    }

    impl VirtualClock {
        fn new() -> Self {
            Self {
                epoch: DateTime::<Utc>::UNIX_EPOCH,
                origin: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for VirtualClock {
        fn now(&self) -> DateTime<Utc> {
            self.epoch
                + chrono::Duration::from_std(self.origin.elapsed()).unwrap_or_default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_acquisitions_are_spaced() {
        let clock = Arc::new(VirtualClock::new());
        let gate = RateGate::new(Duration::from_millis(1000), clock.clone());

        let mut stamps = Vec::new();
        for _ in 0..3 {
            gate.acquire().await;
            stamps.push(clock.now());
        }

        for pair in stamps.windows(2) {
            let gap = (pair[1] - pair[0]).to_std().unwrap();
            assert!(gap >= Duration::from_millis(1000), "gap was {:?}", gap);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquisitions_serialize() {
        let clock = Arc::new(VirtualClock::new());
        let gate = Arc::new(RateGate::new(Duration::from_millis(500), clock.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = Arc::clone(&gate);
            let clock = Arc::clone(&clock);
            handles.push(tokio::spawn(async move {
                gate.acquire().await;
                clock.now()
            }));
        }

        let mut stamps = Vec::new();
        for handle in handles {
            stamps.push(handle.await.unwrap());
        }
        stamps.sort();

        for pair in stamps.windows(2) {
            let gap = (pair[1] - pair[0]).to_std().unwrap();
            assert!(gap >= Duration::from_millis(500), "gap was {:?}", gap);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_acquisition_is_immediate() {
        let clock = Arc::new(VirtualClock::new());
        let gate = RateGate::new(Duration::from_millis(1000), clock.clone());

        let before = clock.now();
        gate.acquire().await;
        assert_eq!(clock.now(), before);
    }
}
