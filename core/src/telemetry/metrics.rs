use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Link counters shared between the monitor, its poll task and the health
/// reporter. Constructed explicitly and passed in; nothing is process-global.
pub struct LinkMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub frames_sent: u64,
    pub failed_sends: u64,
    pub reconnection_attempts: u64,
    pub successful_reconnections: u64,
    pub health_checks: u64,
    pub unstable_samples: u64,
    /// Stability recoveries that spent their whole retry budget.
    pub failed_connections: u64,
}

impl LinkMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        apply(&mut self.lock());
    }

    pub fn record_frame_sent(&self) {
        self.update(|m| m.frames_sent += 1);
    }

    pub fn record_failed_send(&self) {
        self.update(|m| m.failed_sends += 1);
    }

    pub fn record_reconnect_attempt(&self) {
        self.update(|m| m.reconnection_attempts += 1);
    }

    pub fn record_reconnect_success(&self) {
        self.update(|m| m.successful_reconnections += 1);
    }

    pub fn record_health_check(&self) {
        self.update(|m| m.health_checks += 1);
    }

    pub fn record_unstable_sample(&self) {
        self.update(|m| m.unstable_samples += 1);
    }

    pub fn record_failed_connection(&self) {
        self.update(|m| m.failed_connections += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        *self.lock()
    }
}

impl Default for LinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = LinkMetrics::new();
        metrics.record_frame_sent();
        metrics.record_frame_sent();
        metrics.record_failed_send();
        metrics.record_health_check();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_sent, 2);
        assert_eq!(snapshot.failed_sends, 1);
        assert_eq!(snapshot.reconnection_attempts, 0);
        assert_eq!(snapshot.health_checks, 1);
        assert_eq!(snapshot.failed_connections, 0);
    }

    #[test]
    fn counters_survive_poisoned_lock() {
        let metrics = Arc::new(LinkMetrics::new());
        metrics.record_frame_sent();

        let poisoner = metrics.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison the metrics lock");
        })
        .join();
        assert!(result.is_err());
        assert!(metrics.inner.is_poisoned());

        metrics.record_frame_sent();
        metrics.record_failed_connection();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_sent, 2);
        assert_eq!(snapshot.failed_connections, 1);
    }
}
