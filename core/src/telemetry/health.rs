use crate::runtime::PeriodicTask;
use crate::telemetry::metrics::LinkMetrics;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Periodically records a health check and logs the link counters.
pub struct HealthReporter {
    metrics: Arc<LinkMetrics>,
    interval: Duration,
}

impl HealthReporter {
    pub fn new(metrics: Arc<LinkMetrics>, interval: Duration) -> Self {
        Self { metrics, interval }
    }

    pub fn report(&self) {
        self.metrics.record_health_check();
        let snapshot = self.metrics.snapshot();
        info!(
            "health summary: checks {}, frames sent {}, failed sends {}, reconnection attempts {}, successful reconnections {}, unstable samples {}, failed connections {}",
            snapshot.health_checks,
            snapshot.frames_sent,
            snapshot.failed_sends,
            snapshot.reconnection_attempts,
            snapshot.successful_reconnections,
            snapshot.unstable_samples,
            snapshot.failed_connections
        );
    }

    pub fn spawn(self, token: CancellationToken) -> JoinHandle<u64> {
        let reporter = Arc::new(self);
        PeriodicTask::new("health", reporter.interval)
            .delay_first_tick()
            .spawn(token, move || {
                reporter.report();
                std::future::ready(())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reporter_counts_health_checks() {
        let metrics = Arc::new(LinkMetrics::new());
        let token = CancellationToken::new();
        let handle = HealthReporter::new(metrics.clone(), Duration::from_secs(10)).spawn(token.clone());

        tokio::time::sleep(Duration::from_secs(35)).await;
        token.cancel();

        assert_eq!(handle.await.unwrap(), 3);
        assert_eq!(metrics.snapshot().health_checks, 3);
    }
}
