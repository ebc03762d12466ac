use crate::generator::channel::{LossyTransport, RandomCheck};
use crate::generator::profile::SignalGenerator;
use linkcore::link::{ConnectionMonitor, StabilityGuard, StabilityOutcome};
use linkcore::records::CarrierRecord;
use linkcore::retry::IntegrityCheck;
use linkcore::runtime::{PeriodicTask, Workload};
use linkcore::telemetry::LogObserver;
use linkcore::Ledger;
use linkcore::LinkError;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Forwards the latest carrier record each tick.
pub struct LinkWorkload {
    monitor: Arc<ConnectionMonitor<LossyTransport>>,
    ledger: Arc<Ledger<CarrierRecord>>,
}

impl LinkWorkload {
    pub fn new(
        monitor: Arc<ConnectionMonitor<LossyTransport>>,
        ledger: Arc<Ledger<CarrierRecord>>,
    ) -> Self {
        Self { monitor, ledger }
    }
}

impl Workload for LinkWorkload {
    fn name(&self) -> &str {
        "link-transfer"
    }

    fn tick(&mut self) {
        let Some(record) = self.ledger.latest() else {
            return;
        };
        match self.monitor.send_data(&record) {
            Ok(()) => debug!("record {} transmitted", record.id),
            Err(LinkError::Disconnected) => debug!("link down, record {} held back", record.id),
            Err(err) => warn!("record {} not transmitted: {}", record.id, err),
        }
    }
}

/// Draws a link-quality sample per check and hands it to the stability guard.
pub struct StabilityWatch {
    guard: StabilityGuard,
    samples: Mutex<SignalGenerator>,
    reconnect: Mutex<RandomCheck>,
}

impl StabilityWatch {
    pub fn new(guard: StabilityGuard, samples: SignalGenerator, reconnect: RandomCheck) -> Self {
        Self {
            guard,
            samples: Mutex::new(samples),
            reconnect: Mutex::new(reconnect),
        }
    }

    pub async fn check_once(&self) -> StabilityOutcome {
        let sample = lock(&self.samples).link_sample();
        let outcome = self
            .guard
            .check(
                &sample,
                || lock(&self.reconnect).verify(&[]),
                &LogObserver::new(),
            )
            .await;
        if outcome == StabilityOutcome::Stable {
            info!("RF signal stable");
        }
        outcome
    }

    pub fn spawn(self, interval: Duration, token: CancellationToken) -> JoinHandle<u64> {
        let watch = Arc::new(self);
        PeriodicTask::new("link-stability", interval)
            .delay_first_tick()
            .spawn(token, move || {
                let watch = watch.clone();
                async move {
                    watch.check_once().await;
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::GeneratorConfig;
    use linkcore::link::QualityThresholds;
    use linkcore::telemetry::LinkMetrics;
    use linkcore::RetryPolicy;

    fn watch(metrics: &Arc<LinkMetrics>, min_signal_strength: f64, reconnect_p: f64) -> StabilityWatch {
        let thresholds = QualityThresholds {
            min_signal_strength,
            ..Default::default()
        };
        StabilityWatch::new(
            StabilityGuard::new(
                thresholds,
                RetryPolicy::new(3, Duration::from_secs(1)),
                metrics.clone(),
            ),
            SignalGenerator::new(GeneratorConfig::default(), 5),
            RandomCheck::new("reconnect", reconnect_p, 6),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn unrecoverable_instability_is_counted() {
        let metrics = Arc::new(LinkMetrics::new());
        // generated signal strength never reaches 100
        let outcome = watch(&metrics, 100.0, 0.0).check_once().await;

        assert!(matches!(outcome, StabilityOutcome::Failed { .. }));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.unstable_samples, 1);
        assert_eq!(snapshot.failed_connections, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn certain_reconnect_recovers() {
        let metrics = Arc::new(LinkMetrics::new());
        let outcome = watch(&metrics, 100.0, 1.0).check_once().await;

        assert!(matches!(outcome, StabilityOutcome::Recovered { .. }));
        assert_eq!(metrics.snapshot().failed_connections, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_watch_checks_each_interval() {
        let metrics = Arc::new(LinkMetrics::new());
        let token = CancellationToken::new();
        let handle = watch(&metrics, 100.0, 0.0).spawn(Duration::from_secs(5), token.clone());

        // checks at 5s and 12s, each failing recovery takes 2s
        tokio::time::sleep(Duration::from_secs(15)).await;
        token.cancel();

        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(metrics.snapshot().failed_connections, 2);
    }
}
