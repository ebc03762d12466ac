use crate::processing::{CarrierSynchronizer, DopplerTriage, SortMode};
use crate::records::{CarrierRecord, DopplerRecord};
use crate::runtime::task::PeriodicTask;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One unit of work executed per driver tick.
pub trait Workload: Send + 'static {
    fn name(&self) -> &str;
    fn tick(&mut self);
}

/// Producer of records for a workload.
pub trait RecordSource<R>: Send + 'static {
    fn next_record(&mut self) -> R;
}

impl<R, F> RecordSource<R> for F
where
    F: FnMut() -> R + Send + 'static,
{
    fn next_record(&mut self) -> R {
        self()
    }
}

/// Appends a carrier record per tick, then runs a full synchronization.
pub struct CarrierWorkload<S> {
    synchronizer: Arc<CarrierSynchronizer>,
    source: S,
}

impl<S: RecordSource<CarrierRecord>> CarrierWorkload<S> {
    pub fn new(synchronizer: Arc<CarrierSynchronizer>, source: S) -> Self {
        Self {
            synchronizer,
            source,
        }
    }
}

impl<S: RecordSource<CarrierRecord>> Workload for CarrierWorkload<S> {
    fn name(&self) -> &str {
        "carrier-sync"
    }

    fn tick(&mut self) {
        self.synchronizer
            .ledger()
            .append(self.source.next_record());
        self.synchronizer.synchronize();
    }
}

/// Appends a Doppler record per tick, then sorts and validates the ledger.
pub struct DopplerWorkload<S> {
    triage: Arc<DopplerTriage>,
    source: S,
    mode: SortMode,
}

impl<S: RecordSource<DopplerRecord>> DopplerWorkload<S> {
    pub fn new(triage: Arc<DopplerTriage>, source: S, mode: SortMode) -> Self {
        Self {
            triage,
            source,
            mode,
        }
    }
}

impl<S: RecordSource<DopplerRecord>> Workload for DopplerWorkload<S> {
    fn name(&self) -> &str {
        "doppler-triage"
    }

    fn tick(&mut self) {
        self.triage.ledger().append(self.source.next_record());
        self.triage.sort(self.mode);
        self.triage.validate_data();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverReport {
    pub name: String,
    pub ticks: u64,
    pub elapsed: Duration,
}

/// Feeds a workload at a fixed cadence for a bounded duration.
pub struct RealTimeDriver<W> {
    workload: W,
    tick_interval: Duration,
}

impl<W: Workload> RealTimeDriver<W> {
    pub fn new(workload: W, tick_interval: Duration) -> Self {
        Self {
            workload,
            tick_interval,
        }
    }

    /// Runs until `duration` elapses or `shutdown` fires, whichever comes first.
    ///
    /// The stop is observed at the next iteration boundary; a tick already in
    /// progress completes.
    pub async fn run_for(self, duration: Duration, shutdown: &CancellationToken) -> DriverReport {
        let name = self.workload.name().to_string();
        let token = shutdown.child_token();
        let start = Instant::now();

        let mut workload = self.workload;
        let handle = PeriodicTask::new(name.clone(), self.tick_interval).spawn(
            token.clone(),
            move || {
                workload.tick();
                std::future::ready(())
            },
        );

        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = shutdown.cancelled() => info!("[{}] shutdown requested", name),
        }
        token.cancel();

        let ticks = match handle.await {
            Ok(ticks) => ticks,
            Err(err) => {
                warn!("[{}] driver task ended abnormally: {}", name, err);
                0
            }
        };
        let elapsed = start.elapsed();
        info!("[{}] processed {} ticks in {:?}", name, ticks, elapsed);

        DriverReport {
            name,
            ticks,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::prelude::{CarrierConfig, TriageConfig};
    use chrono::Utc;
    use std::f64::consts::TAU;

    fn carrier_source() -> impl FnMut() -> CarrierRecord + Send + 'static {
        let mut n = 0u32;
        move || {
            n += 1;
            CarrierRecord::new(format!("c{}", n), Utc::now(), 1.8e9 + 600.0, -1.0, 1.0, 0.01)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn carrier_driver_appends_and_synchronizes_each_tick() {
        let ledger = Arc::new(Ledger::new());
        let sync = Arc::new(CarrierSynchronizer::new(ledger.clone(), CarrierConfig::default()));
        let driver = RealTimeDriver::new(
            CarrierWorkload::new(sync, carrier_source()),
            Duration::from_millis(100),
        );

        let report = driver
            .run_for(Duration::from_millis(1050), &CancellationToken::new())
            .await;

        assert_eq!(report.ticks, 11);
        assert_eq!(ledger.len(), 11);
        for record in ledger.snapshot() {
            assert_eq!(record.frequency, 1.8e9);
            assert!((0.0..TAU).contains(&record.phase));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn doppler_driver_sorts_and_validates() {
        let ledger = Arc::new(Ledger::new());
        let triage = Arc::new(DopplerTriage::new(ledger.clone(), TriageConfig::default()));
        let mut n = 0u32;
        let source = move || {
            n += 1;
            DopplerRecord::new(format!("d{}", n), Utc::now(), 1000.0 - n as f64 * 500.0, 0.0, 0.5)
        };
        let driver = RealTimeDriver::new(
            DopplerWorkload::new(triage, source, SortMode::Tolerance),
            Duration::from_millis(100),
        );

        let report = driver
            .run_for(Duration::from_millis(350), &CancellationToken::new())
            .await;

        assert_eq!(report.ticks, 4);
        let frequencies: Vec<f64> = ledger.snapshot().iter().map(|r| r.frequency).collect();
        assert_eq!(frequencies, vec![-1000.0, -500.0, 0.0, 500.0]);
        assert!(ledger.error_count() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_token_stops_driver_early() {
        let ledger = Arc::new(Ledger::new());
        let sync = Arc::new(CarrierSynchronizer::new(ledger.clone(), CarrierConfig::default()));
        let driver = RealTimeDriver::new(
            CarrierWorkload::new(sync, carrier_source()),
            Duration::from_millis(100),
        );
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let report = driver.run_for(Duration::from_secs(60), &shutdown).await;

        assert!(report.ticks <= 1);
        assert!(report.elapsed < Duration::from_secs(1));
    }
}
