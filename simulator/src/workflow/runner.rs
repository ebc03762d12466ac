use crate::generator::channel::{LossyTransport, RandomCheck};
use crate::generator::profile::SignalGenerator;
use crate::workflow::config::SimulationConfig;
use crate::workflow::link::{LinkWorkload, StabilityWatch};
use anyhow::Context;
use linkcore::link::{ConnectionMonitor, StabilityGuard};
use linkcore::processing::{CarrierSynchronizer, DopplerTriage, SyncSummary, TrendReport};
use linkcore::retry::{PipelineOutcome, StagePipeline};
use linkcore::runtime::{CarrierWorkload, DopplerWorkload, DriverReport, RealTimeDriver};
use linkcore::telemetry::{HealthReporter, LinkMetrics, LogObserver, MetricsSnapshot};
use linkcore::Ledger;
use log::info;
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Binary test pattern pushed through the integrity stages when no carrier
/// record was produced.
const TEST_PATTERN: &[u8] = b"110101101011";

pub const CARRIER_ERROR_LOG: &str = "carrier_sync_errors.log";
pub const DOPPLER_ERROR_LOG: &str = "doppler_errors.log";

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub drivers: Vec<DriverReport>,
    pub carrier_records: usize,
    pub carrier_diagnostics: usize,
    pub doppler_records: usize,
    pub doppler_diagnostics: usize,
    pub final_sync: SyncSummary,
    pub trends: TrendReport,
    pub link: MetricsSnapshot,
    pub outcome: PipelineOutcome,
}

#[derive(Clone)]
pub struct Runner {
    config: SimulationConfig,
}

impl Runner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<RunSummary> {
        let cfg = &self.config;
        let seed = cfg.seed;

        let carrier_ledger = Arc::new(Ledger::new());
        let synchronizer = Arc::new(CarrierSynchronizer::new(
            carrier_ledger.clone(),
            cfg.carrier.clone(),
        ));
        let doppler_ledger = Arc::new(Ledger::new());
        let triage = Arc::new(DopplerTriage::new(doppler_ledger.clone(), cfg.doppler.clone()));

        let metrics = Arc::new(LinkMetrics::new());
        let monitor = Arc::new(ConnectionMonitor::new(
            LossyTransport::new(cfg.link.failure_rate, seed.wrapping_add(2)),
            metrics.clone(),
            Duration::from_millis(cfg.link.reconnect_delay_ms),
        ));

        let background = shutdown.child_token();
        let poll = monitor.spawn_poll(
            Duration::from_millis(cfg.link.poll_interval_ms.max(1)),
            background.clone(),
        );
        let health = HealthReporter::new(
            metrics.clone(),
            Duration::from_millis(cfg.link.health_interval_ms.max(1)),
        )
        .spawn(background.clone());
        let stability = StabilityWatch::new(
            StabilityGuard::new(cfg.link.thresholds, cfg.link.recovery, metrics.clone()),
            SignalGenerator::new(cfg.generator, seed.wrapping_add(3)),
            RandomCheck::new(
                "reconnect",
                cfg.link.recovery_success_probability,
                seed.wrapping_add(7),
            ),
        )
        .spawn(
            Duration::from_millis(cfg.link.stability_interval_ms.max(1)),
            background.clone(),
        );

        let mut carrier_source = SignalGenerator::new(cfg.generator, seed);
        let carrier_driver = RealTimeDriver::new(
            CarrierWorkload::new(synchronizer.clone(), move || carrier_source.carrier()),
            cfg.tick_interval(),
        );
        let mut doppler_source = SignalGenerator::new(cfg.generator, seed.wrapping_add(1));
        let doppler_driver = RealTimeDriver::new(
            DopplerWorkload::new(triage.clone(), move || doppler_source.doppler(), cfg.sort.into()),
            cfg.tick_interval(),
        );
        let link_driver = RealTimeDriver::new(
            LinkWorkload::new(monitor.clone(), carrier_ledger.clone()),
            Duration::from_millis(cfg.link.send_interval_ms.max(1)),
        );

        info!("starting {}s simulation", cfg.duration_secs);
        let duration = cfg.duration();
        let (carrier_report, doppler_report, link_report) = tokio::join!(
            carrier_driver.run_for(duration, &shutdown),
            doppler_driver.run_for(duration, &shutdown),
            link_driver.run_for(duration, &shutdown),
        );

        background.cancel();
        poll.await.context("joining link poll task")?;
        health.await.context("joining health reporter")?;
        stability.await.context("joining link stability watch")?;

        synchronizer.noise_reduction();
        let final_sync = synchronizer.synchronize();
        let trends = triage.analyze_trends();
        carrier_ledger.log_details();

        fs::create_dir_all(&cfg.output_dir)
            .with_context(|| format!("creating output dir {}", cfg.output_dir.display()))?;
        carrier_ledger
            .save_error_log(cfg.output_dir.join(CARRIER_ERROR_LOG))
            .context("saving carrier error log")?;
        doppler_ledger
            .save_error_log(cfg.output_dir.join(DOPPLER_ERROR_LOG))
            .context("saving doppler error log")?;

        let payload = match carrier_ledger.latest() {
            Some(record) => serde_json::to_vec(&record).context("encoding latest record")?,
            None => TEST_PATTERN.to_vec(),
        };
        let p = cfg.check_success_probability;
        let mut pipeline = StagePipeline::standard(
            RandomCheck::new("CRC", p, seed.wrapping_add(4)),
            RandomCheck::new("LDPC", p, seed.wrapping_add(5)),
            RandomCheck::new("FEC", p, seed.wrapping_add(6)),
            cfg.retry,
        );
        let outcome = pipeline.run(&payload, &LogObserver::new()).await;

        Ok(RunSummary {
            drivers: vec![carrier_report, doppler_report, link_report],
            carrier_records: carrier_ledger.len(),
            carrier_diagnostics: carrier_ledger.error_count(),
            doppler_records: doppler_ledger.len(),
            doppler_diagnostics: doppler_ledger.error_count(),
            final_sync,
            trends,
            link: metrics.snapshot(),
            outcome,
        })
    }
}
