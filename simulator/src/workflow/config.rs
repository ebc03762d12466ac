use crate::generator::profile::GeneratorConfig;
use anyhow::{bail, Context};
use linkcore::link::QualityThresholds;
use linkcore::processing::SortMode;
use linkcore::{CarrierConfig, RetryPolicy, TriageConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum SortStrategy {
    Tolerance,
    Environmental { factor: f64 },
}

impl From<SortStrategy> for SortMode {
    fn from(strategy: SortStrategy) -> Self {
        match strategy {
            SortStrategy::Tolerance => SortMode::Tolerance,
            SortStrategy::Environmental { factor } => SortMode::Environmental(factor),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub failure_rate: f64,
    pub send_interval_ms: u64,
    pub reconnect_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub health_interval_ms: u64,
    pub stability_interval_ms: u64,
    pub thresholds: QualityThresholds,
    /// Budget for recovering from an unstable sample.
    pub recovery: RetryPolicy,
    pub recovery_success_probability: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.1,
            send_interval_ms: 500,
            reconnect_delay_ms: 2_000,
            poll_interval_ms: 5_000,
            health_interval_ms: 10_000,
            stability_interval_ms: 2_000,
            thresholds: QualityThresholds::default(),
            recovery: RetryPolicy::new(3, Duration::from_secs(1)),
            recovery_success_probability: 0.5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub duration_secs: u64,
    pub tick_ms: u64,
    pub seed: u64,
    pub output_dir: PathBuf,
    pub carrier: CarrierConfig,
    pub doppler: TriageConfig,
    pub sort: SortStrategy,
    pub generator: GeneratorConfig,
    pub retry: RetryPolicy,
    pub check_success_probability: f64,
    pub link: LinkConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 5,
            tick_ms: 100,
            seed: 0,
            output_dir: PathBuf::from("tools/data"),
            carrier: CarrierConfig::default(),
            doppler: TriageConfig::default(),
            sort: SortStrategy::Tolerance,
            generator: GeneratorConfig::default(),
            retry: RetryPolicy::default(),
            check_success_probability: 0.5,
            link: LinkConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulation config {}", path_ref.display()))?;
        let config: SimulationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulation config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating simulation config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Rejects probabilities that are non-finite or outside `[0, 1]`.
    pub fn validate(&self) -> anyhow::Result<()> {
        let probabilities = [
            ("check_success_probability", self.check_success_probability),
            ("link.failure_rate", self.link.failure_rate),
            (
                "link.recovery_success_probability",
                self.link.recovery_success_probability,
            ),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be a probability in [0, 1], got {}", field, value);
            }
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
