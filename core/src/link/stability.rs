use crate::link::quality::{LinkSample, QualityThresholds, QualityViolation};
use crate::prelude::RetryPolicy;
use crate::retry::{retry_with_backoff, RetryObserver};
use crate::telemetry::LinkMetrics;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "stability", rename_all = "snake_case")]
pub enum StabilityOutcome {
    Stable,
    Recovered { violation: QualityViolation },
    Failed { violation: QualityViolation },
}

/// Evaluates link samples and runs a bounded recovery on instability.
///
/// Every unstable sample is counted; a recovery that spends its whole budget
/// is counted as a failed connection.
pub struct StabilityGuard {
    thresholds: QualityThresholds,
    recovery: RetryPolicy,
    metrics: Arc<LinkMetrics>,
}

impl StabilityGuard {
    pub fn new(thresholds: QualityThresholds, recovery: RetryPolicy, metrics: Arc<LinkMetrics>) -> Self {
        Self {
            thresholds,
            recovery,
            metrics,
        }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    pub async fn check<F>(
        &self,
        sample: &LinkSample,
        reconnect: F,
        observer: &dyn RetryObserver,
    ) -> StabilityOutcome
    where
        F: FnMut() -> bool,
    {
        let violation = match self.thresholds.evaluate(sample) {
            Ok(()) => return StabilityOutcome::Stable,
            Err(violation) => violation,
        };

        self.metrics.record_unstable_sample();
        warn!("RF signal unstable ({}), attempting recovery", violation);
        if retry_with_backoff("link recovery", reconnect, self.recovery, observer).await {
            info!("link recovered after instability");
            StabilityOutcome::Recovered { violation }
        } else {
            self.metrics.record_failed_connection();
            error!("all link recovery attempts failed, manual intervention required");
            StabilityOutcome::Failed { violation }
        }
    }
}
