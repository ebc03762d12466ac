use crate::prelude::RetryPolicy;
use crate::retry::backoff::{retry_with_backoff, RetryObserver};
use log::{info, warn};
use serde::Serialize;
use std::fmt;

/// Boolean integrity check run by one pipeline stage.
///
/// Real decoders plug in behind this contract without changing the retry
/// composition.
pub trait IntegrityCheck: Send {
    fn name(&self) -> &str;
    fn verify(&mut self, payload: &[u8]) -> bool;
}

/// Adapts a closure into an [`IntegrityCheck`].
pub struct FnCheck<F> {
    name: String,
    check: F,
}

pub fn check_fn<F>(name: impl Into<String>, check: F) -> FnCheck<F>
where
    F: FnMut(&[u8]) -> bool + Send,
{
    FnCheck {
        name: name.into(),
        check,
    }
}

impl<F> IntegrityCheck for FnCheck<F>
where
    F: FnMut(&[u8]) -> bool + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&mut self, payload: &[u8]) -> bool {
        (self.check)(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Detection,
    Parity,
    Correction,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Detection => "detection",
            StageKind::Parity => "parity",
            StageKind::Correction => "correction",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Delivered,
    /// The named stage spent its whole budget; later stages never ran.
    MissionFailed { stage: StageKind, check: String },
}

impl PipelineOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PipelineOutcome::Delivered)
    }
}

struct Stage {
    kind: StageKind,
    check: Box<dyn IntegrityCheck>,
    policy: RetryPolicy,
}

/// Fail-fast sequence of independently retried integrity checks.
pub struct StagePipeline {
    stages: Vec<Stage>,
}

impl StagePipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Detection, parity and correction sharing one retry policy.
    pub fn standard(
        detection: impl IntegrityCheck + 'static,
        parity: impl IntegrityCheck + 'static,
        correction: impl IntegrityCheck + 'static,
        policy: RetryPolicy,
    ) -> Self {
        Self::new()
            .stage(StageKind::Detection, detection, policy)
            .stage(StageKind::Parity, parity, policy)
            .stage(StageKind::Correction, correction, policy)
    }

    /// Appends a stage; stages run in the order they were added.
    pub fn stage(
        mut self,
        kind: StageKind,
        check: impl IntegrityCheck + 'static,
        policy: RetryPolicy,
    ) -> Self {
        self.stages.push(Stage {
            kind,
            check: Box::new(check),
            policy,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage in order and stops at the first exhausted budget.
    /// Stages that already passed are not rolled back.
    pub async fn run(&mut self, payload: &[u8], observer: &dyn RetryObserver) -> PipelineOutcome {
        for stage in &mut self.stages {
            let label = format!("{} ({})", stage.kind, stage.check.name());
            let check = &mut stage.check;
            let passed =
                retry_with_backoff(&label, || check.verify(payload), stage.policy, observer).await;
            if !passed {
                warn!("{} budget exhausted, aborting transmission", label);
                return PipelineOutcome::MissionFailed {
                    stage: stage.kind,
                    check: stage.check.name().to_string(),
                };
            }
        }
        info!("all {} integrity stages passed", self.stages.len());
        PipelineOutcome::Delivered
    }
}

impl Default for StagePipeline {
    fn default() -> Self {
        Self::new()
    }
}
