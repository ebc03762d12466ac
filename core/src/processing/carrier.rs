use crate::ledger::Ledger;
use crate::math::{normalize_phase, StatsHelper};
use crate::prelude::CarrierConfig;
use crate::records::{CarrierRecord, Diagnostic, DiagnosticKind};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

/// SNR computed for one record; `None` when amplitude or noise is non-positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnrReading {
    pub id: String,
    pub snr_db: Option<f64>,
}

/// Counts produced by one [`CarrierSynchronizer::synchronize`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub phases_wrapped: usize,
    pub frequencies_corrected: usize,
    pub low_snr: usize,
    pub undefined_snr: usize,
}

/// Carrier synchronization passes over a shared ledger.
///
/// Each pass takes the ledger lock on its own, so appends from other tasks may
/// land between passes of a single [`synchronize`](Self::synchronize).
pub struct CarrierSynchronizer {
    ledger: Arc<Ledger<CarrierRecord>>,
    config: CarrierConfig,
}

impl CarrierSynchronizer {
    pub fn new(ledger: Arc<Ledger<CarrierRecord>>, config: CarrierConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &Arc<Ledger<CarrierRecord>> {
        &self.ledger
    }

    pub fn config(&self) -> &CarrierConfig {
        &self.config
    }

    /// Wraps every phase into `[0, 2π)`. Returns how many phases changed.
    pub fn align_phase(&self) -> usize {
        self.ledger.with_state(|records, errors| {
            let mut wrapped = 0;
            for record in records.iter_mut() {
                let aligned = if record.phase.is_finite() {
                    normalize_phase(record.phase)
                } else {
                    errors.push(Diagnostic::new(
                        record.id.clone(),
                        record.timestamp,
                        DiagnosticKind::NonFinitePhase,
                    ));
                    0.0
                };
                if aligned != record.phase {
                    debug!(
                        "signal {} phase aligned: {:.4} -> {:.4} rad",
                        record.id, record.phase, aligned
                    );
                    wrapped += 1;
                }
                record.phase = aligned;
            }
            wrapped
        })
    }

    /// Snaps frequencies outside `reference ± tolerance` onto the reference.
    pub fn correct_frequency(&self) -> usize {
        let reference = self.config.reference_hz;
        let tolerance = self.config.tolerance_hz;
        self.ledger.with_state(|records, _| {
            let mut corrected = 0;
            for record in records.iter_mut() {
                if (record.frequency - reference).abs() > tolerance {
                    debug!(
                        "signal {} frequency corrected: {:.2} Hz -> {:.2} Hz",
                        record.id, record.frequency, reference
                    );
                    record.frequency = reference;
                    corrected += 1;
                }
            }
            corrected
        })
    }

    /// Computes SNR for every record and logs those below the low-SNR floor.
    pub fn compute_snr(&self) -> Vec<SnrReading> {
        let floor = self.config.low_snr_db;
        self.ledger.with_state(|records, errors| {
            records
                .iter()
                .map(|record| {
                    let snr_db = StatsHelper::ratio_db(record.amplitude, record.noise_level);
                    let kind = match snr_db {
                        Some(snr_db) if snr_db < floor => Some(DiagnosticKind::LowSnr { snr_db }),
                        Some(_) => None,
                        None => Some(DiagnosticKind::UndefinedSnr {
                            amplitude: record.amplitude,
                            noise_level: record.noise_level,
                        }),
                    };
                    if let Some(kind) = kind {
                        errors.push(Diagnostic::new(record.id.clone(), record.timestamp, kind));
                    }
                    SnrReading {
                        id: record.id.clone(),
                        snr_db,
                    }
                })
                .collect()
        })
    }

    /// Phase alignment, frequency correction, then SNR, in that order.
    pub fn synchronize(&self) -> SyncSummary {
        let phases_wrapped = self.align_phase();
        let frequencies_corrected = self.correct_frequency();
        let readings = self.compute_snr();

        let floor = self.config.low_snr_db;
        let summary = SyncSummary {
            phases_wrapped,
            frequencies_corrected,
            low_snr: readings
                .iter()
                .filter(|r| matches!(r.snr_db, Some(snr) if snr < floor))
                .count(),
            undefined_snr: readings.iter().filter(|r| r.snr_db.is_none()).count(),
        };
        debug!("carrier synchronization completed: {:?}", summary);
        summary
    }

    /// Scales every noise level by the damping factor. Repeated calls compound.
    pub fn noise_reduction(&self) {
        let damping = self.config.noise_damping;
        let count = self.ledger.with_state(|records, _| {
            for record in records.iter_mut() {
                record.noise_level *= damping;
            }
            records.len()
        });
        info!("noise reduced by factor {:.2} on {} signals", damping, count);
    }
}
