use crate::ledger::Ledger;
use crate::math::StatsHelper;
use crate::prelude::TriageConfig;
use crate::records::{Diagnostic, DiagnosticKind, DopplerRecord};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

/// Ordering applied by [`DopplerTriage::sort`]. The two modes are alternatives,
/// never composed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortMode {
    /// Frequency ascending, velocity ascending within the tolerance bucket.
    Tolerance,
    /// Descending by `frequency * factor - velocity`.
    Environmental(f64),
}

/// Aggregate statistics over a Doppler ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub count: usize,
    pub mean_frequency: f64,
    pub mean_velocity: f64,
    pub high_signal_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendReport {
    NoData,
    Summary(TrendSummary),
}

/// Sorting, validation and trend analysis over a ledger of Doppler records.
pub struct DopplerTriage {
    ledger: Arc<Ledger<DopplerRecord>>,
    config: TriageConfig,
}

impl DopplerTriage {
    pub fn new(ledger: Arc<Ledger<DopplerRecord>>, config: TriageConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &Arc<Ledger<DopplerRecord>> {
        &self.ledger
    }

    pub fn sort(&self, mode: SortMode) {
        match mode {
            SortMode::Tolerance => self.sort_data(),
            SortMode::Environmental(factor) => self.advanced_sorting(factor),
        }
    }

    pub fn sort_data(&self) {
        let tolerance = self.config.tolerance_hz;
        self.ledger.with_state(|records, _| {
            stable_insertion_sort(records, |a, b| tolerance_less(a, b, tolerance));
        });
    }

    pub fn advanced_sorting(&self, environmental_factor: f64) {
        let score = |r: &DopplerRecord| r.frequency * environmental_factor - r.velocity;
        self.ledger.with_state(|records, _| {
            records.sort_by(|a, b| score(b).total_cmp(&score(a)));
        });
    }

    /// Logs one diagnostic per anomaly and returns how many were found.
    /// Anomalous records stay in the ledger.
    pub fn validate_data(&self) -> usize {
        self.ledger.with_state(|records, errors| {
            let before = errors.len();
            for record in records.iter() {
                if record.has_invalid_frequency() {
                    errors.push(Diagnostic::new(
                        record.id.clone(),
                        record.timestamp,
                        DiagnosticKind::InvalidFrequency {
                            frequency: record.frequency,
                        },
                    ));
                }
                if record.has_negative_strength() {
                    errors.push(Diagnostic::new(
                        record.id.clone(),
                        record.timestamp,
                        DiagnosticKind::NegativeSignalStrength {
                            signal_strength: record.signal_strength,
                        },
                    ));
                }
            }
            let found = errors.len() - before;
            if found > 0 {
                debug!("validation found {} anomalies in {} records", found, records.len());
            }
            found
        })
    }

    pub fn analyze_trends(&self) -> TrendReport {
        let threshold = self.config.high_signal_threshold;
        let (frequencies, velocities, high) = self.ledger.with_state(|records, _| {
            let frequencies: Vec<f64> = records.iter().map(|r| r.frequency).collect();
            let velocities: Vec<f64> = records.iter().map(|r| r.velocity).collect();
            let high = records
                .iter()
                .filter(|r| r.signal_strength > threshold)
                .count();
            (frequencies, velocities, high)
        });

        let count = frequencies.len();
        let summary = StatsHelper::mean(&frequencies).and_then(|mean_frequency| {
            Some(TrendSummary {
                count,
                mean_frequency,
                mean_velocity: StatsHelper::mean(&velocities)?,
                high_signal_pct: StatsHelper::percentage(high, count)?,
            })
        });

        match summary {
            Some(summary) => {
                info!(
                    "doppler trends: mean {:.2} Hz, mean {:.2} m/s, {:.2}% high signal",
                    summary.mean_frequency, summary.mean_velocity, summary.high_signal_pct
                );
                TrendReport::Summary(summary)
            }
            None => {
                info!("no doppler data available for analysis");
                TrendReport::NoData
            }
        }
    }
}

fn tolerance_less(a: &DopplerRecord, b: &DopplerRecord, tolerance: f64) -> bool {
    if (a.frequency - b.frequency).abs() <= tolerance {
        a.velocity < b.velocity
    } else {
        a.frequency < b.frequency
    }
}

/// Stable insertion sort driven by a strict `less` predicate.
///
/// The tolerance comparator is not transitive, so `slice::sort_by` (which
/// requires a total order) is not usable. An element only moves left past
/// neighbours it is strictly less than, which keeps equal keys in insertion
/// order and leaves every adjacent pair with `!less(next, prev)`.
///
/// Cost is O(n) on an already sorted slice but O(n²) comparisons and swaps in
/// the worst case, so switching the [`SortMode`] of a large ledger makes the
/// next pass quadratic.
fn stable_insertion_sort<T, F>(items: &mut [T], mut less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && less(&items[j], &items[j - 1]) {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TOLERANCE: f64 = 100.0;

    fn record(id: &str, frequency: f64, velocity: f64, strength: f64) -> DopplerRecord {
        DopplerRecord::new(id, Utc::now(), frequency, velocity, strength)
    }

    fn triage(records: Vec<DopplerRecord>) -> DopplerTriage {
        DopplerTriage::new(
            Arc::new(Ledger::with_records(records)),
            TriageConfig {
                tolerance_hz: TOLERANCE,
                ..Default::default()
            },
        )
    }

    fn ids(triage: &DopplerTriage) -> Vec<String> {
        triage.ledger().snapshot().into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn sort_data_buckets_by_tolerance() {
        let t = triage(vec![
            record("high", 2.4e9 + 5000.0, 0.0, 0.5),
            record("fast", 2.4e9 + 50.0, 40.0, 0.5),
            record("slow", 2.4e9, -30.0, 0.5),
            record("low", 2.4e9 - 5000.0, 100.0, 0.5),
        ]);
        t.sort_data();
        assert_eq!(ids(&t), vec!["low", "slow", "fast", "high"]);
    }

    #[test]
    fn sort_data_adjacent_pairs_satisfy_comparator() {
        let frequencies = [2.4e9, 2.4e9 + 90.0, 2.4e9 + 180.0, 2.4e9 - 75.0, 2.4e9 + 40.0];
        let velocities = [10.0, -5.0, 3.0, 8.0, -20.0];
        let records = (0..25)
            .map(|i| {
                record(
                    &format!("r{}", i),
                    frequencies[i % 5] + (i / 5) as f64 * 37.0,
                    velocities[(i * 3) % 5],
                    0.5,
                )
            })
            .collect();
        let t = triage(records);
        t.sort_data();

        let sorted = t.ledger().snapshot();
        for pair in sorted.windows(2) {
            assert!(!tolerance_less(&pair[1], &pair[0], TOLERANCE));
        }

        t.sort_data();
        assert_eq!(t.ledger().snapshot(), sorted);
    }

    #[test]
    fn sort_data_is_stable_for_equal_keys() {
        let t = triage(vec![
            record("first", 2.4e9, 5.0, 0.1),
            record("other", 2.4e9 + 1000.0, 0.0, 0.1),
            record("second", 2.4e9, 5.0, 0.2),
            record("third", 2.4e9, 5.0, 0.3),
        ]);
        t.sort_data();
        assert_eq!(ids(&t), vec!["first", "second", "third", "other"]);
    }

    #[test]
    fn advanced_sorting_orders_by_descending_score() {
        let t = triage(vec![
            record("a", 100.0, 0.0, 0.5),
            record("b", 300.0, 250.0, 0.5),
            record("c", 200.0, 0.0, 0.5),
        ]);
        t.sort(SortMode::Environmental(1.0));
        assert_eq!(ids(&t), vec!["c", "a", "b"]);
    }

    #[test]
    fn validate_data_flags_but_keeps_anomalies() {
        let t = triage(vec![
            record("zero", 0.0, 0.0, 0.5),
            record("both", -1.0, 0.0, -0.2),
            record("ok", 2.4e9, 0.0, 0.5),
        ]);

        assert_eq!(t.validate_data(), 3);
        assert_eq!(t.ledger().len(), 3);
        let errors = t.ledger().errors();
        assert_eq!(errors[0].record_id, "zero");
        assert!(matches!(
            errors[2].kind,
            DiagnosticKind::NegativeSignalStrength { .. }
        ));
    }

    #[test]
    fn analyze_trends_reports_no_data_on_empty_ledger() {
        assert_eq!(triage(Vec::new()).analyze_trends(), TrendReport::NoData);
    }

    #[test]
    fn analyze_trends_computes_means_and_high_signal_share() {
        let t = triage(vec![
            record("a", 100.0, 10.0, 1.0),
            record("b", 300.0, -30.0, 1.0),
        ]);
        match t.analyze_trends() {
            TrendReport::Summary(summary) => {
                assert_eq!(summary.count, 2);
                assert_eq!(summary.mean_frequency, 200.0);
                assert_eq!(summary.mean_velocity, -10.0);
                assert_eq!(summary.high_signal_pct, 100.0);
            }
            TrendReport::NoData => panic!("expected summary"),
        }
    }

    #[test]
    fn switching_back_from_environmental_restores_tolerance_order() {
        let records = (0..200i32)
            .map(|i| record(&i.to_string(), f64::from(i) * 1_000.0, 0.0, 0.5))
            .collect();
        let t = triage(records);

        // environmental mode leaves the ledger in descending frequency order
        t.sort(SortMode::Environmental(1.0));
        assert_eq!(ids(&t).first().map(String::as_str), Some("199"));

        t.sort(SortMode::Tolerance);
        let expected: Vec<String> = (0..200i32).map(|i| i.to_string()).collect();
        assert_eq!(ids(&t), expected);
    }
}
