use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a ledger diagnostic reports about a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    LowSnr { snr_db: f64 },
    UndefinedSnr { amplitude: f64, noise_level: f64 },
    NonFinitePhase,
    InvalidFrequency { frequency: f64 },
    NegativeSignalStrength { signal_strength: f64 },
}

/// One line of a ledger's error log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub record_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(record_id: impl Into<String>, timestamp: DateTime<Utc>, kind: DiagnosticKind) -> Self {
        Self {
            record_id: record_id.into(),
            timestamp,
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.timestamp.to_rfc3339();
        match &self.kind {
            DiagnosticKind::LowSnr { snr_db } => write!(
                f,
                "Low SNR ({:.2} dB) for signal {} at {}",
                snr_db, self.record_id, at
            ),
            DiagnosticKind::UndefinedSnr {
                amplitude,
                noise_level,
            } => write!(
                f,
                "Undefined SNR (amplitude {:.3}, noise {:.3}) for signal {} at {}",
                amplitude, noise_level, self.record_id, at
            ),
            DiagnosticKind::NonFinitePhase => {
                write!(f, "Non-finite phase reset for signal {} at {}", self.record_id, at)
            }
            DiagnosticKind::InvalidFrequency { frequency } => write!(
                f,
                "Invalid frequency {:.2} Hz for data ID {} at {}",
                frequency, self.record_id, at
            ),
            DiagnosticKind::NegativeSignalStrength { signal_strength } => write!(
                f,
                "Negative signal strength {:.3} for data ID {} at {}",
                signal_strength, self.record_id, at
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_renders_single_line() {
        let diag = Diagnostic::new(
            "abc",
            Utc::now(),
            DiagnosticKind::LowSnr { snr_db: 9.5 },
        );
        let line = diag.to_string();
        assert!(line.starts_with("Low SNR (9.50 dB) for signal abc"));
        assert!(!line.contains('\n'));
    }
}
