use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Reference carrier used by the synchronizer when no configuration is given.
pub const DEFAULT_REFERENCE_HZ: f64 = 1.8e9;

/// Configuration fixed at construction of a carrier synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierConfig {
    pub reference_hz: f64,
    pub tolerance_hz: f64,
    /// Factor applied to every noise level by one noise-reduction pass.
    pub noise_damping: f64,
    pub low_snr_db: f64,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            reference_hz: DEFAULT_REFERENCE_HZ,
            tolerance_hz: 50.0,
            noise_damping: 0.8,
            low_snr_db: 10.0,
        }
    }
}

/// Configuration for Doppler triage over a ledger of shifted-frequency records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub tolerance_hz: f64,
    pub high_signal_threshold: f64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            tolerance_hz: 100.0,
            high_signal_threshold: 0.8,
        }
    }
}

/// Attempt budget and inter-attempt delay for one retried check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(rename = "delay_ms", with = "millis")]
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(2))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Errors surfaced by ledger persistence.
#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("error log sink {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the connection monitor.
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    #[error("link is disconnected, transfer not attempted")]
    Disconnected,
    #[error("transfer failed, link marked disconnected")]
    TransferFailed,
    #[error("encoding record: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
pub type LinkResult<T> = Result<T, LinkError>;
