use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One carrier measurement as received over the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Hz.
    pub frequency: f64,
    /// Radians; normalized into `[0, 2π)` by phase alignment.
    pub phase: f64,
    pub amplitude: f64,
    /// dB.
    pub noise_level: f64,
}

impl CarrierRecord {
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        frequency: f64,
        phase: f64,
        amplitude: f64,
        noise_level: f64,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            frequency,
            phase,
            amplitude,
            noise_level,
        }
    }
}
