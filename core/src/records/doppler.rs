use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shifted-frequency measurement consumed by Doppler triage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DopplerRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub frequency: f64,
    /// m/s, positive when closing.
    pub velocity: f64,
    pub signal_strength: f64,
}

impl DopplerRecord {
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        frequency: f64,
        velocity: f64,
        signal_strength: f64,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            frequency,
            velocity,
            signal_strength,
        }
    }

    /// Validation flags records with these properties but never removes them.
    pub fn has_invalid_frequency(&self) -> bool {
        self.frequency <= 0.0
    }

    pub fn has_negative_strength(&self) -> bool {
        self.signal_strength < 0.0
    }
}
