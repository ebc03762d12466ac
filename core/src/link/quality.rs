use serde::{Deserialize, Serialize};
use std::fmt;

/// Instantaneous RF link measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkSample {
    pub signal_strength: f64,
    pub noise_level: f64,
    pub packet_loss_pct: f64,
    pub jitter_ms: f64,
    pub error_rate_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub min_signal_strength: f64,
    pub max_noise_level: f64,
    pub max_packet_loss_pct: f64,
    pub max_jitter_ms: f64,
    pub max_error_rate_pct: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_signal_strength: 2.0,
            max_noise_level: 5.0,
            max_packet_loss_pct: 20.0,
            max_jitter_ms: 50.0,
            max_error_rate_pct: 1.0,
        }
    }
}

/// First threshold a sample breaks, with the measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum QualityViolation {
    LowSignal { value: f64, threshold: f64 },
    HighNoise { value: f64, threshold: f64 },
    PacketLoss { value: f64, threshold: f64 },
    Jitter { value: f64, threshold: f64 },
    ErrorRate { value: f64, threshold: f64 },
}

impl fmt::Display for QualityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            QualityViolation::LowSignal { value, threshold } => {
                write!(f, "low signal strength {:.2} (threshold {:.2})", value, threshold)
            }
            QualityViolation::HighNoise { value, threshold } => {
                write!(f, "high noise level {:.2} (threshold {:.2})", value, threshold)
            }
            QualityViolation::PacketLoss { value, threshold } => {
                write!(f, "excessive packet loss {:.2}% (threshold {:.2}%)", value, threshold)
            }
            QualityViolation::Jitter { value, threshold } => {
                write!(f, "high jitter {:.2}ms (threshold {:.2}ms)", value, threshold)
            }
            QualityViolation::ErrorRate { value, threshold } => {
                write!(f, "high error rate {:.2}% (threshold {:.2}%)", value, threshold)
            }
        }
    }
}

impl QualityThresholds {
    /// Checks signal, noise, packet loss, jitter and error rate in that order.
    pub fn evaluate(&self, sample: &LinkSample) -> Result<(), QualityViolation> {
        if sample.signal_strength < self.min_signal_strength {
            return Err(QualityViolation::LowSignal {
                value: sample.signal_strength,
                threshold: self.min_signal_strength,
            });
        }
        if sample.noise_level > self.max_noise_level {
            return Err(QualityViolation::HighNoise {
                value: sample.noise_level,
                threshold: self.max_noise_level,
            });
        }
        if sample.packet_loss_pct > self.max_packet_loss_pct {
            return Err(QualityViolation::PacketLoss {
                value: sample.packet_loss_pct,
                threshold: self.max_packet_loss_pct,
            });
        }
        if sample.jitter_ms > self.max_jitter_ms {
            return Err(QualityViolation::Jitter {
                value: sample.jitter_ms,
                threshold: self.max_jitter_ms,
            });
        }
        if sample.error_rate_pct > self.max_error_rate_pct {
            return Err(QualityViolation::ErrorRate {
                value: sample.error_rate_pct,
                threshold: self.max_error_rate_pct,
            });
        }
        Ok(())
    }
}
