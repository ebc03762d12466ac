use chrono::Utc;
use linkcore::link::LinkSample;
use linkcore::math::{doppler_effect, SPEED_OF_LIGHT};
use linkcore::records::{CarrierRecord, DopplerRecord};
use rand::distributions::Alphanumeric;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

const ID_LENGTH: usize = 10;

/// Ranges the synthetic records are drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub carrier_base_hz: f64,
    pub carrier_deviation_hz: f64,
    pub amplitude_min: f64,
    pub amplitude_max: f64,
    pub noise_min: f64,
    pub noise_max: f64,
    pub doppler_base_hz: f64,
    pub max_velocity: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            carrier_base_hz: 1.8e9,
            carrier_deviation_hz: 500.0,
            amplitude_min: 0.8,
            amplitude_max: 1.2,
            noise_min: 0.01,
            noise_max: 0.1,
            doppler_base_hz: 2.4e9,
            max_velocity: 5000.0,
        }
    }
}

/// Seeded producer of carrier, Doppler and link-quality samples.
pub struct SignalGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SignalGenerator {
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn record_id(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect()
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.rng.gen_range(low..high)
        } else {
            low
        }
    }

    pub fn carrier(&mut self) -> CarrierRecord {
        let cfg = self.config;
        let frequency = cfg.carrier_base_hz
            + self.uniform(-cfg.carrier_deviation_hz, cfg.carrier_deviation_hz);
        let phase = self.uniform(0.0, TAU);
        let amplitude = self.uniform(cfg.amplitude_min, cfg.amplitude_max);
        let noise_level = self.uniform(cfg.noise_min, cfg.noise_max);
        CarrierRecord::new(
            self.record_id(),
            Utc::now(),
            frequency,
            phase,
            amplitude,
            noise_level,
        )
    }

    pub fn doppler(&mut self) -> DopplerRecord {
        let max_velocity = self.config.max_velocity;
        let velocity = self.uniform(-max_velocity, max_velocity);
        let frequency = doppler_effect(self.config.doppler_base_hz, velocity, SPEED_OF_LIGHT);
        let signal_strength = self.uniform(0.0, 1.0);
        DopplerRecord::new(
            self.record_id(),
            Utc::now(),
            frequency,
            velocity,
            signal_strength,
        )
    }

    pub fn link_sample(&mut self) -> LinkSample {
        LinkSample {
            signal_strength: self.uniform(0.0, 10.0),
            noise_level: self.uniform(0.0, 5.0),
            packet_loss_pct: self.uniform(0.0, 100.0),
            jitter_ms: self.uniform(0.0, 50.0),
            error_rate_pct: self.uniform(0.0, 1.0),
        }
    }
}
