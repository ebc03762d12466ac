use linkcore::link::Transport;
use linkcore::retry::IntegrityCheck;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

// NaN maps to 0 so `gen_bool` never sees an invalid probability.
fn probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Transport that drops frames at random with a fixed failure rate.
pub struct LossyTransport {
    failure_rate: f64,
    rng: StdRng,
}

impl LossyTransport {
    pub fn new(failure_rate: f64, seed: u64) -> Self {
        Self {
            failure_rate: probability(failure_rate),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Transport for LossyTransport {
    fn transmit(&mut self, frame: &[u8]) -> bool {
        let delivered = !self.rng.gen_bool(self.failure_rate);
        debug!("frame of {} bytes delivered: {}", frame.len(), delivered);
        delivered
    }
}

/// Stand-in for a real CRC/LDPC/FEC decoder: passes with a fixed probability.
pub struct RandomCheck {
    name: String,
    success_probability: f64,
    rng: StdRng,
}

impl RandomCheck {
    pub fn new(name: impl Into<String>, success_probability: f64, seed: u64) -> Self {
        Self {
            name: name.into(),
            success_probability: probability(success_probability),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IntegrityCheck for RandomCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&mut self, payload: &[u8]) -> bool {
        debug!("performing {} over {} bytes", self.name, payload.len());
        self.rng.gen_bool(self.success_probability)
    }
}
