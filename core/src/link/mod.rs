pub mod monitor;
pub mod quality;
pub mod stability;

pub use monitor::{ConnectionMonitor, LinkState, Transport};
pub use quality::{LinkSample, QualityThresholds, QualityViolation};
pub use stability::{StabilityGuard, StabilityOutcome};
