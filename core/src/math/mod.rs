pub mod angle;
pub mod shift;
pub mod stats;

pub use angle::normalize_phase;
pub use shift::{doppler_effect, SPEED_OF_LIGHT};
pub use stats::StatsHelper;
