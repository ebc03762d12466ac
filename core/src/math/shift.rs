/// Propagation speed used for synthetic Doppler records, m/s.
pub const SPEED_OF_LIGHT: f64 = 3e8;

/// Frequency observed from a source at `original_hz` moving at `velocity`.
pub fn doppler_effect(original_hz: f64, velocity: f64, speed_of_light: f64) -> f64 {
    original_hz * ((speed_of_light + velocity) / speed_of_light)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_source_is_unshifted() {
        assert_eq!(doppler_effect(2.4e9, 0.0, SPEED_OF_LIGHT), 2.4e9);
    }

    #[test]
    fn closing_source_shifts_up() {
        let shifted = doppler_effect(2.4e9, 3000.0, SPEED_OF_LIGHT);
        assert!((shifted - 2.400024e9).abs() < 1e-3);
    }
}
