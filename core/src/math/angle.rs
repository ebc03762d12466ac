use std::f64::consts::TAU;

/// Wraps a finite phase into `[0, 2π)`.
pub fn normalize_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_phase_is_in_range_and_idempotent() {
        let inputs = [
            0.0,
            -0.0,
            TAU,
            -TAU,
            3.0 * TAU + 0.5,
            -1e-17,
            -7.25,
            1e9,
            -1e9,
            f64::MIN_POSITIVE,
            TAU - f64::EPSILON,
        ];
        for input in inputs {
            let once = normalize_phase(input);
            assert!((0.0..TAU).contains(&once), "{} -> {}", input, once);
            assert_eq!(normalize_phase(once), once);
        }
    }

    #[test]
    fn negative_phase_wraps_forward() {
        let wrapped = normalize_phase(-std::f64::consts::FRAC_PI_2);
        assert!((wrapped - 3.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
