pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, `None` on an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn percentage(count: usize, total: usize) -> Option<f64> {
        if total == 0 {
            return None;
        }
        Some(count as f64 / total as f64 * 100.0)
    }

    /// Power ratio in decibels, `None` when the ratio is undefined.
    pub fn ratio_db(signal: f64, noise: f64) -> Option<f64> {
        if !(noise > 0.0 && signal > 0.0) {
            return None;
        }
        Some(10.0 * (signal / noise).log10())
    }
}
