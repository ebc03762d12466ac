use crate::retry::RetryObserver;
use log::{error, info, warn};
use std::time::Duration;

/// Writes retry progress through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl RetryObserver for LogObserver {
    fn on_attempt(&self, label: &str, attempt: u32, max_attempts: u32) {
        info!("{}: attempt {}/{}", label, attempt, max_attempts);
    }

    fn on_success(&self, label: &str, attempt: u32) {
        info!("{}: succeeded on attempt {}", label, attempt);
    }

    fn on_failure(&self, label: &str, attempt: u32, retry_in: Option<Duration>) {
        match retry_in {
            Some(delay) => warn!("{}: attempt {} failed, retrying in {:?}", label, attempt, delay),
            None => warn!("{}: attempt {} failed", label, attempt),
        }
    }

    fn on_exhausted(&self, label: &str, attempts: u32) {
        error!("{}: maximum of {} attempts reached", label, attempts);
    }
}
