use crate::prelude::RetryPolicy;
use std::time::Duration;

/// Progress notifications emitted by [`retry_with_backoff`].
///
/// All methods default to no-ops so implementors only override what they show.
pub trait RetryObserver: Send + Sync {
    fn on_attempt(&self, _label: &str, _attempt: u32, _max_attempts: u32) {}

    fn on_success(&self, _label: &str, _attempt: u32) {}

    /// `retry_in` is `None` when the failed attempt was the last one.
    fn on_failure(&self, _label: &str, _attempt: u32, _retry_in: Option<Duration>) {}

    fn on_exhausted(&self, _label: &str, _attempts: u32) {}
}

/// Observer that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RetryObserver for SilentObserver {}

/// Invokes `check` up to `policy.max_attempts` times, sleeping `policy.delay`
/// between failures.
///
/// Returns `true` on the first success and `false` once the budget is spent.
/// There is no sleep after the final failed attempt, and a zero budget never
/// invokes `check`.
pub async fn retry_with_backoff<F>(
    label: &str,
    mut check: F,
    policy: RetryPolicy,
    observer: &dyn RetryObserver,
) -> bool
where
    F: FnMut() -> bool,
{
    for attempt in 1..=policy.max_attempts {
        observer.on_attempt(label, attempt, policy.max_attempts);
        if check() {
            observer.on_success(label, attempt);
            return true;
        }

        let last = attempt == policy.max_attempts;
        observer.on_failure(label, attempt, (!last).then_some(policy.delay));
        if !last {
            tokio::time::sleep(policy.delay).await;
        }
    }

    observer.on_exhausted(label, policy.max_attempts);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl RetryObserver for Recording {
        fn on_failure(&self, label: &str, attempt: u32, retry_in: Option<Duration>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}:{:?}", label, attempt, retry_in));
        }

        fn on_exhausted(&self, label: &str, attempts: u32) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:exhausted:{}", label, attempts));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        let start = Instant::now();

        let ok = retry_with_backoff(
            "crc",
            || {
                calls += 1;
                calls > 3
            },
            policy,
            &SilentObserver,
        )
        .await;

        assert!(ok);
        assert_eq!(calls, 4);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_budget() {
        let mut calls = 0;
        let observer = Recording::default();
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        let start = Instant::now();

        let ok = retry_with_backoff(
            "ldpc",
            || {
                calls += 1;
                false
            },
            policy,
            &observer,
        )
        .await;

        assert!(!ok);
        assert_eq!(calls, 5);
        assert_eq!(start.elapsed(), Duration::from_millis(400));
        let events = observer.events.lock().unwrap();
        assert_eq!(events[4], "ldpc:5:None");
        assert_eq!(events[5], "ldpc:exhausted:5");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_never_checks() {
        let mut calls = 0;
        let ok = retry_with_backoff(
            "fec",
            || {
                calls += 1;
                true
            },
            RetryPolicy::new(0, Duration::from_secs(1)),
            &SilentObserver,
        )
        .await;

        assert!(!ok);
        assert_eq!(calls, 0);
    }
}
