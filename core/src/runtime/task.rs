use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Background loop that runs one tick per interval until cancelled.
///
/// Cancellation is only observed between ticks: a tick that has started always
/// runs to completion. All waiting goes through `tokio::time`, so a paused
/// runtime drives the loop on virtual time.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    name: String,
    interval: Duration,
    delay_first_tick: bool,
}

impl PeriodicTask {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            delay_first_tick: false,
        }
    }

    /// Waits one interval before the first tick instead of ticking at once.
    pub fn delay_first_tick(mut self) -> Self {
        self.delay_first_tick = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn spawn<F, Fut>(self, token: CancellationToken, tick: F) -> JoinHandle<u64>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(self.run(token, tick))
    }

    /// Runs the loop on the current task and returns the number of ticks.
    pub async fn run<F, Fut>(self, token: CancellationToken, mut tick: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut ticks = 0u64;
        if self.delay_first_tick && !self.pause(&token).await {
            return ticks;
        }

        while !token.is_cancelled() {
            tick().await;
            ticks += 1;
            if !self.pause(&token).await {
                break;
            }
        }

        debug!("[{}] stopped after {} ticks", self.name, ticks);
        ticks
    }

    // false when cancelled during the wait
    async fn pause(&self, token: &CancellationToken) -> bool {
        tokio::select! {
            _ = token.cancelled() => false,
            _ = tokio::time::sleep(self.interval) => true,
        }
    }
}
