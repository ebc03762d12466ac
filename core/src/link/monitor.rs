use crate::prelude::{LinkError, LinkResult};
use crate::runtime::PeriodicTask;
use crate::telemetry::LinkMetrics;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Connected,
    Disconnected,
}

/// Moves one encoded frame across the link. `false` means the transfer failed.
pub trait Transport: Send {
    fn transmit(&mut self, frame: &[u8]) -> bool;
}

/// Two-state link tracker.
///
/// A failed transfer drops the link to [`LinkState::Disconnected`]; only
/// [`reconnect`](Self::reconnect) brings it back.
pub struct ConnectionMonitor<T> {
    state: Mutex<LinkState>,
    transport: Mutex<T>,
    metrics: Arc<LinkMetrics>,
    reconnect_delay: Duration,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Transport> ConnectionMonitor<T> {
    pub fn new(transport: T, metrics: Arc<LinkMetrics>, reconnect_delay: Duration) -> Self {
        Self {
            state: Mutex::new(LinkState::Connected),
            transport: Mutex::new(transport),
            metrics,
            reconnect_delay,
        }
    }

    pub fn state(&self) -> LinkState {
        *lock(&self.state)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    pub fn metrics(&self) -> &Arc<LinkMetrics> {
        &self.metrics
    }

    /// Encodes `record` and hands it to the transport.
    ///
    /// Fails without touching the transport while disconnected. A failed
    /// transfer marks the link disconnected.
    pub fn send_data<R: Serialize>(&self, record: &R) -> LinkResult<()> {
        if !self.is_connected() {
            return Err(LinkError::Disconnected);
        }

        let frame = serde_json::to_vec(record)?;
        let delivered = lock(&self.transport).transmit(&frame);
        if delivered {
            self.metrics.record_frame_sent();
            Ok(())
        } else {
            *lock(&self.state) = LinkState::Disconnected;
            self.metrics.record_failed_send();
            warn!("transfer of {} bytes failed, link disconnected", frame.len());
            Err(LinkError::TransferFailed)
        }
    }

    /// Waits out the reconnection delay and restores the link.
    ///
    /// There is no attempt cap: the call always ends connected.
    pub async fn reconnect(&self) {
        self.metrics.record_reconnect_attempt();
        info!("attempting to reconnect...");
        tokio::time::sleep(self.reconnect_delay).await;
        *lock(&self.state) = LinkState::Connected;
        self.metrics.record_reconnect_success();
        info!("reconnection successful");
    }
}

impl<T: Transport + 'static> ConnectionMonitor<T> {
    /// Spawns the poll loop that reconnects whenever the link is observed down.
    pub fn spawn_poll(self: &Arc<Self>, interval: Duration, token: CancellationToken) -> JoinHandle<u64> {
        let monitor = Arc::clone(self);
        PeriodicTask::new("link-poll", interval)
            .delay_first_tick()
            .spawn(token, move || {
                let monitor = monitor.clone();
                async move {
                    if !monitor.is_connected() {
                        monitor.reconnect().await;
                    }
                }
            })
    }
}
