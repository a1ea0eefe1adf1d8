use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use watchpost_common::types::{DeviceStatus, StatusUpdate};
use watchpost_storage::Store;

use crate::pinger::Pinger;

const POLL_INTERVAL: Duration = Duration::from_secs(30);
const ERROR_BACKOFF: Duration = Duration::from_secs(10);
const CHANNEL_CAPACITY: usize = 256;

/// Owns the per-device status map, the broadcast channel and the run guard
/// for the ping loop.
///
/// Devices without an IP address are skipped; a ping failure of any kind
/// counts as offline. A delta is broadcast only when a device changes
/// state, and the first observation of a device counts as a change.
pub struct DeviceMonitor {
    store: Arc<Store>,
    pinger: Arc<dyn Pinger>,
    tx: broadcast::Sender<StatusUpdate>,
    statuses: Mutex<HashMap<String, DeviceStatus>>,
    running: AtomicBool,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl DeviceMonitor {
    pub fn new(store: Arc<Store>, pinger: Arc<dyn Pinger>) -> Arc<Self> {
        Self::with_intervals(store, pinger, POLL_INTERVAL, ERROR_BACKOFF)
    }

    pub fn with_intervals(
        store: Arc<Store>,
        pinger: Arc<dyn Pinger>,
        poll_interval: Duration,
        error_backoff: Duration,
    ) -> Arc<Self> {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Arc::new(Self {
            store,
            pinger,
            tx,
            statuses: Mutex::new(HashMap::new()),
            running: AtomicBool::new(false),
            poll_interval,
            error_backoff,
        })
    }

    /// Register a subscriber and start the poll loop if it is not running.
    pub fn subscribe(self: &Arc<Self>) -> broadcast::Receiver<StatusUpdate> {
        let rx = self.tx.subscribe();
        if !self.running.swap(true, Ordering::SeqCst) {
            let monitor = Arc::clone(self);
            tokio::spawn(async move {
                monitor.run_loop().await;
            });
        }
        rx
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    async fn run_loop(&self) {
        tracing::info!("Device monitor started");
        loop {
            if self.tx.receiver_count() == 0 {
                self.running.store(false, Ordering::SeqCst);
                // A subscriber arriving between the count check and the store
                // saw the guard still set and spawned no loop; adopt it here
                // instead of leaving its receiver without a poller.
                if self.tx.receiver_count() > 0 && !self.running.swap(true, Ordering::SeqCst) {
                    continue;
                }
                tracing::info!("Last subscriber gone, device monitor stopped");
                return;
            }
            match self.poll_once().await {
                Ok(changes) => {
                    if changes > 0 {
                        tracing::debug!(changes, "Device poll cycle complete");
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Device poll cycle failed");
                    tokio::time::sleep(self.error_backoff).await;
                }
            }
        }
    }

    /// One poll cycle. Returns the number of deltas broadcast.
    pub async fn poll_once(&self) -> Result<usize> {
        let devices = self.store.list_devices().await?;
        let mut changes = 0usize;

        for device in devices {
            let Some(ip) = &device.ip_address else {
                continue;
            };
            let status = if self.pinger.ping(ip).await {
                DeviceStatus::Online
            } else {
                DeviceStatus::Offline
            };

            let changed = {
                let mut statuses = self.statuses.lock().await;
                match statuses.insert(device.id.clone(), status) {
                    Some(previous) => previous != status,
                    None => true,
                }
            };

            if changed {
                changes += 1;
                tracing::info!(device_id = %device.id, status = %status, "Device status changed");
                // send only fails with zero receivers, which is fine here
                let _ = self.tx.send(StatusUpdate {
                    device_id: device.id.clone(),
                    status,
                    timestamp: Utc::now(),
                });
            }
        }

        Ok(changes)
    }
}
