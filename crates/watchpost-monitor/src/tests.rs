use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use watchpost_common::types::DeviceStatus;
use watchpost_storage::{DeviceRow, Store};

use crate::monitor::DeviceMonitor;
use crate::pinger::Pinger;

struct ScriptedPinger {
    online: AtomicBool,
}

impl ScriptedPinger {
    fn new(online: bool) -> Arc<Self> {
        Arc::new(Self {
            online: AtomicBool::new(online),
        })
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl Pinger for ScriptedPinger {
    async fn ping(&self, _ip: &str) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

async fn store_with_device(ip: Option<&str>) -> Arc<Store> {
    let store = Arc::new(Store::connect("sqlite::memory:").await.expect("store"));
    store
        .insert_device(&DeviceRow {
            id: "d1".to_string(),
            name: "gateway".to_string(),
            ip_address: ip.map(str::to_string),
            mac_address: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn broadcasts_once_per_status_flip() {
    let store = store_with_device(Some("10.0.0.1")).await;
    let pinger = ScriptedPinger::new(true);
    let monitor = DeviceMonitor::new(store, pinger.clone());

    // first observation counts as a change
    assert_eq!(monitor.poll_once().await.unwrap(), 1);
    // steady state is silent
    assert_eq!(monitor.poll_once().await.unwrap(), 0);
    assert_eq!(monitor.poll_once().await.unwrap(), 0);

    pinger.set_online(false);
    assert_eq!(monitor.poll_once().await.unwrap(), 1);
    assert_eq!(monitor.poll_once().await.unwrap(), 0);

    pinger.set_online(true);
    assert_eq!(monitor.poll_once().await.unwrap(), 1);
}

#[tokio::test]
async fn devices_without_ip_are_skipped() {
    let store = store_with_device(None).await;
    let monitor = DeviceMonitor::new(store, ScriptedPinger::new(true));
    assert_eq!(monitor.poll_once().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn loop_delivers_deltas_to_subscribers() {
    let store = store_with_device(Some("10.0.0.1")).await;
    let pinger = ScriptedPinger::new(true);
    let monitor =
        DeviceMonitor::with_intervals(store, pinger.clone(), Duration::from_secs(30), Duration::from_secs(10));

    let mut rx = monitor.subscribe();
    assert!(monitor.is_running());

    let first = rx.recv().await.unwrap();
    assert_eq!(first.device_id, "d1");
    assert_eq!(first.status, DeviceStatus::Online);

    pinger.set_online(false);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.status, DeviceStatus::Offline);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn subscriber_arriving_during_shutdown_is_not_orphaned() {
    let store = store_with_device(Some("10.0.0.1")).await;
    let monitor = DeviceMonitor::with_intervals(
        store,
        ScriptedPinger::new(true),
        Duration::from_millis(5),
        Duration::from_millis(5),
    );

    // Race the loop's shutdown decision: drop the last receiver and
    // immediately subscribe again. The new receiver must always end up
    // with a running poll loop, whether the old loop adopted it or a
    // fresh one was spawned.
    for _ in 0..50 {
        let rx = monitor.subscribe();
        drop(rx);
        let rx = monitor.subscribe();

        let mut running = false;
        for _ in 0..200 {
            if monitor.is_running() {
                running = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(
            running,
            "a connected subscriber must have a running poll loop"
        );
        drop(rx);

        // let the loop observe the empty channel before the next round
        for _ in 0..200 {
            if !monitor.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn loop_stops_after_last_subscriber_and_restarts() {
    let store = store_with_device(Some("10.0.0.1")).await;
    let pinger = ScriptedPinger::new(true);
    let monitor =
        DeviceMonitor::with_intervals(store, pinger.clone(), Duration::from_secs(30), Duration::from_secs(10));

    let mut rx = monitor.subscribe();
    rx.recv().await.unwrap();
    drop(rx);

    // let the loop observe the empty channel on its next wakeup
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_secs(31)).await;
        if !monitor.is_running() {
            break;
        }
    }
    assert!(!monitor.is_running());

    // a new subscriber brings it back; the status map survives, so an
    // unchanged device produces no replayed delta
    let mut rx = monitor.subscribe();
    assert!(monitor.is_running());

    pinger.set_online(false);
    let update = rx.recv().await.unwrap();
    assert_eq!(update.status, DeviceStatus::Offline);
}
