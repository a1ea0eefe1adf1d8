use std::sync::Arc;

use chrono::{DateTime, Utc};
use watchpost_alert::AlertRunner;
use watchpost_monitor::DeviceMonitor;
use watchpost_storage::Store;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub runner: Arc<AlertRunner>,
    pub monitor: Arc<DeviceMonitor>,
    pub config: Arc<ServerConfig>,
    pub start_time: DateTime<Utc>,
}
