use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use watchpost_alert::{AlertRunner, Evaluator, EventRecorder};
use watchpost_monitor::{DeviceMonitor, SystemPinger};
use watchpost_notify::{EmailSender, Notifier};
use watchpost_storage::Store;

use watchpost_server::app;
use watchpost_server::config::ServerConfig;
use watchpost_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    watchpost_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("watchpost=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");
    let config = ServerConfig::load(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.path,
        "watchpost-server starting"
    );

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(Store::connect(&config.database.connection_url()).await?);

    let sender = match &config.smtp {
        Some(smtp) => Some(EmailSender::new(smtp)?),
        None => None,
    };
    let notifier = Arc::new(Notifier::new(store.clone(), sender));

    let runner = Arc::new(AlertRunner::new(
        store.clone(),
        Evaluator::new(store.clone()),
        EventRecorder::new(store.clone(), notifier),
    ));

    let monitor = DeviceMonitor::new(store.clone(), Arc::new(SystemPinger));

    if config.cron_token.is_none() {
        tracing::warn!(
            "No cron_token configured, /api/cron/evaluate-alerts will reject all requests"
        );
    }

    let state = AppState {
        store,
        runner,
        monitor,
        config: Arc::new(config.clone()),
        start_time: Utc::now(),
    };

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;

    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
