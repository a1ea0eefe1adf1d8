#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use watchpost_alert::{AlertRunner, Evaluator, EventRecorder};
use watchpost_monitor::{DeviceMonitor, Pinger};
use watchpost_notify::Notifier;
use watchpost_server::app;
use watchpost_server::config::ServerConfig;
use watchpost_server::state::AppState;
use watchpost_storage::Store;

pub const CRON_TOKEN: &str = "test-token";

pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
}

/// Always-reachable pinger so tests never shell out.
struct AlwaysUpPinger;

#[async_trait]
impl Pinger for AlwaysUpPinger {
    async fn ping(&self, _ip: &str) -> bool {
        true
    }
}

pub async fn build_test_context() -> Result<TestContext> {
    watchpost_common::id::init(1, 1);

    let store = Arc::new(Store::connect("sqlite::memory:").await?);
    let notifier = Arc::new(Notifier::new(store.clone(), None));
    let runner = Arc::new(AlertRunner::new(
        store.clone(),
        Evaluator::new(store.clone()),
        EventRecorder::new(store.clone(), notifier),
    ));
    let monitor = DeviceMonitor::new(store.clone(), Arc::new(AlwaysUpPinger));

    let config = ServerConfig {
        cron_token: Some(CRON_TOKEN.to_string()),
        ..ServerConfig::default()
    };

    let state = AppState {
        store,
        runner,
        monitor,
        config: Arc::new(config),
        start_time: Utc::now(),
    };

    let app = app::build_http_app(state.clone());

    Ok(TestContext { state, app })
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder = builder.header("Content-Type", "application/json");

    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = builder
        .body(Body::from(req_body))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let req = builder.body(Body::empty()).expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json.get("data").is_some());
    assert!(json["data"].is_null());
}

/// Create a valid system_metrics condition and return its ID.
pub async fn create_cpu_condition(app: &axum::Router, name: &str) -> String {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/api/alerts/conditions",
        None,
        Some(serde_json::json!({
            "name": name,
            "source_table": "system_metrics",
            "field_name": "cpu_temp",
            "comparator": ">",
            "threshold_value": "80",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"]
        .as_str()
        .expect("condition id should exist")
        .to_string()
}

/// Ingest one sensor sample stamped now.
pub async fn ingest_metric(app: &axum::Router, sensor_name: &str, value: f64) {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/api/system-metrics",
        None,
        Some(serde_json::json!({
            "sensor_name": sensor_name,
            "value": value,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ok_envelope(&body);
}
