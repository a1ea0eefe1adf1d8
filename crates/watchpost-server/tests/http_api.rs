mod common;

use axum::http::StatusCode;
use common::{
    assert_err_envelope, assert_ok_envelope, build_test_context, create_cpu_condition,
    ingest_metric, request_json, request_no_body, CRON_TOKEN,
};
use serde_json::json;

#[tokio::test]
async fn health_should_return_ok_envelope() {
    let ctx = build_test_context().await.expect("test context should build");
    let (status, body, trace) = request_no_body(&ctx.app, "GET", "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert!(body["data"]["version"].is_string());
    assert_eq!(body["data"]["unresolved_alerts"], 0);
    assert_eq!(body["data"]["monitor_running"], false);
    assert!(trace.is_some());
}

#[tokio::test]
async fn condition_crud_roundtrip() {
    let ctx = build_test_context().await.expect("test context should build");

    let id = create_cpu_condition(&ctx.app, "cpu-hot").await;

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", &format!("/api/alerts/conditions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "cpu-hot");
    assert_eq!(body["data"]["active"], true);
    assert_eq!(body["data"]["comparator"], ">");
    assert!(body["data"]["last_triggered_at"].is_null());

    // Partial update, nulling the window
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/api/alerts/conditions/{id}"),
        None,
        Some(json!({"threshold_value": "90", "time_window_min": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["threshold_value"], "90");
    assert!(body["data"]["time_window_min"].is_null());

    // Deactivate
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/api/alerts/conditions/{id}/active"),
        None,
        Some(json!({"active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], false);

    // Filtered list only returns active conditions
    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/alerts/conditions?active__eq=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (status, _, _) = request_no_body(
        &ctx.app,
        "DELETE",
        &format!("/api/alerts/conditions/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", &format!("/api/alerts/conditions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn invalid_condition_tuples_are_rejected_with_400() {
    let ctx = build_test_context().await.expect("test context should build");

    // contains against a numeric source
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/alerts/conditions",
        None,
        Some(json!({
            "name": "bad",
            "source_table": "system_metrics",
            "field_name": "cpu_temp",
            "comparator": "contains",
            "threshold_value": "80",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);

    // non-numeric threshold for a numeric comparator
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/alerts/conditions",
        None,
        Some(json!({
            "name": "bad",
            "source_table": "logs",
            "field_name": "cpu",
            "comparator": ">",
            "threshold_value": "lots",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);

    // unknown table
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/alerts/conditions",
        None,
        Some(json!({
            "name": "bad",
            "source_table": "firewall",
            "field_name": "cpu",
            "comparator": ">",
            "threshold_value": "1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);

    // update that would break a valid condition
    let id = create_cpu_condition(&ctx.app, "ok").await;
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/api/alerts/conditions/{id}"),
        None,
        Some(json!({"comparator": "contains"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1101);
}

#[tokio::test]
async fn condition_referencing_unknown_template_is_rejected() {
    let ctx = build_test_context().await.expect("test context should build");

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/alerts/conditions",
        None,
        Some(json!({
            "name": "with-template",
            "source_table": "system_metrics",
            "field_name": "cpu_temp",
            "comparator": ">",
            "threshold_value": "80",
            "email_template_id": "no-such-template",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1102);
}

#[tokio::test]
async fn event_resolution_is_exactly_once() {
    let ctx = build_test_context().await.expect("test context should build");

    let condition_id = create_cpu_condition(&ctx.app, "cpu-hot").await;
    ingest_metric(&ctx.app, "cpu_temp", 95.0).await;

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["triggered"], 1);

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/api/alerts/events?condition_id__eq={condition_id}&resolved__eq=false"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    let event_id = items[0]["id"].as_str().expect("event id").to_string();

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/unresolved-count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    // First resolve mutates
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/api/alerts/events/{event_id}/resolve"),
        None,
        Some(json!({"notes": "restarted the fan"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["modified"], true);

    // Second resolve is a no-op
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        &format!("/api/alerts/events/{event_id}/resolve"),
        None,
        Some(json!({"notes": "again"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["modified"], false);

    let (status, body, _) = request_no_body(
        &ctx.app,
        "GET",
        &format!("/api/alerts/events/{event_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["resolved"], true);
    let notes = body["data"]["notes"].as_str().expect("notes");
    assert!(notes.contains("Resolution notes: restarted the fan"));
    assert!(!notes.contains("again"));

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/unresolved-count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);

    // Resolving a missing event is 404
    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/alerts/events/does-not-exist/resolve",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn resolve_all_clears_every_open_event() {
    let ctx = build_test_context().await.expect("test context should build");

    create_cpu_condition(&ctx.app, "cpu-hot").await;
    create_cpu_condition(&ctx.app, "cpu-hot-too").await;
    ingest_metric(&ctx.app, "cpu_temp", 95.0).await;

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["triggered"], 2);

    let (status, body, _) = request_no_body(&ctx.app, "POST", "/api/alerts/resolve-all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["resolved"], 2);

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/unresolved-count", None).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn cron_route_requires_bearer_token() {
    let ctx = build_test_context().await.expect("test context should build");

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/cron/evaluate-alerts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_err_envelope(&body, 1002);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/cron/evaluate-alerts", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_err_envelope(&body, 1002);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/cron/evaluate-alerts", Some(CRON_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ok_envelope(&body);
    assert_eq!(body["data"]["triggered"], 0);
}

#[tokio::test]
async fn debug_run_reports_inactive_conditions_without_events() {
    let ctx = build_test_context().await.expect("test context should build");

    let id = create_cpu_condition(&ctx.app, "cpu-hot").await;
    let (status, _, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/api/alerts/conditions/{id}/active"),
        None,
        Some(json!({"active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    ingest_metric(&ctx.app, "cpu_temp", 95.0).await;

    // The standard check skips the inactive condition
    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/check", None).await;
    assert_eq!(body["data"]["evaluated"], 0);

    // Debug evaluates it and includes samples, but records nothing
    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/debug", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["evaluated"], 1);
    assert_eq!(body["data"]["triggered"], 1);
    let samples = body["data"]["results"][0]["sample_matches"]
        .as_array()
        .expect("sample matches");
    assert!(!samples.is_empty());

    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/unresolved-count", None).await;
    assert_eq!(body["data"]["count"], 0);

    // Opting in creates the event
    let (status, _, _) = request_no_body(
        &ctx.app,
        "GET",
        "/api/alerts/debug?create_events=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body, _) = request_no_body(&ctx.app, "GET", "/api/alerts/unresolved-count", None).await;
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn device_crud_and_null_clearing() {
    let ctx = build_test_context().await.expect("test context should build");

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/devices",
        None,
        Some(json!({"name": "rack-switch", "ip_address": "10.0.0.2", "notes": "top of rack"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().expect("device id").to_string();

    // Explicit null clears, absent field is untouched
    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/api/devices/{id}"),
        None,
        Some(json!({"ip_address": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["ip_address"].is_null());
    assert_eq!(body["data"]["notes"], "top of rack");

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, _, _) =
        request_no_body(&ctx.app, "DELETE", &format!("/api/devices/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", &format!("/api/devices/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_err_envelope(&body, 1004);
}

#[tokio::test]
async fn source_ingestion_validates_and_paginates() {
    let ctx = build_test_context().await.expect("test context should build");

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/logs",
        None,
        Some(json!({"name": "", "cpu": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    for i in 0..3 {
        let (status, _, _) = request_json(
            &ctx.app,
            "POST",
            "/api/logs",
            None,
            Some(json!({"name": format!("proc-{i}"), "cpu": 10.0 * i as f64})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body, _) =
        request_no_body(&ctx.app, "GET", "/api/logs?limit=2&offset=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"]["limit"], 2);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/auth-logs",
        None,
        Some(json!({"log_entry": "Failed password for root", "username": "root"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ok_envelope(&body);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/auth-logs",
        None,
        Some(json!({"log_entry": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/auth-logs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/system-metrics",
        None,
        Some(json!({"sensor_name": "", "value": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_err_envelope(&body, 1001);
}

#[tokio::test]
async fn template_names_are_unique() {
    let ctx = build_test_context().await.expect("test context should build");

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/email-templates",
        None,
        Some(json!({
            "name": "ops-alert",
            "subject": "Alert: {{alertName}}",
            "body": "Triggered at {{alertTime}}: {{notes}}",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().expect("template id").to_string();

    let (status, body, _) = request_json(
        &ctx.app,
        "POST",
        "/api/email-templates",
        None,
        Some(json!({"name": "ops-alert", "subject": "x", "body": "y"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_err_envelope(&body, 1005);

    let (status, body, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/api/email-templates/{id}"),
        None,
        Some(json!({"subject": "Updated: {{alertName}}"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subject"], "Updated: {{alertName}}");
    assert_eq!(body["data"]["name"], "ops-alert");

    // A condition can reference it once it exists
    let (status, _, _) = request_json(
        &ctx.app,
        "POST",
        "/api/alerts/conditions",
        None,
        Some(json!({
            "name": "with-template",
            "source_table": "system_metrics",
            "field_name": "cpu_temp",
            "comparator": ">",
            "threshold_value": "80",
            "email_template_id": id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = request_no_body(
        &ctx.app,
        "DELETE",
        &format!("/api/email-templates/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn mutations_leave_an_audit_trail() {
    let ctx = build_test_context().await.expect("test context should build");

    let id = create_cpu_condition(&ctx.app, "cpu-hot").await;
    let (status, _, _) = request_no_body(
        &ctx.app,
        "DELETE",
        &format!("/api/alerts/conditions/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = request_no_body(&ctx.app, "GET", "/api/activity", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    let actions: Vec<&str> = body["data"]["items"]
        .as_array()
        .expect("items array")
        .iter()
        .filter_map(|i| i["action_type"].as_str())
        .collect();
    assert!(actions.contains(&"condition_created"));
    assert!(actions.contains(&"condition_deleted"));
}
