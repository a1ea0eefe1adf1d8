//! Ingestion and listing for the source tables the evaluator scans.

use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use watchpost_storage::{AuthLogRow, LogRow, SystemMetricRow};

use crate::api::pagination::PaginationParams;
use crate::api::{error_response, success_paginated_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;

/// Process/service log row
#[derive(Serialize, ToSchema)]
struct LogResponse {
    id: String,
    name: String,
    host: Option<String>,
    timestamp: DateTime<Utc>,
    pid: Option<i64>,
    action: Option<String>,
    cpu: Option<f64>,
    mem: Option<f64>,
    command: Option<String>,
    port: Option<i64>,
    ip_address: Option<String>,
}

impl From<LogRow> for LogResponse {
    fn from(r: LogRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            host: r.host,
            timestamp: r.timestamp,
            pid: r.pid,
            action: r.action,
            cpu: r.cpu,
            mem: r.mem,
            command: r.command,
            port: r.port,
            ip_address: r.ip_address,
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct CreateLogRequest {
    name: String,
    host: Option<String>,
    /// Defaults to now when omitted
    timestamp: Option<DateTime<Utc>>,
    pid: Option<i64>,
    action: Option<String>,
    cpu: Option<f64>,
    mem: Option<f64>,
    command: Option<String>,
    port: Option<i64>,
    ip_address: Option<String>,
}

/// Auth log line
#[derive(Serialize, ToSchema)]
struct AuthLogResponse {
    id: String,
    timestamp: DateTime<Utc>,
    username: Option<String>,
    log_entry: String,
}

impl From<AuthLogRow> for AuthLogResponse {
    fn from(r: AuthLogRow) -> Self {
        Self {
            id: r.id,
            timestamp: r.timestamp,
            username: r.username,
            log_entry: r.log_entry,
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct CreateAuthLogRequest {
    /// Defaults to now when omitted
    timestamp: Option<DateTime<Utc>>,
    username: Option<String>,
    log_entry: String,
}

/// Sensor sample
#[derive(Serialize, ToSchema)]
struct SystemMetricResponse {
    id: String,
    timestamp: DateTime<Utc>,
    sensor_name: String,
    value: f64,
    host: Option<String>,
}

impl From<SystemMetricRow> for SystemMetricResponse {
    fn from(r: SystemMetricRow) -> Self {
        Self {
            id: r.id,
            timestamp: r.timestamp,
            sensor_name: r.sensor_name,
            value: r.value,
            host: r.host,
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct CreateSystemMetricRequest {
    sensor_name: String,
    value: f64,
    host: Option<String>,
    /// Defaults to now when omitted
    timestamp: Option<DateTime<Utc>>,
}

/// Ingest one process/service log row.
#[utoipa::path(
    post,
    path = "/api/logs",
    tag = "Sources",
    request_body = CreateLogRequest,
    responses(
        (status = 201, description = "Row stored", body = LogResponse),
        (status = 400, description = "Invalid row", body = ApiError)
    )
)]
async fn create_log(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateLogRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "name must not be empty",
        );
    }
    let row = LogRow {
        id: watchpost_common::id::next_id(),
        name: req.name,
        host: req.host,
        timestamp: req.timestamp.unwrap_or_else(Utc::now),
        pid: req.pid,
        action: req.action,
        cpu: req.cpu,
        mem: req.mem,
        command: req.command,
        port: req.port,
        ip_address: req.ip_address,
    };
    match state.store.insert_log(&row).await {
        Ok(created) => success_response(StatusCode::CREATED, &trace_id, LogResponse::from(created)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to insert log row");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// List log rows, newest first.
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Sources",
    params(PaginationParams),
    responses(
        (status = 200, description = "Log page", body = Vec<LogResponse>)
    )
)]
async fn list_logs(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let limit = pagination.limit();
    let offset = pagination.offset();
    let total = match state.store.count_logs().await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count logs");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    };
    match state.store.list_logs(limit, offset).await {
        Ok(rows) => {
            let items: Vec<LogResponse> = rows.into_iter().map(LogResponse::from).collect();
            success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list logs");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Ingest one auth log line.
#[utoipa::path(
    post,
    path = "/api/auth-logs",
    tag = "Sources",
    request_body = CreateAuthLogRequest,
    responses(
        (status = 201, description = "Row stored", body = AuthLogResponse),
        (status = 400, description = "Invalid row", body = ApiError)
    )
)]
async fn create_auth_log(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateAuthLogRequest>,
) -> impl IntoResponse {
    if req.log_entry.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "log_entry must not be empty",
        );
    }
    let row = AuthLogRow {
        id: watchpost_common::id::next_id(),
        timestamp: req.timestamp.unwrap_or_else(Utc::now),
        username: req.username,
        log_entry: req.log_entry,
    };
    match state.store.insert_auth_log(&row).await {
        Ok(created) => {
            success_response(StatusCode::CREATED, &trace_id, AuthLogResponse::from(created))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to insert auth log row");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// List auth log lines, newest first.
#[utoipa::path(
    get,
    path = "/api/auth-logs",
    tag = "Sources",
    params(PaginationParams),
    responses(
        (status = 200, description = "Auth log page", body = Vec<AuthLogResponse>)
    )
)]
async fn list_auth_logs(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let limit = pagination.limit();
    let offset = pagination.offset();
    let total = match state.store.count_auth_logs().await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count auth logs");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    };
    match state.store.list_auth_logs(limit, offset).await {
        Ok(rows) => {
            let items: Vec<AuthLogResponse> =
                rows.into_iter().map(AuthLogResponse::from).collect();
            success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list auth logs");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Ingest one sensor sample.
#[utoipa::path(
    post,
    path = "/api/system-metrics",
    tag = "Sources",
    request_body = CreateSystemMetricRequest,
    responses(
        (status = 201, description = "Row stored", body = SystemMetricResponse),
        (status = 400, description = "Invalid row", body = ApiError)
    )
)]
async fn create_system_metric(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateSystemMetricRequest>,
) -> impl IntoResponse {
    if req.sensor_name.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "sensor_name must not be empty",
        );
    }
    let row = SystemMetricRow {
        id: watchpost_common::id::next_id(),
        timestamp: req.timestamp.unwrap_or_else(Utc::now),
        sensor_name: req.sensor_name,
        value: req.value,
        host: req.host,
    };
    match state.store.insert_system_metric(&row).await {
        Ok(created) => success_response(
            StatusCode::CREATED,
            &trace_id,
            SystemMetricResponse::from(created),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to insert system metric");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// List sensor samples, newest first.
#[utoipa::path(
    get,
    path = "/api/system-metrics",
    tag = "Sources",
    params(PaginationParams),
    responses(
        (status = 200, description = "Metric page", body = Vec<SystemMetricResponse>)
    )
)]
async fn list_system_metrics(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let limit = pagination.limit();
    let offset = pagination.offset();
    let total = match state.store.count_system_metrics().await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count system metrics");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    };
    match state.store.list_system_metrics(limit, offset).await {
        Ok(rows) => {
            let items: Vec<SystemMetricResponse> =
                rows.into_iter().map(SystemMetricResponse::from).collect();
            success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list system metrics");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

pub fn source_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_log, list_logs))
        .routes(routes!(create_auth_log, list_auth_logs))
        .routes(routes!(create_system_metric, list_system_metrics))
}
