use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use watchpost_alert::{CheckOptions, CheckReport, CompiledCondition};
use watchpost_storage::{
    AlertConditionRow, AlertConditionUpdate, AlertEventFilter, AlertEventRow, ResolveOutcome,
};

use crate::api::pagination::PaginationParams;
use crate::api::{
    error_response, log_activity, success_paginated_response, success_response, ApiError,
};
use crate::logging::TraceId;
use crate::state::AppState;

const EXTENDED_WINDOW_MIN: i64 = 24 * 60;

/// Alert condition
#[derive(Serialize, ToSchema)]
struct ConditionResponse {
    id: String,
    name: String,
    source_table: String,
    field_name: String,
    comparator: String,
    threshold_value: String,
    time_window_min: Option<i64>,
    repeat_interval_min: Option<i64>,
    count_threshold: Option<i64>,
    last_triggered_at: Option<DateTime<Utc>>,
    active: bool,
    email_template_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AlertConditionRow> for ConditionResponse {
    fn from(r: AlertConditionRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            source_table: r.source_table,
            field_name: r.field_name,
            comparator: r.comparator,
            threshold_value: r.threshold_value,
            time_window_min: r.time_window_min,
            repeat_interval_min: r.repeat_interval_min,
            count_threshold: r.count_threshold,
            last_triggered_at: r.last_triggered_at,
            active: r.active,
            email_template_id: r.email_template_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Alert event
#[derive(Serialize, ToSchema)]
struct EventResponse {
    id: String,
    condition_id: String,
    triggered_at: DateTime<Utc>,
    resolved: bool,
    resolved_at: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl From<AlertEventRow> for EventResponse {
    fn from(r: AlertEventRow) -> Self {
        Self {
            id: r.id,
            condition_id: r.condition_id,
            triggered_at: r.triggered_at,
            resolved: r.resolved,
            resolved_at: r.resolved_at,
            notes: r.notes,
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct CreateConditionRequest {
    name: String,
    source_table: String,
    field_name: String,
    comparator: String,
    threshold_value: String,
    time_window_min: Option<i64>,
    repeat_interval_min: Option<i64>,
    count_threshold: Option<i64>,
    email_template_id: Option<String>,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
struct UpdateConditionRequest {
    name: Option<String>,
    source_table: Option<String>,
    field_name: Option<String>,
    comparator: Option<String>,
    threshold_value: Option<String>,
    time_window_min: Option<Option<i64>>,
    repeat_interval_min: Option<Option<i64>>,
    count_threshold: Option<Option<i64>>,
    email_template_id: Option<Option<String>>,
}

#[derive(Deserialize, ToSchema)]
struct SetActiveRequest {
    active: bool,
}

#[derive(Deserialize, ToSchema)]
struct ResolveRequest {
    notes: Option<String>,
}

/// Create an alert condition.
/// The (source_table, field_name, comparator, threshold) combination is
/// validated here; an invalid one is rejected with 400.
#[utoipa::path(
    post,
    path = "/api/alerts/conditions",
    tag = "Alerts",
    request_body = CreateConditionRequest,
    responses(
        (status = 201, description = "Condition created", body = ConditionResponse),
        (status = 400, description = "Invalid condition", body = ApiError)
    )
)]
async fn create_condition(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateConditionRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "name must not be empty",
        );
    }

    if let Err(e) = CompiledCondition::compile(
        &req.source_table,
        &req.field_name,
        &req.comparator,
        &req.threshold_value,
    ) {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "invalid_condition",
            &e.to_string(),
        );
    }

    if let Some(template_id) = &req.email_template_id {
        match state.store.get_template_by_id(template_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &trace_id,
                    "unknown_template",
                    &format!("Email template '{template_id}' not found"),
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to look up email template");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &trace_id,
                    "storage_error",
                    "Database error",
                );
            }
        }
    }

    let row = AlertConditionRow {
        id: watchpost_common::id::next_id(),
        name: req.name,
        source_table: req.source_table,
        field_name: req.field_name,
        comparator: req.comparator,
        threshold_value: req.threshold_value,
        time_window_min: req.time_window_min,
        repeat_interval_min: req.repeat_interval_min,
        count_threshold: req.count_threshold,
        last_triggered_at: None,
        active: req.active,
        email_template_id: req.email_template_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    match state.store.insert_condition(&row).await {
        Ok(created) => {
            log_activity(
                &state.store,
                "condition_created",
                "alert_condition",
                Some(&created.id),
                Some(&created.name),
            )
            .await;
            success_response(StatusCode::CREATED, &trace_id, ConditionResponse::from(created))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create alert condition");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct ConditionListParams {
    /// Filter by active flag (active__eq, optional)
    #[param(required = false)]
    #[serde(rename = "active__eq")]
    active_eq: Option<bool>,
}

/// List alert conditions, ordered by name.
#[utoipa::path(
    get,
    path = "/api/alerts/conditions",
    tag = "Alerts",
    params(ConditionListParams),
    responses(
        (status = 200, description = "Condition list", body = Vec<ConditionResponse>)
    )
)]
async fn list_conditions(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<ConditionListParams>,
) -> impl IntoResponse {
    match state.store.list_conditions(params.active_eq).await {
        Ok(rows) => {
            let items: Vec<ConditionResponse> =
                rows.into_iter().map(ConditionResponse::from).collect();
            success_response(StatusCode::OK, &trace_id, items)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list alert conditions");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Get one alert condition.
#[utoipa::path(
    get,
    path = "/api/alerts/conditions/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "Condition ID")),
    responses(
        (status = 200, description = "Condition", body = ConditionResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn get_condition(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_condition_by_id(&id).await {
        Ok(Some(row)) => success_response(StatusCode::OK, &trace_id, ConditionResponse::from(row)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Condition '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get alert condition");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Update an alert condition. Partial body; the merged
/// (source_table, field_name, comparator, threshold) must still resolve.
#[utoipa::path(
    put,
    path = "/api/alerts/conditions/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "Condition ID")),
    request_body = UpdateConditionRequest,
    responses(
        (status = 200, description = "Updated condition", body = ConditionResponse),
        (status = 400, description = "Invalid condition", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn update_condition(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateConditionRequest>,
) -> impl IntoResponse {
    let existing = match state.store.get_condition_by_id(&id).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                &trace_id,
                "not_found",
                &format!("Condition '{id}' not found"),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get alert condition");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    };

    let source_table = req.source_table.as_deref().unwrap_or(&existing.source_table);
    let field_name = req.field_name.as_deref().unwrap_or(&existing.field_name);
    let comparator = req.comparator.as_deref().unwrap_or(&existing.comparator);
    let threshold = req
        .threshold_value
        .as_deref()
        .unwrap_or(&existing.threshold_value);
    if let Err(e) = CompiledCondition::compile(source_table, field_name, comparator, threshold) {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "invalid_condition",
            &e.to_string(),
        );
    }

    if let Some(Some(template_id)) = &req.email_template_id {
        match state.store.get_template_by_id(template_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &trace_id,
                    "unknown_template",
                    &format!("Email template '{template_id}' not found"),
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to look up email template");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &trace_id,
                    "storage_error",
                    "Database error",
                );
            }
        }
    }

    let update = AlertConditionUpdate {
        name: req.name,
        source_table: req.source_table,
        field_name: req.field_name,
        comparator: req.comparator,
        threshold_value: req.threshold_value,
        time_window_min: req.time_window_min,
        repeat_interval_min: req.repeat_interval_min,
        count_threshold: req.count_threshold,
        email_template_id: req.email_template_id,
    };

    match state.store.update_condition(&id, &update).await {
        Ok(Some(updated)) => {
            log_activity(
                &state.store,
                "condition_updated",
                "alert_condition",
                Some(&id),
                Some(&updated.name),
            )
            .await;
            success_response(StatusCode::OK, &trace_id, ConditionResponse::from(updated))
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Condition '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update alert condition");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Activate or deactivate a condition.
#[utoipa::path(
    put,
    path = "/api/alerts/conditions/{id}/active",
    tag = "Alerts",
    params(("id" = String, Path, description = "Condition ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Updated condition", body = ConditionResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn set_condition_active(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> impl IntoResponse {
    match state.store.set_condition_active(&id, req.active).await {
        Ok(Some(updated)) => {
            let action = if req.active {
                "condition_activated"
            } else {
                "condition_deactivated"
            };
            log_activity(&state.store, action, "alert_condition", Some(&id), None).await;
            success_response(StatusCode::OK, &trace_id, ConditionResponse::from(updated))
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Condition '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to set condition active flag");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Delete a condition and its events.
#[utoipa::path(
    delete,
    path = "/api/alerts/conditions/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "Condition ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn delete_condition(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_condition(&id).await {
        Ok(true) => {
            log_activity(
                &state.store,
                "condition_deleted",
                "alert_condition",
                Some(&id),
                None,
            )
            .await;
            crate::api::success_empty_response(StatusCode::OK, &trace_id, "deleted")
        }
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Condition '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete alert condition");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct EventListParams {
    /// Filter by resolution state (resolved__eq, optional)
    #[param(required = false)]
    #[serde(rename = "resolved__eq")]
    resolved_eq: Option<bool>,
    /// Filter by condition (condition_id__eq, optional)
    #[param(required = false)]
    #[serde(rename = "condition_id__eq")]
    condition_id_eq: Option<String>,
}

/// List alert events, newest first.
#[utoipa::path(
    get,
    path = "/api/alerts/events",
    tag = "Alerts",
    params(EventListParams, PaginationParams),
    responses(
        (status = 200, description = "Event page", body = Vec<EventResponse>)
    )
)]
async fn list_events(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let filter = AlertEventFilter {
        resolved_eq: params.resolved_eq,
        condition_id_eq: params.condition_id_eq,
    };
    let limit = pagination.limit();
    let offset = pagination.offset();

    let total = match state.store.count_events(&filter).await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count alert events");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    };

    match state.store.list_events(&filter, limit, offset).await {
        Ok(rows) => {
            let items: Vec<EventResponse> = rows.into_iter().map(EventResponse::from).collect();
            success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list alert events");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Get one alert event.
#[utoipa::path(
    get,
    path = "/api/alerts/events/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn get_event(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_event_by_id(&id).await {
        Ok(Some(row)) => success_response(StatusCode::OK, &trace_id, EventResponse::from(row)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Event '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get alert event");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Resolution result
#[derive(Serialize, ToSchema)]
struct ResolveResponse {
    /// False when the event was already resolved
    modified: bool,
}

/// Resolve one event. Resolving an already-resolved event is a no-op
/// reported with `modified = false`.
#[utoipa::path(
    post,
    path = "/api/alerts/events/{id}/resolve",
    tag = "Alerts",
    params(("id" = String, Path, description = "Event ID")),
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Resolution result", body = ResolveResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn resolve_event(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    match state.store.resolve_event(&id, req.notes.as_deref()).await {
        Ok(ResolveOutcome::Resolved) => {
            log_activity(
                &state.store,
                "event_resolved",
                "alert_event",
                Some(&id),
                req.notes.as_deref(),
            )
            .await;
            success_response(StatusCode::OK, &trace_id, ResolveResponse { modified: true })
        }
        Ok(ResolveOutcome::AlreadyResolved) => {
            success_response(StatusCode::OK, &trace_id, ResolveResponse { modified: false })
        }
        Ok(ResolveOutcome::NotFound) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Event '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve alert event");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Bulk resolution result
#[derive(Serialize, ToSchema)]
struct ResolveAllResponse {
    resolved: u64,
}

/// Resolve every unresolved event.
#[utoipa::path(
    post,
    path = "/api/alerts/resolve-all",
    tag = "Alerts",
    responses(
        (status = 200, description = "Bulk resolution result", body = ResolveAllResponse)
    )
)]
async fn resolve_all(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.resolve_all_events().await {
        Ok(resolved) => {
            log_activity(
                &state.store,
                "events_resolved_all",
                "alert_event",
                None,
                Some(&format!("{resolved} events resolved")),
            )
            .await;
            success_response(StatusCode::OK, &trace_id, ResolveAllResponse { resolved })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve all alert events");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Unresolved count
#[derive(Serialize, ToSchema)]
struct UnresolvedCountResponse {
    count: u64,
}

/// Count of unresolved events, for the dashboard badge.
#[utoipa::path(
    get,
    path = "/api/alerts/unresolved-count",
    tag = "Alerts",
    responses(
        (status = 200, description = "Unresolved count", body = UnresolvedCountResponse)
    )
)]
async fn unresolved_count(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.count_unresolved_events().await {
        Ok(count) => success_response(
            StatusCode::OK,
            &trace_id,
            UnresolvedCountResponse { count },
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to count unresolved events");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Evaluate all active conditions and record events.
#[utoipa::path(
    get,
    path = "/api/alerts/check",
    tag = "Alerts",
    responses(
        (status = 200, description = "Batch report", body = CheckReport)
    )
)]
async fn check_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.runner.run(&CheckOptions::standard()).await {
        Ok(report) => success_response(StatusCode::OK, &trace_id, report),
        Err(e) => {
            tracing::error!(error = %e, "Alert check failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "Alert check failed",
            )
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct DebugParams {
    /// Widen the window to 24 hours
    #[param(required = false)]
    #[serde(default)]
    extended: bool,
    /// Also create events for triggers (default: dry run)
    #[param(required = false)]
    #[serde(default)]
    create_events: bool,
}

/// Diagnostic evaluation of every condition, active or not, with sample
/// matches. Creates no events unless `create_events=true`.
#[utoipa::path(
    get,
    path = "/api/alerts/debug",
    tag = "Alerts",
    params(DebugParams),
    responses(
        (status = 200, description = "Diagnostic report", body = CheckReport)
    )
)]
async fn debug_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<DebugParams>,
) -> impl IntoResponse {
    let opts = CheckOptions {
        window_override_min: params.extended.then_some(EXTENDED_WINDOW_MIN),
        create_events: params.create_events,
        include_samples: true,
        include_inactive: true,
    };
    match state.runner.run(&opts).await {
        Ok(report) => success_response(StatusCode::OK, &trace_id, report),
        Err(e) => {
            tracing::error!(error = %e, "Alert debug run failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "Alert debug run failed",
            )
        }
    }
}

/// Scheduler hook. Same behavior as `/api/alerts/check` but guarded by
/// `Authorization: Bearer <cron_token>`.
#[utoipa::path(
    get,
    path = "/api/cron/evaluate-alerts",
    tag = "Alerts",
    responses(
        (status = 200, description = "Batch report", body = CheckReport),
        (status = 401, description = "Bad or missing token", body = ApiError)
    )
)]
async fn cron_evaluate_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(expected) = &state.config.cron_token else {
        tracing::warn!("Cron endpoint hit but no cron_token configured");
        return error_response(
            StatusCode::UNAUTHORIZED,
            &trace_id,
            "unauthorized",
            "Cron token not configured",
        );
    };

    let supplied = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if supplied != format!("Bearer {expected}") {
        return error_response(
            StatusCode::UNAUTHORIZED,
            &trace_id,
            "unauthorized",
            "Invalid cron token",
        );
    }

    match state.runner.run(&CheckOptions::standard()).await {
        Ok(report) => success_response(StatusCode::OK, &trace_id, report),
        Err(e) => {
            tracing::error!(error = %e, "Cron alert evaluation failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "internal_error",
                "Alert check failed",
            )
        }
    }
}

pub fn alert_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_condition, list_conditions))
        .routes(routes!(get_condition, update_condition, delete_condition))
        .routes(routes!(set_condition_active))
        .routes(routes!(list_events))
        .routes(routes!(get_event))
        .routes(routes!(resolve_event))
        .routes(routes!(resolve_all))
        .routes(routes!(unresolved_count))
        .routes(routes!(check_alerts))
        .routes(routes!(debug_alerts))
}

pub fn cron_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(cron_evaluate_alerts))
}
