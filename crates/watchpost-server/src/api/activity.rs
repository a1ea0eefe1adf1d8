use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use watchpost_storage::ActivityLogRow;

use crate::api::pagination::PaginationParams;
use crate::api::{error_response, success_paginated_response};
use crate::logging::TraceId;
use crate::state::AppState;

/// Audit trail row
#[derive(Serialize, ToSchema)]
struct ActivityResponse {
    id: String,
    action_type: String,
    target_type: String,
    target_id: Option<String>,
    details: Option<String>,
    timestamp: DateTime<Utc>,
}

impl From<ActivityLogRow> for ActivityResponse {
    fn from(r: ActivityLogRow) -> Self {
        Self {
            id: r.id,
            action_type: r.action_type,
            target_type: r.target_type,
            target_id: r.target_id,
            details: r.details,
            timestamp: r.timestamp,
        }
    }
}

/// List audit trail rows, newest first.
#[utoipa::path(
    get,
    path = "/api/activity",
    tag = "Activity",
    params(PaginationParams),
    responses(
        (status = 200, description = "Activity page", body = Vec<ActivityResponse>)
    )
)]
async fn list_activity(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let limit = pagination.limit();
    let offset = pagination.offset();
    let total = match state.store.count_activity().await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count activity rows");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    };
    match state.store.list_activity(limit, offset).await {
        Ok(rows) => {
            let items: Vec<ActivityResponse> =
                rows.into_iter().map(ActivityResponse::from).collect();
            success_paginated_response(StatusCode::OK, &trace_id, items, total, limit, offset)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list activity rows");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

pub fn activity_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list_activity))
}
