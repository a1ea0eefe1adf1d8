use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use watchpost_storage::EmailTemplateRow;

use crate::api::{error_response, log_activity, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;

/// Email template. Subject and body accept `{{alertName}}`, `{{alertTime}}`,
/// `{{thresholdValue}}` and `{{notes}}` placeholders.
#[derive(Serialize, ToSchema)]
struct TemplateResponse {
    id: String,
    name: String,
    subject: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EmailTemplateRow> for TemplateResponse {
    fn from(r: EmailTemplateRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            subject: r.subject,
            body: r.body,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct CreateTemplateRequest {
    name: String,
    subject: String,
    body: String,
}

#[derive(Deserialize, ToSchema)]
struct UpdateTemplateRequest {
    name: Option<String>,
    subject: Option<String>,
    body: Option<String>,
}

/// Create an email template. Names are unique.
#[utoipa::path(
    post,
    path = "/api/email-templates",
    tag = "Templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 400, description = "Invalid template", body = ApiError),
        (status = 409, description = "Name already taken", body = ApiError)
    )
)]
async fn create_template(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateTemplateRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "name must not be empty",
        );
    }

    match state.store.get_template_by_name(&req.name).await {
        Ok(Some(_)) => {
            return error_response(
                StatusCode::CONFLICT,
                &trace_id,
                "conflict",
                &format!("Template '{}' already exists", req.name),
            )
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "Failed to check template name");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            );
        }
    }

    let row = EmailTemplateRow {
        id: watchpost_common::id::next_id(),
        name: req.name,
        subject: req.subject,
        body: req.body,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    match state.store.insert_template(&row).await {
        Ok(created) => {
            log_activity(
                &state.store,
                "template_created",
                "email_template",
                Some(&created.id),
                Some(&created.name),
            )
            .await;
            success_response(StatusCode::CREATED, &trace_id, TemplateResponse::from(created))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create email template");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// List email templates, ordered by name.
#[utoipa::path(
    get,
    path = "/api/email-templates",
    tag = "Templates",
    responses(
        (status = 200, description = "Template list", body = Vec<TemplateResponse>)
    )
)]
async fn list_templates(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.list_templates().await {
        Ok(rows) => {
            let items: Vec<TemplateResponse> =
                rows.into_iter().map(TemplateResponse::from).collect();
            success_response(StatusCode::OK, &trace_id, items)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list email templates");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Get one email template.
#[utoipa::path(
    get,
    path = "/api/email-templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template", body = TemplateResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn get_template(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_template_by_id(&id).await {
        Ok(Some(row)) => success_response(StatusCode::OK, &trace_id, TemplateResponse::from(row)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Template '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get email template");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Update an email template.
#[utoipa::path(
    put,
    path = "/api/email-templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Updated template", body = TemplateResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn update_template(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTemplateRequest>,
) -> impl IntoResponse {
    let result = state
        .store
        .update_template(
            &id,
            req.name.as_deref(),
            req.subject.as_deref(),
            req.body.as_deref(),
        )
        .await;

    match result {
        Ok(Some(updated)) => {
            log_activity(
                &state.store,
                "template_updated",
                "email_template",
                Some(&id),
                Some(&updated.name),
            )
            .await;
            success_response(StatusCode::OK, &trace_id, TemplateResponse::from(updated))
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Template '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update email template");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Delete an email template. Conditions that referenced it fall back to
/// the built-in default template.
#[utoipa::path(
    delete,
    path = "/api/email-templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn delete_template(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_template(&id).await {
        Ok(true) => {
            log_activity(
                &state.store,
                "template_deleted",
                "email_template",
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
            &format!("Template '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete email template");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

pub fn template_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_template, list_templates))
        .routes(routes!(get_template, update_template, delete_template))
}
