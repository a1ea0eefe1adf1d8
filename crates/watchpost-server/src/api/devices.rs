use std::convert::Infallible;

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use watchpost_storage::DeviceRow;

use crate::api::{error_response, log_activity, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;

/// Inventoried device
#[derive(Serialize, ToSchema)]
struct DeviceResponse {
    id: String,
    name: String,
    ip_address: Option<String>,
    mac_address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DeviceRow> for DeviceResponse {
    fn from(r: DeviceRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            ip_address: r.ip_address,
            mac_address: r.mac_address,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
struct CreateDeviceRequest {
    name: String,
    ip_address: Option<String>,
    mac_address: Option<String>,
    notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
struct UpdateDeviceRequest {
    name: Option<String>,
    ip_address: Option<Option<String>>,
    mac_address: Option<Option<String>>,
    notes: Option<Option<String>>,
}

/// Register a device.
#[utoipa::path(
    post,
    path = "/api/devices",
    tag = "Devices",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = DeviceResponse),
        (status = 400, description = "Invalid device", body = ApiError)
    )
)]
async fn create_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateDeviceRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "name must not be empty",
        );
    }

    let row = DeviceRow {
        id: watchpost_common::id::next_id(),
        name: req.name,
        ip_address: req.ip_address,
        mac_address: req.mac_address,
        notes: req.notes,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    match state.store.insert_device(&row).await {
        Ok(created) => {
            log_activity(
                &state.store,
                "device_created",
                "device",
                Some(&created.id),
                Some(&created.name),
            )
            .await;
            success_response(StatusCode::CREATED, &trace_id, DeviceResponse::from(created))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create device");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// List devices, ordered by name.
#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "Devices",
    responses(
        (status = 200, description = "Device list", body = Vec<DeviceResponse>)
    )
)]
async fn list_devices(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.list_devices().await {
        Ok(rows) => {
            let items: Vec<DeviceResponse> = rows.into_iter().map(DeviceResponse::from).collect();
            success_response(StatusCode::OK, &trace_id, items)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list devices");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Get one device.
#[utoipa::path(
    get,
    path = "/api/devices/{id}",
    tag = "Devices",
    params(("id" = String, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device", body = DeviceResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn get_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_device_by_id(&id).await {
        Ok(Some(row)) => success_response(StatusCode::OK, &trace_id, DeviceResponse::from(row)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Device '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get device");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Update a device. Nullable fields accept an explicit `null` to clear.
#[utoipa::path(
    put,
    path = "/api/devices/{id}",
    tag = "Devices",
    params(("id" = String, Path, description = "Device ID")),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Updated device", body = DeviceResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn update_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDeviceRequest>,
) -> impl IntoResponse {
    let result = state
        .store
        .update_device(
            &id,
            req.name.as_deref(),
            req.ip_address.as_ref().map(|v| v.as_deref()),
            req.mac_address.as_ref().map(|v| v.as_deref()),
            req.notes.as_ref().map(|v| v.as_deref()),
        )
        .await;

    match result {
        Ok(Some(updated)) => {
            log_activity(
                &state.store,
                "device_updated",
                "device",
                Some(&id),
                Some(&updated.name),
            )
            .await;
            success_response(StatusCode::OK, &trace_id, DeviceResponse::from(updated))
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Device '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update device");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Delete a device.
#[utoipa::path(
    delete,
    path = "/api/devices/{id}",
    tag = "Devices",
    params(("id" = String, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
async fn delete_device(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_device(&id).await {
        Ok(true) => {
            log_activity(&state.store, "device_deleted", "device", Some(&id), None).await;
            crate::api::success_empty_response(StatusCode::OK, &trace_id, "deleted")
        }
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("Device '{id}' not found"),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete device");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// SSE stream of device status deltas. Subscribing starts the poll loop;
/// it stops when the last stream closes. Not part of the OpenAPI surface.
pub async fn device_monitor_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let client_id = watchpost_common::id::next_id();
    let rx = state.monitor.subscribe();
    tracing::info!(client_id = %client_id, subscribers = state.monitor.subscriber_count(), "Device monitor client connected");

    let connected = serde_json::json!({
        "type": "connected",
        "client_id": client_id,
    });
    let initial = futures::stream::iter(vec![Ok(Event::default().data(connected.to_string()))]);

    let updates = BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(update) => serde_json::to_string(&update)
                .ok()
                .map(|data| Ok(Event::default().data(data))),
            // a lagged subscriber misses deltas rather than erroring out
            Err(e) => {
                tracing::warn!(error = %e, "Device monitor subscriber lagged");
                None
            }
        }
    });

    Sse::new(initial.chain(updates)).keep_alive(KeepAlive::default())
}

pub fn device_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_device, list_devices))
        .routes(routes!(get_device, update_device, delete_device))
}
