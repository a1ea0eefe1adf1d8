use crate::state::AppState;
use crate::{api, logging};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "watchpost API",
        description = "Internal IT/ops dashboard backend REST API",
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Alerts", description = "Alert conditions, events and evaluation"),
        (name = "Devices", description = "Device inventory and monitoring"),
        (name = "Sources", description = "Ingested logs and metrics"),
        (name = "Templates", description = "Alert email templates"),
        (name = "Activity", description = "Audit trail")
    )
)]
struct ApiDoc;

pub fn build_http_app(state: AppState) -> Router {
    let (public_router, public_spec) = api::public_routes().split_for_parts();
    let (api_router, api_spec) = api::api_routes().split_for_parts();

    let mut merged_spec = ApiDoc::openapi();
    merged_spec.merge(public_spec);
    merged_spec.merge(api_spec);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public_router
        .merge(api_router)
        // SSE endpoint is outside the OpenAPI surface
        .route("/api/device-monitor", get(api::devices::device_monitor_sse))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/v1/openapi.json", merged_spec))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
