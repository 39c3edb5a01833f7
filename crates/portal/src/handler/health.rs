use crate::state::AppState;
use axum::{Extension, Json, response::IntoResponse, routing::get};
use shared::{
    domain::responses::{ApiResponse, HealthStatus},
    errors::HttpError,
    service::PortalService,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Backend is reachable", body = ApiResponse<HealthStatus>),
        (status = 503, description = "Backend is unreachable")
    ),
    tag = "Health"
)]
pub async fn health_handler(
    Extension(portal): Extension<PortalService>,
) -> Result<impl IntoResponse, HttpError> {
    let health = portal.health().await?;
    Ok(Json(ApiResponse::success("Backend health", health)))
}

pub fn health_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/health", get(health_handler))
        .with_state(app_state)
}
