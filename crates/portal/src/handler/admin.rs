use crate::{
    middleware::{guard::require_admin, session::SessionId, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use shared::{
    domain::{
        requests::{CreateUserRequest, UpdateRoleRequest},
        responses::{AnalyticsStats, ApiResponse, UserStats},
    },
    errors::HttpError,
    model::Principal,
    service::PortalService,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts", body = ApiResponse<Vec<Principal>>),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_users_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let users = portal.list_users(session_id.as_str()).await?;
    Ok(Json(ApiResponse::success("Users", users)))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<bool>),
        (status = 400, description = "Invalid user data"),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn create_user_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let username = body.username.clone();
    portal.create_user(session_id.as_str(), body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            format!("User '{username}' created successfully"),
            true,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/stats",
    responses(
        (status = 200, description = "Account counts by status and role", body = ApiResponse<UserStats>),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn user_stats_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = portal.user_stats(session_id.as_str()).await?;
    Ok(Json(ApiResponse::success("User statistics", stats)))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<bool>),
        (status = 400, description = "Cannot change own role"),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn update_role_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<i64>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, HttpError> {
    portal.update_role(session_id.as_str(), id, body.role).await?;
    Ok(Json(ApiResponse::success(
        format!("Role updated to {}", body.role),
        true,
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/deactivate",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deactivated", body = ApiResponse<bool>),
        (status = 400, description = "Cannot deactivate yourself"),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn deactivate_user_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    portal.deactivate_user(session_id.as_str(), id).await?;
    Ok(Json(ApiResponse::success("User deactivated", true)))
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    responses(
        (status = 200, description = "System usage statistics", body = ApiResponse<AnalyticsStats>),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn analytics_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = portal.analytics(session_id.as_str()).await?;
    Ok(Json(ApiResponse::success("Analytics", stats)))
}

pub fn admin_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route(
            "/api/admin/users",
            get(list_users_handler).post(create_user_handler),
        )
        .route("/api/admin/users/stats", get(user_stats_handler))
        .route("/api/admin/users/{id}/role", put(update_role_handler))
        .route(
            "/api/admin/users/{id}/deactivate",
            put(deactivate_user_handler),
        )
        .route("/api/analytics", get(analytics_handler))
        .route_layer(middleware::from_fn(require_admin))
        .with_state(app_state)
}
