use crate::{
    middleware::{
        guard::require_auth,
        session::{SessionCookie, SessionId},
        validate::SimpleValidatedJson,
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use shared::{
    domain::{
        requests::{LoginRequest, RegisterRequest},
        responses::{ApiResponse, SessionResponse},
    },
    errors::HttpError,
    model::{Principal, Session},
    service::SessionService,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "Auth"
)]
pub async fn login_handler(
    Extension(sessions): Extension<SessionService>,
    Extension(cookie): Extension<SessionCookie>,
    Extension(previous): Extension<SessionId>,
    jar: CookieJar,
    SimpleValidatedJson(body): SimpleValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let session_id = SessionId::generate();

    let session = sessions
        .login(session_id.as_str(), &body.username, &body.password)
        .await
        .map_err(HttpError::login_failure)?;

    sessions.logout(previous.as_str()).await;

    let response = ApiResponse::success("Login successful", SessionResponse::from(&session));
    Ok((
        jar.add(cookie.issue(&session_id)),
        (StatusCode::OK, Json(response)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<Principal>),
        (status = 400, description = "Invalid registration data")
    ),
    tag = "Auth"
)]
pub async fn register_handler(
    Extension(sessions): Extension<SessionService>,
    SimpleValidatedJson(body): SimpleValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let principal = sessions.register(body).await?;

    let response = ApiResponse::success(
        "Registration successful! Please log in with your new account.",
        principal,
    );
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = ApiResponse<bool>)
    ),
    tag = "Auth"
)]
pub async fn logout_handler(
    Extension(sessions): Extension<SessionService>,
    Extension(cookie): Extension<SessionCookie>,
    Extension(session_id): Extension<SessionId>,
    jar: CookieJar,
) -> impl IntoResponse {
    let cleared = sessions.logout(session_id.as_str()).await;

    let response = ApiResponse::success("Logged out", cleared);
    (jar.add(cookie.removal()), Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current login state", body = ApiResponse<SessionResponse>)
    ),
    tag = "Auth"
)]
pub async fn session_handler(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(ApiResponse::success(
        "Session state",
        SessionResponse::from(&session),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Fresh copy of the logged-in user", body = ApiResponse<Principal>),
        (status = 401, description = "Not logged in or token expired")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn me_handler(
    Extension(sessions): Extension<SessionService>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let principal = sessions.refresh_principal(session_id.as_str()).await?;
    Ok(Json(ApiResponse::success("Current user", principal)))
}

pub fn auth_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let public_routes = OpenApiRouter::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/session", get(session_handler));

    let private_routes = OpenApiRouter::new()
        .route("/api/auth/me", get(me_handler))
        .route_layer(middleware::from_fn(require_auth));

    public_routes.merge(private_routes).with_state(app_state)
}
