use crate::{
    middleware::{guard::require_auth, session::SessionId, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::Query,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use shared::{
    domain::{
        requests::{HistoryQuery, QueryRequest},
        responses::{ApiResponse, QueryResponse, SearchHistoryEntry},
    },
    errors::HttpError,
    service::PortalService,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/chat/query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Answer with its sources", body = ApiResponse<QueryResponse>),
        (status = 400, description = "Empty question or top_k out of range"),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = [])),
    tag = "Chat"
)]
pub async fn ask_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
    SimpleValidatedJson(body): SimpleValidatedJson<QueryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let answer = portal
        .ask(session_id.as_str(), &body.question, Some(body.top_k))
        .await?;

    Ok(Json(ApiResponse::success("Answer generated", answer)))
}

#[utoipa::path(
    get,
    path = "/api/search/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Recent questions, newest first", body = ApiResponse<Vec<SearchHistoryEntry>>),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = [])),
    tag = "Chat"
)]
pub async fn history_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let history = portal.search_history(session_id.as_str(), query).await?;
    Ok(Json(ApiResponse::success("Search history", history)))
}

pub fn chat_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/chat/query", post(ask_handler))
        .route("/api/search/history", get(history_handler))
        .route_layer(middleware::from_fn(require_auth))
        .with_state(app_state)
}
