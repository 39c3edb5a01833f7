mod admin;
mod auth;
mod chat;
mod documents;
mod health;

use crate::{
    middleware::session::{SessionCookie, session_middleware},
    state::AppState,
};
use anyhow::Result;
use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use shared::utils::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub use self::admin::admin_routes;
pub use self::auth::auth_routes;
pub use self::chat::chat_routes;
pub use self::documents::document_routes;
pub use self::health::health_routes;

const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::logout_handler,
        auth::session_handler,
        auth::me_handler,

        chat::ask_handler,
        chat::history_handler,

        documents::list_documents_handler,
        documents::document_summary_handler,
        documents::delete_document_handler,
        documents::upload_document_handler,

        admin::list_users_handler,
        admin::create_user_handler,
        admin::user_stats_handler,
        admin::update_role_handler,
        admin::deactivate_user_handler,
        admin::analytics_handler,

        health::health_handler,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, registration and session state"),
        (name = "Chat", description = "Questions against the document corpus"),
        (name = "Documents", description = "Document management"),
        (name = "Admin", description = "User management and analytics"),
        (name = "Health", description = "Backend availability"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("portal_sid"))),
            );
        }
    }
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    state
        .metrics
        .set_active_sessions(state.session_store.active_sessions().await);

    let mut buffer = String::new();
    let registry = state.registry.lock().await;

    if let Err(e) = encode(&mut buffer, &registry) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {e}"),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
        .into_response()
}

pub struct AppRouter;

impl AppRouter {
    pub fn build(app_state: AppState) -> Router {
        let shared_state = Arc::new(app_state);
        let cookie = SessionCookie::new(&shared_state.session_config);

        let api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/metrics", get(metrics_handler))
            .with_state(shared_state.clone())
            .merge(auth_routes(shared_state.clone()))
            .merge(chat_routes(shared_state.clone()))
            .merge(document_routes(shared_state.clone()))
            .merge(admin_routes(shared_state.clone()))
            .merge(health_routes(shared_state.clone()));

        let router_with_layers = api_router
            .layer(middleware::from_fn(session_middleware))
            .layer(Extension(cookie))
            .layer(Extension(shared_state.di_container.session_service.clone()))
            .layer(Extension(shared_state.di_container.portal_service.clone()))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

        let (app_router, api) = router_with_layers.split_for_parts();

        app_router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
    }

    pub async fn serve(port: u16, app_state: AppState) -> Result<()> {
        let app = Self::build(app_state);

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr).await?;

        info!("🚀 Portal running on http://{}", listener.local_addr()?);
        info!("📖 Swagger UI: http://localhost:{port}/swagger-ui");
        info!("📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}
