use crate::{
    middleware::{
        guard::{require_admin, require_auth},
        session::SessionId,
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use shared::{
    domain::{
        requests::DocumentUpload,
        responses::{ApiResponse, DocumentMetadata, DocumentSummary},
    },
    errors::HttpError,
    service::PortalService,
};
use std::sync::Arc;
use tracing::debug;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Documents known to the backend", body = ApiResponse<Vec<DocumentMetadata>>),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = [])),
    tag = "Documents"
)]
pub async fn list_documents_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let documents = portal.list_documents(session_id.as_str()).await?;
    Ok(Json(ApiResponse::success("Documents", documents)))
}

#[utoipa::path(
    get,
    path = "/api/documents/summary",
    responses(
        (status = 200, description = "Document and chunk totals", body = ApiResponse<DocumentSummary>),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = [])),
    tag = "Documents"
)]
pub async fn document_summary_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = portal.document_summary(session_id.as_str()).await?;
    Ok(Json(ApiResponse::success("Document summary", summary)))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted", body = ApiResponse<bool>),
        (status = 401, description = "Not logged in"),
        (status = 502, description = "Backend refused the delete")
    ),
    security(("session_cookie" = [])),
    tag = "Documents"
)]
pub async fn delete_document_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    portal.delete_document(session_id.as_str(), id).await?;
    Ok(Json(ApiResponse::success("Document deleted", true)))
}

#[utoipa::path(
    post,
    path = "/api/documents/upload",
    request_body(content_type = "multipart/form-data", description = "Form with a single `file` field"),
    responses(
        (status = 201, description = "Document stored and queued for processing", body = ApiResponse<DocumentMetadata>),
        (status = 400, description = "Missing or empty file"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Admin only")
    ),
    security(("session_cookie" = [])),
    tag = "Documents"
)]
pub async fn upload_document_handler(
    Extension(portal): Extension<PortalService>,
    Extension(session_id): Extension<SessionId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let upload = read_upload(&mut multipart).await?;
    debug!("Received upload {} ({} bytes)", upload.file_name, upload.content.len());

    let document = portal
        .upload_document(session_id.as_str(), upload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Document uploaded", document)),
    ))
}

async fn read_upload(multipart: &mut Multipart) -> Result<DocumentUpload, HttpError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_owned);
        let content = field
            .bytes()
            .await
            .map_err(|e| HttpError::BadRequest(format!("Failed to read upload: {e}")))?;

        return Ok(DocumentUpload {
            file_name,
            content_type,
            content: content.to_vec(),
        });
    }

    Err(HttpError::BadRequest("Missing 'file' field".to_string()))
}

pub fn document_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let user_routes = OpenApiRouter::new()
        .route("/api/documents", get(list_documents_handler))
        .route("/api/documents/summary", get(document_summary_handler))
        .route("/api/documents/{id}", delete(delete_document_handler))
        .route_layer(middleware::from_fn(require_auth));

    let admin_routes = OpenApiRouter::new()
        .route("/api/documents/upload", post(upload_document_handler))
        .route_layer(middleware::from_fn(require_admin));

    user_routes.merge(admin_routes).with_state(app_state)
}
