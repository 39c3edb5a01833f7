use axum::{Extension, body::Body, http::Request, middleware::Next, response::Response};
use shared::{errors::HttpError, model::Session, service::guard};

pub async fn require_auth(
    Extension(session): Extension<Session>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    if !session.is_authenticated() {
        return Err(HttpError::Unauthorized(
            "Please log in to continue".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

pub async fn require_admin(
    Extension(session): Extension<Session>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    if !session.is_authenticated() {
        return Err(HttpError::Unauthorized(
            "Please log in to continue".to_string(),
        ));
    }

    if !guard::is_admin(&session) {
        return Err(HttpError::Forbidden(
            "Access denied. Admin privileges required.".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
