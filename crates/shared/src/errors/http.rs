use crate::errors::{
    error::ErrorResponse,
    service::{LOGIN_FAILED_MESSAGE, ServiceError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadGateway(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl HttpError {
    /// Collapses every login failure into the same response so callers cannot
    /// tell a wrong password from an unavailable backend.
    pub fn login_failure(err: ServiceError) -> Self {
        if err.is_login_failure() {
            HttpError::Unauthorized(LOGIN_FAILED_MESSAGE.into())
        } else {
            err.into()
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => HttpError::BadRequest(errors.join("; ")),
            ServiceError::InvalidCredentials => {
                HttpError::Unauthorized(LOGIN_FAILED_MESSAGE.into())
            }
            ServiceError::BackendUnreachable(_) => {
                HttpError::ServiceUnavailable("Backend service is unavailable".into())
            }
            ServiceError::AccessDenied(msg) => HttpError::Forbidden(msg),
            ServiceError::NotAuthenticated => {
                HttpError::Unauthorized("You are not logged in".into())
            }
            ServiceError::RequestFailed(msg) => HttpError::BadGateway(msg),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            HttpError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let action = (status == StatusCode::UNAUTHORIZED).then(|| "login".to_string());

        let body = Json(ErrorResponse {
            status: "error".into(),
            message: msg,
            action,
        });

        (status, body).into_response()
    }
}
