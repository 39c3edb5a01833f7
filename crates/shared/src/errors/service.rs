use crate::errors::client::ClientError;
use thiserror::Error;
use validator::ValidationErrors;

pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }

    /// Login failures that are shown to the user with one generic message.
    pub fn is_login_failure(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidCredentials | ServiceError::BackendUnreachable(_)
        )
    }
}

impl From<ClientError> for ServiceError {
    fn from(err: ClientError) -> Self {
        if err.is_unreachable() {
            return ServiceError::BackendUnreachable(err.to_string());
        }

        match err {
            ClientError::Unauthorized => ServiceError::NotAuthenticated,
            ClientError::Forbidden => {
                ServiceError::AccessDenied("Backend rejected the request".into())
            }
            other => ServiceError::RequestFailed(other.detail()),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {field}"),
                })
            })
            .collect();

        messages.sort();
        ServiceError::Validation(messages)
    }
}
