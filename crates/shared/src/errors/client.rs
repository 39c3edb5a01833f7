use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden,
            other => ClientError::Status {
                status: other.as_u16(),
                body,
            },
        }
    }

    /// Human-readable reason, preferring the backend's `detail` field.
    pub fn detail(&self) -> String {
        match self {
            ClientError::Status { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_owned))
                .unwrap_or_else(|| self.to_string()),
            other => other.to_string(),
        }
    }

    /// Connection-level failure or a 5xx: the backend could not serve the call.
    pub fn is_unreachable(&self) -> bool {
        match self {
            ClientError::Timeout(_) | ClientError::Transport(_) | ClientError::Decode(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Unauthorized | ClientError::Forbidden => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::from_status(status, err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
