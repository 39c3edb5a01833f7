use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    /// Set to `"login"` when the caller has to authenticate first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}
