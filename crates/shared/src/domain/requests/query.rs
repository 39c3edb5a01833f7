use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, message = "Question must not be empty"))]
    pub question: String,

    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 10, message = "top_k must be between 1 and 10"))]
    pub top_k: u32,
}

fn default_top_k() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, IntoParams)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}
