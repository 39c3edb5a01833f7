use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Source {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub chunk_id: Option<serde_json::Value>,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Answer to `POST /query`. Older backends put the text under `response`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, skip_serializing)]
    pub response: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl QueryResponse {
    pub fn answer_text(&self) -> &str {
        self.answer
            .as_deref()
            .or(self.response.as_deref())
            .unwrap_or_default()
    }

    /// Folds `response` into `answer` so callers only see one field.
    pub fn normalized(mut self) -> Self {
        if self.answer.is_none() {
            self.answer = self.response.take();
        }
        self
    }
}
