use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsStats {
    pub total_users: u64,
    pub total_documents: u64,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub search_stats: Vec<serde_json::Value>,
}

impl AnalyticsStats {
    pub fn total_searches(&self) -> usize {
        self.search_stats.len()
    }
}
