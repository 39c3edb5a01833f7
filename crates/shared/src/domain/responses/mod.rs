mod analytics;
mod api;
mod auth;
mod document;
mod health;
mod history;
mod query;
mod user;

pub use self::analytics::AnalyticsStats;
pub use self::api::ApiResponse;
pub use self::auth::{LoginResponse, SessionResponse};
pub use self::document::{DocumentMetadata, DocumentSummary};
pub use self::health::HealthStatus;
pub use self::history::SearchHistoryEntry;
pub use self::query::{QueryResponse, Source};
pub use self::user::UserStats;
