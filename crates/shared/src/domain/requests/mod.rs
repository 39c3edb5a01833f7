mod auth;
mod document;
mod query;
mod user;

pub use self::auth::{CreateUserRequest, LoginRequest, RegisterRequest};
pub use self::document::DocumentUpload;
pub use self::query::{HistoryQuery, QueryRequest};
pub use self::user::UpdateRoleRequest;
