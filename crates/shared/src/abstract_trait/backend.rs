use crate::{
    domain::{
        requests::{CreateUserRequest, DocumentUpload, LoginRequest, QueryRequest, RegisterRequest},
        responses::{
            AnalyticsStats, DocumentMetadata, HealthStatus, LoginResponse, QueryResponse,
            SearchHistoryEntry,
        },
    },
    errors::ClientError,
    model::{Principal, Role},
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynBackendClient = Arc<dyn BackendClientTrait + Send + Sync>;

/// HTTP contract of the document backend. Every method except `login`,
/// `register` and `health` sends `Authorization: Bearer <token>`.
#[async_trait]
pub trait BackendClientTrait {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError>;
    async fn register(&self, req: &RegisterRequest) -> Result<Principal, ClientError>;
    async fn current_user(&self, token: &str) -> Result<Principal, ClientError>;

    async fn create_user(&self, token: &str, req: &CreateUserRequest) -> Result<(), ClientError>;
    async fn list_users(&self, token: &str) -> Result<Vec<Principal>, ClientError>;
    async fn update_role(&self, token: &str, user_id: i64, role: Role) -> Result<(), ClientError>;
    async fn deactivate_user(&self, token: &str, user_id: i64) -> Result<(), ClientError>;

    async fn search_history(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<SearchHistoryEntry>, ClientError>;
    async fn analytics(&self, token: &str) -> Result<AnalyticsStats, ClientError>;

    async fn upload_document(
        &self,
        token: &str,
        upload: DocumentUpload,
    ) -> Result<DocumentMetadata, ClientError>;
    async fn list_documents(&self, token: &str) -> Result<Vec<DocumentMetadata>, ClientError>;
    async fn delete_document(&self, token: &str, document_id: i64) -> Result<(), ClientError>;

    async fn query(&self, token: &str, req: &QueryRequest) -> Result<QueryResponse, ClientError>;
    async fn health(&self) -> Result<HealthStatus, ClientError>;
}
