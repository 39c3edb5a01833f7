use crate::{
    abstract_trait::{DynBackendClient, DynSessionStore},
    domain::{
        requests::{CreateUserRequest, DocumentUpload, HistoryQuery, QueryRequest},
        responses::{
            AnalyticsStats, DocumentMetadata, DocumentSummary, HealthStatus, QueryResponse,
            SearchHistoryEntry, UserStats,
        },
    },
    errors::{ClientError, ServiceError},
    model::{Principal, Role},
    service::guard::{self, Capability},
};
use std::future::Future;
use tracing::{info, warn};
use validator::Validate;

pub const DEFAULT_TOP_K: u32 = 5;

/// Every protected backend operation, run on behalf of one session.
///
/// Each call takes a snapshot of the session, passes it through the guard and
/// forwards the session's token. A 401 from the backend logs the session out.
#[derive(Clone)]
pub struct PortalService {
    backend: DynBackendClient,
    store: DynSessionStore,
}

pub struct PortalServiceDeps {
    pub backend: DynBackendClient,
    pub store: DynSessionStore,
}

impl PortalService {
    pub fn new(deps: PortalServiceDeps) -> Self {
        let PortalServiceDeps { backend, store } = deps;
        Self { backend, store }
    }

    async fn grant(
        &self,
        session_id: &str,
        capability: Capability,
    ) -> Result<(String, Principal), ServiceError> {
        let session = self.store.get_session(session_id).await;
        let grant = guard::authorize(&session, capability)?;
        Ok((grant.token.to_string(), grant.principal.clone()))
    }

    async fn dispatch<T>(
        &self,
        session_id: &str,
        token: &str,
        call: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ServiceError> {
        match call.await {
            Ok(value) => {
                self.store.touch(session_id).await;
                Ok(value)
            }
            Err(ClientError::Unauthorized) => {
                warn!("Backend rejected session token, forcing logout");
                self.store.invalidate(session_id, token).await;
                Err(ServiceError::NotAuthenticated)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn ask(
        &self,
        session_id: &str,
        question: &str,
        top_k: Option<u32>,
    ) -> Result<QueryResponse, ServiceError> {
        let (token, _) = self.grant(session_id, Capability::Chat).await?;

        let req = QueryRequest {
            question: question.trim().to_string(),
            top_k: top_k.unwrap_or(DEFAULT_TOP_K),
        };
        req.validate()?;

        let response = self
            .dispatch(session_id, &token, self.backend.query(&token, &req))
            .await?;
        Ok(response.normalized())
    }

    pub async fn search_history(
        &self,
        session_id: &str,
        query: HistoryQuery,
    ) -> Result<Vec<SearchHistoryEntry>, ServiceError> {
        let (token, _) = self.grant(session_id, Capability::SearchHistory).await?;
        query.validate()?;

        self.dispatch(
            session_id,
            &token,
            self.backend.search_history(&token, query.limit),
        )
        .await
    }

    pub async fn list_documents(
        &self,
        session_id: &str,
    ) -> Result<Vec<DocumentMetadata>, ServiceError> {
        let (token, _) = self.grant(session_id, Capability::ListDocuments).await?;
        self.dispatch(session_id, &token, self.backend.list_documents(&token))
            .await
    }

    pub async fn document_summary(&self, session_id: &str) -> Result<DocumentSummary, ServiceError> {
        let documents = self.list_documents(session_id).await?;
        Ok(DocumentSummary::from_documents(&documents))
    }

    pub async fn upload_document(
        &self,
        session_id: &str,
        upload: DocumentUpload,
    ) -> Result<DocumentMetadata, ServiceError> {
        let (token, principal) = self.grant(session_id, Capability::UploadDocument).await?;

        if upload.file_name.trim().is_empty() {
            return Err(ServiceError::validation("File name is required"));
        }
        if upload.content.is_empty() {
            return Err(ServiceError::validation("Uploaded file is empty"));
        }

        let file_name = upload.file_name.clone();
        let document = self
            .dispatch(
                session_id,
                &token,
                self.backend.upload_document(&token, upload),
            )
            .await?;

        info!("{} uploaded document {}", principal.username, file_name);
        Ok(document)
    }

    pub async fn delete_document(
        &self,
        session_id: &str,
        document_id: i64,
    ) -> Result<(), ServiceError> {
        let (token, principal) = self.grant(session_id, Capability::DeleteDocument).await?;

        self.dispatch(
            session_id,
            &token,
            self.backend.delete_document(&token, document_id),
        )
        .await?;

        info!("{} deleted document {}", principal.username, document_id);
        Ok(())
    }

    pub async fn analytics(&self, session_id: &str) -> Result<AnalyticsStats, ServiceError> {
        let (token, _) = self.grant(session_id, Capability::ViewAnalytics).await?;
        self.dispatch(session_id, &token, self.backend.analytics(&token))
            .await
    }

    pub async fn list_users(&self, session_id: &str) -> Result<Vec<Principal>, ServiceError> {
        let (token, _) = self.grant(session_id, Capability::ManageUsers).await?;
        self.dispatch(session_id, &token, self.backend.list_users(&token))
            .await
    }

    pub async fn user_stats(&self, session_id: &str) -> Result<UserStats, ServiceError> {
        let users = self.list_users(session_id).await?;
        Ok(UserStats::from_users(&users))
    }

    pub async fn create_user(
        &self,
        session_id: &str,
        req: CreateUserRequest,
    ) -> Result<(), ServiceError> {
        let (token, principal) = self.grant(session_id, Capability::ManageUsers).await?;
        req.validate()?;

        self.dispatch(session_id, &token, self.backend.create_user(&token, &req))
            .await?;

        info!(
            "{} created user {} with role {}",
            principal.username, req.username, req.role
        );
        Ok(())
    }

    pub async fn update_role(
        &self,
        session_id: &str,
        user_id: i64,
        role: Role,
    ) -> Result<(), ServiceError> {
        let (token, principal) = self.grant(session_id, Capability::ManageUsers).await?;
        guard::ensure_not_self(&principal, user_id)?;

        self.dispatch(
            session_id,
            &token,
            self.backend.update_role(&token, user_id, role),
        )
        .await?;

        info!("{} set role of user {} to {}", principal.username, user_id, role);
        Ok(())
    }

    pub async fn deactivate_user(&self, session_id: &str, user_id: i64) -> Result<(), ServiceError> {
        let (token, principal) = self.grant(session_id, Capability::ManageUsers).await?;
        guard::ensure_not_self(&principal, user_id)?;

        self.dispatch(
            session_id,
            &token,
            self.backend.deactivate_user(&token, user_id),
        )
        .await?;

        info!("{} deactivated user {}", principal.username, user_id);
        Ok(())
    }

    /// Unauthenticated; any failure means the backend is down.
    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        self.backend
            .health()
            .await
            .map_err(|err| ServiceError::BackendUnreachable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::SessionStoreTrait,
        cache::SessionRegistry,
        service::{CredentialGateway, SessionService},
        testing::StubBackend,
    };
    use std::sync::Arc;

    struct Harness {
        stub: Arc<StubBackend>,
        store: DynSessionStore,
        sessions: SessionService,
        portal: PortalService,
    }

    fn harness() -> Harness {
        let stub = Arc::new(StubBackend::with_default_accounts());
        let store: DynSessionStore = Arc::new(SessionRegistry::new(chrono::Duration::minutes(30)));
        let sessions = SessionService::new(CredentialGateway::new(stub.clone()), store.clone());
        let portal = PortalService::new(PortalServiceDeps {
            backend: stub.clone(),
            store: store.clone(),
        });

        Harness {
            stub,
            store,
            sessions,
            portal,
        }
    }

    fn upload(name: &str) -> DocumentUpload {
        DocumentUpload {
            file_name: name.into(),
            content_type: Some("text/plain".into()),
            content: b"hello".to_vec(),
        }
    }

    #[tokio::test]
    async fn anonymous_calls_are_rejected_without_network() {
        let h = harness();

        assert!(matches!(
            h.portal.ask("sid", "hi", None).await,
            Err(ServiceError::NotAuthenticated)
        ));
        assert!(matches!(
            h.portal.list_documents("sid").await,
            Err(ServiceError::NotAuthenticated)
        ));
        assert_eq!(h.stub.call_count(), 0);
    }

    #[tokio::test]
    async fn user_cannot_reach_admin_operations() {
        let h = harness();
        h.sessions.login("sid", "alice", "secret1").await.unwrap();
        let calls = h.stub.call_count();

        assert!(matches!(
            h.portal.analytics("sid").await,
            Err(ServiceError::AccessDenied(_))
        ));
        assert!(matches!(
            h.portal.upload_document("sid", upload("a.txt")).await,
            Err(ServiceError::AccessDenied(_))
        ));
        assert!(matches!(
            h.portal.list_users("sid").await,
            Err(ServiceError::AccessDenied(_))
        ));
        assert_eq!(h.stub.call_count(), calls);
    }

    #[tokio::test]
    async fn ask_validates_input_and_normalizes_answer() {
        let h = harness();
        h.sessions.login("sid", "alice", "secret1").await.unwrap();

        assert!(matches!(
            h.portal.ask("sid", "   ", None).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            h.portal.ask("sid", "why?", Some(11)).await,
            Err(ServiceError::Validation(_))
        ));

        let answer = h.portal.ask("sid", "  why?  ", None).await.unwrap();
        assert_eq!(answer.answer.as_deref(), Some("answer to: why?"));

        let history = h
            .portal
            .search_history("sid", HistoryQuery::default())
            .await
            .unwrap();
        assert_eq!(history[0].query, "why?");
    }

    #[tokio::test]
    async fn revoked_token_forces_logout() {
        let h = harness();
        h.sessions.login("sid", "alice", "secret1").await.unwrap();
        h.stub.revoke_token("tok1");

        assert!(matches!(
            h.portal.list_documents("sid").await,
            Err(ServiceError::NotAuthenticated)
        ));
        assert!(!h.store.is_authenticated("sid").await);
    }

    #[tokio::test]
    async fn admin_document_lifecycle() {
        let h = harness();
        h.sessions.login("sid", "admin", "admin123").await.unwrap();

        let document = h.portal.upload_document("sid", upload("a.txt")).await.unwrap();
        h.portal.upload_document("sid", upload("b.txt")).await.unwrap();

        let summary = h.portal.document_summary("sid").await.unwrap();
        assert_eq!(summary.total_documents, 2);
        assert_eq!(summary.total_chunks, 2);

        h.portal.delete_document("sid", document.id).await.unwrap();
        assert!(matches!(
            h.portal.delete_document("sid", document.id).await,
            Err(ServiceError::RequestFailed(_))
        ));
        assert_eq!(h.portal.list_documents("sid").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let h = harness();
        h.sessions.login("sid", "admin", "admin123").await.unwrap();

        let mut empty = upload("a.txt");
        empty.content.clear();
        assert!(matches!(
            h.portal.upload_document("sid", empty).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn admin_manages_users_but_not_itself() {
        let h = harness();
        h.sessions.login("sid", "admin", "admin123").await.unwrap();

        h.portal
            .create_user(
                "sid",
                CreateUserRequest {
                    username: "carol".into(),
                    email: "carol@example.com".into(),
                    password: "secret1".into(),
                    role: Role::User,
                },
            )
            .await
            .unwrap();

        let stats = h.portal.user_stats("sid").await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.admins, 1);

        h.portal.update_role("sid", 2, Role::Admin).await.unwrap();
        h.portal.deactivate_user("sid", 2).await.unwrap();
        assert_eq!(h.stub.user("alice").map(|u| u.is_active), Some(false));

        assert!(matches!(
            h.portal.update_role("sid", 1, Role::User).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            h.portal.deactivate_user("sid", 1).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn health_reports_unreachable_backend() {
        let h = harness();
        assert_eq!(h.portal.health().await.unwrap().status, "healthy");

        h.stub.set_unreachable(true);
        assert!(matches!(
            h.portal.health().await,
            Err(ServiceError::BackendUnreachable(_))
        ));
    }
}
