use crate::{
    abstract_trait::DynSessionStore,
    domain::requests::RegisterRequest,
    errors::ServiceError,
    model::{Principal, Session},
    service::auth::CredentialGateway,
};
use tracing::{info, warn};

/// Login lifecycle of one session id: the gateway talks to the backend, the
/// store remembers the outcome.
#[derive(Clone)]
pub struct SessionService {
    gateway: CredentialGateway,
    store: DynSessionStore,
}

impl SessionService {
    pub fn new(gateway: CredentialGateway, store: DynSessionStore) -> Self {
        Self { gateway, store }
    }

    pub fn gateway(&self) -> &CredentialGateway {
        &self.gateway
    }

    /// On failure the session keeps whatever state it had before.
    pub async fn login(
        &self,
        session_id: &str,
        username: &str,
        password: &str,
    ) -> Result<Session, ServiceError> {
        let session = self.gateway.login(username, password).await?;

        if let Session::Authenticated { token, principal } = &session {
            self.store
                .set_session(session_id, token.clone(), principal.clone())
                .await;
        }

        Ok(session)
    }

    pub async fn logout(&self, session_id: &str) -> bool {
        let cleared = self.store.clear_session(session_id).await;
        if cleared {
            info!("Session logged out");
        }
        cleared
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Principal, ServiceError> {
        self.gateway.register(req).await
    }

    /// Current state of the session; an authenticated read also counts as
    /// activity for idle expiry.
    pub async fn snapshot(&self, session_id: &str) -> Session {
        let session = self.store.get_session(session_id).await;
        if session.is_authenticated() {
            self.store.touch(session_id).await;
        }
        session
    }

    /// Re-reads the principal from the backend. A rejected token logs the
    /// session out.
    pub async fn refresh_principal(&self, session_id: &str) -> Result<Principal, ServiceError> {
        let Some(token) = self.store.get_token(session_id).await else {
            return Err(ServiceError::NotAuthenticated);
        };

        match self.gateway.current_user(&token).await {
            Ok(principal) => {
                if !self
                    .store
                    .replace_principal(session_id, &token, principal.clone())
                    .await
                {
                    warn!("Session changed while refreshing the principal, keeping it as is");
                    return Err(ServiceError::NotAuthenticated);
                }
                Ok(principal)
            }
            Err(ServiceError::NotAuthenticated) => {
                warn!("Backend rejected session token, logging out");
                self.store.invalidate(session_id, &token).await;
                Err(ServiceError::NotAuthenticated)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{BackendClientTrait, SessionStoreTrait},
        cache::{LocalSessionStore, SessionRegistry},
        domain::requests::LoginRequest,
        model::Role,
        testing::StubBackend,
    };
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Registry that logs the session out right before a principal refresh
    /// lands, the way a concurrent logout request would.
    struct LogoutBeforeRefresh {
        inner: SessionRegistry,
    }

    #[async_trait]
    impl SessionStoreTrait for LogoutBeforeRefresh {
        async fn set_session(&self, session_id: &str, token: String, principal: Principal) {
            self.inner.set_session(session_id, token, principal).await
        }

        async fn clear_session(&self, session_id: &str) -> bool {
            self.inner.clear_session(session_id).await
        }

        async fn get_session(&self, session_id: &str) -> Session {
            self.inner.get_session(session_id).await
        }

        async fn invalidate(&self, session_id: &str, stale_token: &str) -> bool {
            self.inner.invalidate(session_id, stale_token).await
        }

        async fn replace_principal(
            &self,
            session_id: &str,
            expected_token: &str,
            principal: Principal,
        ) -> bool {
            self.inner.clear_session(session_id).await;
            self.inner
                .replace_principal(session_id, expected_token, principal)
                .await
        }

        async fn touch(&self, session_id: &str) -> bool {
            self.inner.touch(session_id).await
        }

        async fn purge_expired(&self) -> usize {
            self.inner.purge_expired().await
        }

        async fn active_sessions(&self) -> usize {
            self.inner.active_sessions().await
        }
    }

    fn service() -> (Arc<StubBackend>, DynSessionStore, SessionService) {
        let stub = Arc::new(StubBackend::with_default_accounts());
        let store: DynSessionStore = Arc::new(SessionRegistry::new(chrono::Duration::minutes(30)));
        let service = SessionService::new(CredentialGateway::new(stub.clone()), store.clone());
        (stub, store, service)
    }

    #[tokio::test]
    async fn login_populates_store() {
        let (_, store, service) = service();

        service.login("sid", "admin", "admin123").await.unwrap();

        let session = service.snapshot("sid").await;
        assert_eq!(session.token(), Some("tok1"));
        assert!(store.is_authenticated("sid").await);
        assert!(!store.is_authenticated("other").await);
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_state() {
        let (_, _, service) = service();

        assert!(service.login("sid", "admin", "wrong").await.is_err());
        assert_eq!(service.snapshot("sid").await, Session::Anonymous);

        service.login("sid", "alice", "secret1").await.unwrap();
        assert!(service.login("sid", "admin", "wrong").await.is_err());
        assert_eq!(service.snapshot("sid").await.token(), Some("tok1"));
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let (_, store, service) = service();
        service.login("sid", "admin", "admin123").await.unwrap();

        assert!(service.logout("sid").await);
        assert_eq!(store.get_token("sid").await, None);
        assert_eq!(store.get_principal("sid").await, None);
        assert!(!service.logout("sid").await);
    }

    #[tokio::test]
    async fn register_does_not_log_in() {
        let (_, store, service) = service();
        let req = RegisterRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "123456".into(),
            confirm_password: "123456".into(),
            role: Role::User,
        };

        service.register(req).await.unwrap();
        assert_eq!(store.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn refresh_picks_up_role_change() {
        let (stub, _, service) = service();
        service.login("sid", "alice", "secret1").await.unwrap();

        let admin = stub
            .login(&LoginRequest {
                username: "admin".into(),
                password: "admin123".into(),
            })
            .await
            .unwrap()
            .access_token;
        stub.update_role(&admin, 2, Role::Admin).await.unwrap();

        let principal = service.refresh_principal("sid").await.unwrap();
        assert_eq!(principal.role, Role::Admin);
        assert!(crate::service::guard::is_admin(&service.snapshot("sid").await));
    }

    #[tokio::test]
    async fn refresh_with_revoked_token_forces_logout() {
        let (stub, store, service) = service();
        service.login("sid", "alice", "secret1").await.unwrap();
        stub.revoke_token("tok1");

        assert!(matches!(
            service.refresh_principal("sid").await,
            Err(ServiceError::NotAuthenticated)
        ));
        assert!(!store.is_authenticated("sid").await);
    }

    #[tokio::test]
    async fn single_user_variant_behaves_the_same() {
        let stub = Arc::new(StubBackend::with_default_accounts());
        let service = SessionService::new(
            CredentialGateway::new(stub),
            Arc::new(LocalSessionStore::new()),
        );

        service.login("", "admin", "admin123").await.unwrap();
        assert!(service.snapshot("").await.is_authenticated());
        assert!(service.logout("").await);
        assert!(!service.snapshot("").await.is_authenticated());
    }

    #[tokio::test]
    async fn logout_during_refresh_stays_logged_out() {
        let stub = Arc::new(StubBackend::with_default_accounts());
        let store: DynSessionStore = Arc::new(LogoutBeforeRefresh {
            inner: SessionRegistry::new(chrono::Duration::minutes(30)),
        });
        let service = SessionService::new(CredentialGateway::new(stub), store.clone());
        service.login("sid", "alice", "secret1").await.unwrap();

        assert!(matches!(
            service.refresh_principal("sid").await,
            Err(ServiceError::NotAuthenticated)
        ));
        assert_eq!(store.get_session("sid").await, Session::Anonymous);
        assert_eq!(store.get_token("sid").await, None);
    }

    #[tokio::test]
    async fn refresh_never_overwrites_a_newer_login() {
        let (_, store, service) = service();
        service.login("sid", "alice", "secret1").await.unwrap();

        let admin = service.gateway().login("admin", "admin123").await.unwrap();
        let (Some(token), Some(principal)) = (admin.token(), admin.principal()) else {
            panic!("admin login should be authenticated");
        };
        assert!(!store.replace_principal("sid", token, principal.clone()).await);
        assert_eq!(store.get_token("sid").await.as_deref(), Some("tok1"));
    }
}
