use crate::{
    abstract_trait::DynBackendClient,
    domain::requests::{CreateUserRequest, LoginRequest, RegisterRequest},
    errors::{ClientError, ServiceError},
    model::{Principal, Session},
};
use tracing::{error, info, warn};
use validator::Validate;

/// Exchanges credentials for a bearer token. Holds no state of its own and
/// never keeps a password past the call.
#[derive(Clone)]
pub struct CredentialGateway {
    backend: DynBackendClient,
}

impl CredentialGateway {
    pub fn new(backend: DynBackendClient) -> Self {
        Self { backend }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ServiceError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        req.validate()?;

        info!("Login attempt for user: {}", req.username);

        match self.backend.login(&req).await {
            Ok(res) if res.access_token.is_empty() => {
                error!("Login response for {} carried no access token", req.username);
                Err(ServiceError::BackendUnreachable(
                    "login response without access token".into(),
                ))
            }
            Ok(res) => {
                info!("User {} logged in as {}", res.user.username, res.user.role);
                Ok(Session::authenticated(res.access_token, res.user))
            }
            Err(err) if err.is_unreachable() => {
                error!("Login for {} failed, backend unreachable: {}", req.username, err);
                Err(ServiceError::BackendUnreachable(err.to_string()))
            }
            Err(err) => {
                warn!("Login rejected for {}: {}", req.username, err);
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    /// Creates an account. The caller stays logged out.
    pub async fn register(&self, req: RegisterRequest) -> Result<Principal, ServiceError> {
        req.validate()?;

        let principal = self.backend.register(&req).await.map_err(|err| {
            error!("Registration of {} failed: {}", req.username, err);
            registration_error(err)
        })?;

        info!("Registered user {} with role {}", principal.username, principal.role);
        Ok(principal)
    }

    pub async fn current_user(&self, token: &str) -> Result<Principal, ServiceError> {
        self.backend.current_user(token).await.map_err(ServiceError::from)
    }

    /// Leaves role enforcement to the backend; any failure reads as `false`.
    pub async fn create_user_as_admin(&self, token: &str, req: CreateUserRequest) -> bool {
        self.try_create_user_as_admin(token, req).await.is_ok()
    }

    pub async fn try_create_user_as_admin(
        &self,
        token: &str,
        req: CreateUserRequest,
    ) -> Result<(), ServiceError> {
        req.validate()?;

        match self.backend.create_user(token, &req).await {
            Ok(()) => {
                info!("Created user {} with role {}", req.username, req.role);
                Ok(())
            }
            Err(err) => {
                warn!("Creating user {} failed: {}", req.username, err);
                Err(err.into())
            }
        }
    }
}

fn registration_error(err: ClientError) -> ServiceError {
    match err {
        ClientError::Unauthorized | ClientError::Forbidden => {
            ServiceError::RequestFailed(err.to_string())
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Role, testing::StubBackend};
    use std::sync::Arc;

    fn gateway() -> (Arc<StubBackend>, CredentialGateway) {
        let stub = Arc::new(StubBackend::with_default_accounts());
        (stub.clone(), CredentialGateway::new(stub))
    }

    fn register_request(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn admin_login_issues_token() {
        let (_, gateway) = gateway();

        let session = gateway.login("admin", "admin123").await.unwrap();
        assert_eq!(session.token(), Some("tok1"));
        assert_eq!(session.principal().map(|p| p.role), Some(Role::Admin));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (_, gateway) = gateway();

        let err = gateway.login("admin", "nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unreachable_backend_is_distinct_from_bad_password() {
        let (stub, gateway) = gateway();
        stub.set_unreachable(true);

        let err = gateway.login("admin", "admin123").await.unwrap_err();
        assert!(matches!(err, ServiceError::BackendUnreachable(_)));
        assert!(err.is_login_failure());
    }

    #[tokio::test]
    async fn empty_fields_never_reach_backend() {
        let (stub, gateway) = gateway();

        assert!(matches!(
            gateway.login("", "x").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            gateway.login("admin", "").await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn register_validates_before_calling_backend() {
        let (stub, gateway) = gateway();

        let err = gateway
            .register(register_request("12345", "12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = gateway
            .register(register_request("123456", "654321"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(stub.call_count(), 0);

        let principal = gateway
            .register(register_request("123456", "123456"))
            .await
            .unwrap();
        assert_eq!(principal.username, "bob");
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_registration_reports_backend_detail() {
        let (_, gateway) = gateway();
        let mut req = register_request("123456", "123456");
        req.username = "alice".into();

        match gateway.register(req).await {
            Err(ServiceError::RequestFailed(msg)) => assert_eq!(msg, "Username already registered"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_user_with_user_token_is_false() {
        let (_, gateway) = gateway();
        let user = gateway.login("alice", "secret1").await.unwrap();
        let admin = gateway.login("admin", "admin123").await.unwrap();

        let req = CreateUserRequest {
            username: "carol".into(),
            email: "carol@example.com".into(),
            password: "secret1".into(),
            role: Role::User,
        };

        let token = user.token().unwrap();
        assert!(!gateway.create_user_as_admin(token, req.clone()).await);
        assert!(matches!(
            gateway.try_create_user_as_admin(token, req.clone()).await,
            Err(ServiceError::AccessDenied(_))
        ));

        assert!(gateway.create_user_as_admin(admin.token().unwrap(), req).await);
    }
}
