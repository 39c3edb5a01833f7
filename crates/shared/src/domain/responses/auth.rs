use crate::model::{Principal, Session};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: Principal,
}

/// What the presentation layer is told about its own session. The bearer
/// token stays on the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub is_admin: bool,
    pub user: Option<Principal>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        let user = session.principal().cloned();
        Self {
            authenticated: session.is_authenticated(),
            is_admin: user.as_ref().is_some_and(Principal::is_admin),
            user,
        }
    }
}
