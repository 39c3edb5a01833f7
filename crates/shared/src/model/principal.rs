use crate::model::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cached copy of the backend's user record for whoever holds the session.
///
/// The portal never edits it locally: it is replaced by a fresh login or by
/// re-reading `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_login: Option<String>,
    pub created_at: String,
}

fn default_active() -> bool {
    true
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
