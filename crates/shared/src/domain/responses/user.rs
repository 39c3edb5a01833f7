use crate::model::{Principal, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub admins: usize,
    pub users: usize,
}

impl UserStats {
    pub fn from_users(users: &[Principal]) -> Self {
        let active = users.iter().filter(|u| u.is_active).count();
        let admins = users.iter().filter(|u| u.role == Role::Admin).count();

        Self {
            total: users.len(),
            active,
            inactive: users.len() - active,
            admins,
            users: users.len() - admins,
        }
    }
}
