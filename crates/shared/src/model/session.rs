use crate::model::Principal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login state of one logical session.
///
/// A token is only ever stored together with the principal it was issued
/// for, so "authenticated" cannot disagree with the stored fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        token: String,
        principal: Principal,
    },
}

impl Session {
    pub fn authenticated(token: impl Into<String>, principal: Principal) -> Self {
        Session::Authenticated {
            token: token.into(),
            principal,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, .. } => Some(token.as_str()),
            Session::Anonymous => None,
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Session::Authenticated { principal, .. } => Some(principal),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }
}
