use crate::{
    abstract_trait::SessionStoreTrait,
    model::{Principal, Session},
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Single-slot store for one local user. The session id is ignored and the
/// slot never expires.
#[derive(Default)]
pub struct LocalSessionStore {
    slot: RwLock<Session>,
}

impl LocalSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStoreTrait for LocalSessionStore {
    async fn set_session(&self, _session_id: &str, token: String, principal: Principal) {
        *self.slot.write().await = Session::authenticated(token, principal);
    }

    async fn clear_session(&self, _session_id: &str) -> bool {
        let previous = std::mem::take(&mut *self.slot.write().await);
        previous.is_authenticated()
    }

    async fn get_session(&self, _session_id: &str) -> Session {
        self.slot.read().await.clone()
    }

    async fn invalidate(&self, _session_id: &str, stale_token: &str) -> bool {
        let mut slot = self.slot.write().await;
        if slot.token() == Some(stale_token) {
            *slot = Session::Anonymous;
            true
        } else {
            false
        }
    }

    async fn replace_principal(
        &self,
        _session_id: &str,
        expected_token: &str,
        principal: Principal,
    ) -> bool {
        let mut slot = self.slot.write().await;
        if slot.token() != Some(expected_token) {
            return false;
        }
        *slot = Session::authenticated(expected_token, principal);
        true
    }

    async fn touch(&self, _session_id: &str) -> bool {
        self.slot.read().await.is_authenticated()
    }

    async fn purge_expired(&self) -> usize {
        0
    }

    async fn active_sessions(&self) -> usize {
        usize::from(self.slot.read().await.is_authenticated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn admin() -> Principal {
        Principal {
            id: 1,
            username: "root".into(),
            email: "root@example.com".into(),
            role: Role::Admin,
            is_active: true,
            last_login: None,
            created_at: "2024-05-01T10:00:00".into(),
        }
    }

    #[tokio::test]
    async fn login_then_logout() {
        let store = LocalSessionStore::new();
        assert!(!store.is_authenticated("any").await);

        store.set_session("any", "tok1".into(), admin()).await;
        assert_eq!(store.get_token("other").await.as_deref(), Some("tok1"));
        assert_eq!(store.get_principal("x").await.map(|p| p.role), Some(Role::Admin));
        assert_eq!(store.active_sessions().await, 1);

        assert!(store.clear_session("any").await);
        assert_eq!(store.get_session("any").await, Session::Anonymous);
        assert!(!store.clear_session("any").await);
    }

    #[tokio::test]
    async fn invalidate_compares_token() {
        let store = LocalSessionStore::new();
        store.set_session("", "tok2".into(), admin()).await;

        assert!(!store.invalidate("", "tok1").await);
        assert!(store.is_authenticated("").await);
        assert!(store.invalidate("", "tok2").await);
        assert!(!store.is_authenticated("").await);
    }

    #[tokio::test]
    async fn replace_principal_needs_the_same_token() {
        let store = LocalSessionStore::new();
        let mut demoted = admin();
        demoted.role = Role::User;

        assert!(!store.replace_principal("", "tok1", demoted.clone()).await);
        assert!(!store.is_authenticated("").await);

        store.set_session("", "tok1".into(), admin()).await;
        assert!(!store.replace_principal("", "tok0", demoted.clone()).await);
        assert!(store.replace_principal("", "tok1", demoted).await);
        assert_eq!(store.get_principal("").await.map(|p| p.role), Some(Role::User));
        assert_eq!(store.get_token("").await.as_deref(), Some("tok1"));
    }
}
