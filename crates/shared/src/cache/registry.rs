use crate::{
    abstract_trait::SessionStoreTrait,
    model::{Principal, Session},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct SessionEntry {
    session: Session,
    last_seen: DateTime<Utc>,
}

impl SessionEntry {
    fn new(session: Session) -> Self {
        Self {
            session,
            last_seen: Utc::now(),
        }
    }
}

/// In-memory session table for the multi-session portal.
///
/// Entries are only ever inserted, replaced or removed as a whole while the
/// write lock is held.
pub struct SessionRegistry {
    entries: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Removes every entry last used before `cutoff`.
    pub async fn purge_idle_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen >= cutoff);
        before - entries.len()
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen > self.ttl
    }
}

#[async_trait]
impl SessionStoreTrait for SessionRegistry {
    async fn set_session(&self, session_id: &str, token: String, principal: Principal) {
        let username = principal.username.clone();
        let entry = SessionEntry::new(Session::authenticated(token, principal));

        self.entries
            .write()
            .await
            .insert(session_id.to_string(), entry);

        debug!("Session populated for user: {}", username);
    }

    async fn clear_session(&self, session_id: &str) -> bool {
        let removed = self.entries.write().await.remove(session_id).is_some();
        if removed {
            debug!("Session cleared");
        }
        removed
    }

    async fn get_session(&self, session_id: &str) -> Session {
        let entries = self.entries.read().await;
        match entries.get(session_id) {
            Some(entry) if !self.is_expired(entry, Utc::now()) => entry.session.clone(),
            _ => Session::Anonymous,
        }
    }

    async fn invalidate(&self, session_id: &str, stale_token: &str) -> bool {
        let mut entries = self.entries.write().await;

        let holds_token = entries
            .get(session_id)
            .is_some_and(|entry| entry.session.token() == Some(stale_token));

        if holds_token {
            entries.remove(session_id);
            info!("Session invalidated after backend rejected its token");
        }
        holds_token
    }

    async fn replace_principal(
        &self,
        session_id: &str,
        expected_token: &str,
        principal: Principal,
    ) -> bool {
        let mut entries = self.entries.write().await;
        let now = Utc::now();

        let Some(entry) = entries.get_mut(session_id) else {
            return false;
        };

        if self.is_expired(entry, now) || entry.session.token() != Some(expected_token) {
            return false;
        }

        entry.session = Session::authenticated(expected_token, principal);
        entry.last_seen = now;
        true
    }

    async fn touch(&self, session_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let now = Utc::now();

        let Some(entry) = entries.get_mut(session_id) else {
            return false;
        };

        if self.is_expired(entry, now) {
            entries.remove(session_id);
            return false;
        }

        entry.last_seen = now;
        true
    }

    async fn purge_expired(&self) -> usize {
        let purged = self.purge_idle_since(Utc::now() - self.ttl).await;
        if purged > 0 {
            info!("Purged {} idle sessions", purged);
        }
        purged
    }

    async fn active_sessions(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use std::sync::Arc;

    fn principal(username: &str, role: Role) -> Principal {
        Principal {
            id: 1,
            username: username.into(),
            email: format!("{username}@example.com"),
            role,
            is_active: true,
            last_login: None,
            created_at: "2024-05-01T10:00:00".into(),
        }
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Duration::minutes(30))
    }

    #[tokio::test]
    async fn unknown_id_reads_as_anonymous() {
        let registry = registry();

        assert_eq!(registry.get_session("nope").await, Session::Anonymous);
        assert_eq!(registry.get_token("nope").await, None);
        assert!(!registry.is_authenticated("nope").await);
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_id() {
        let registry = registry();
        registry
            .set_session("a", "tok-a".into(), principal("alice", Role::User))
            .await;
        registry
            .set_session("b", "tok-b".into(), principal("root", Role::Admin))
            .await;

        assert_eq!(registry.get_token("a").await.as_deref(), Some("tok-a"));
        assert_eq!(registry.get_token("b").await.as_deref(), Some("tok-b"));

        registry.clear_session("a").await;
        assert!(!registry.is_authenticated("a").await);
        assert!(registry.is_authenticated("b").await);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let registry = registry();
        registry
            .set_session("a", "tok".into(), principal("alice", Role::User))
            .await;

        assert!(registry.clear_session("a").await);
        assert!(!registry.clear_session("a").await);
        assert_eq!(registry.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn stale_token_does_not_clear_newer_login() {
        let registry = registry();
        registry
            .set_session("a", "old".into(), principal("alice", Role::User))
            .await;
        registry
            .set_session("a", "new".into(), principal("alice", Role::User))
            .await;

        assert!(!registry.invalidate("a", "old").await);
        assert_eq!(registry.get_token("a").await.as_deref(), Some("new"));

        assert!(registry.invalidate("a", "new").await);
        assert_eq!(registry.get_session("a").await, Session::Anonymous);
    }

    #[tokio::test]
    async fn idle_sessions_are_purged() {
        let registry = SessionRegistry::new(Duration::zero());
        registry
            .set_session("a", "tok".into(), principal("alice", Role::User))
            .await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert_eq!(registry.get_session("a").await, Session::Anonymous);
        assert!(!registry.touch("a").await);
        assert_eq!(registry.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn purge_keeps_recent_sessions() {
        let registry = registry();
        registry
            .set_session("a", "tok".into(), principal("alice", Role::User))
            .await;

        assert_eq!(registry.purge_expired().await, 0);
        assert_eq!(
            registry
                .purge_idle_since(Utc::now() + Duration::seconds(1))
                .await,
            1
        );
    }

    #[tokio::test]
    async fn concurrent_logins_never_mix_fields() {
        let registry = Arc::new(registry());

        let writers = (0..20).map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let name = format!("user{i}");
                registry
                    .set_session("shared", format!("tok-{name}"), principal(&name, Role::User))
                    .await;
            })
        });

        for handle in writers {
            handle.await.unwrap();
        }

        let session = registry.get_session("shared").await;
        let username = &session.principal().unwrap().username;
        assert_eq!(session.token(), Some(format!("tok-{username}").as_str()));
    }

    #[tokio::test]
    async fn replace_principal_skips_cleared_or_relogged_sessions() {
        let registry = registry();

        assert!(
            !registry
                .replace_principal("a", "tok", principal("alice", Role::Admin))
                .await
        );
        assert_eq!(registry.active_sessions().await, 0);

        registry
            .set_session("a", "new".into(), principal("alice", Role::User))
            .await;
        assert!(
            !registry
                .replace_principal("a", "old", principal("alice", Role::Admin))
                .await
        );
        assert!(
            registry
                .replace_principal("a", "new", principal("alice", Role::Admin))
                .await
        );

        let session = registry.get_session("a").await;
        assert_eq!(session.token(), Some("new"));
        assert_eq!(session.principal().map(|p| p.role), Some(Role::Admin));
    }
}
