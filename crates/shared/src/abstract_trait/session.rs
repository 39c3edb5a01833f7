use crate::model::{Principal, Session};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynSessionStore = Arc<dyn SessionStoreTrait + Send + Sync>;

/// Storage for login state, keyed by session id.
///
/// Reads never fail: an unknown id is an anonymous session. Writes replace or
/// remove a whole record, so a reader sees either the previous login or the
/// new one, never a mix.
#[async_trait]
pub trait SessionStoreTrait {
    async fn set_session(&self, session_id: &str, token: String, principal: Principal);

    /// Removes the record. Returns `false` when there was nothing to remove.
    async fn clear_session(&self, session_id: &str) -> bool;

    async fn get_session(&self, session_id: &str) -> Session;

    /// Clears the session only while it still holds `stale_token`.
    async fn invalidate(&self, session_id: &str, stale_token: &str) -> bool;

    /// Swaps in a fresh principal only while the session still holds
    /// `expected_token`. A cleared or re-logged session is left untouched.
    async fn replace_principal(
        &self,
        session_id: &str,
        expected_token: &str,
        principal: Principal,
    ) -> bool;

    /// Marks the session as used now. Returns `false` for unknown ids.
    async fn touch(&self, session_id: &str) -> bool;

    /// Drops sessions idle for longer than the store's TTL.
    async fn purge_expired(&self) -> usize;

    async fn active_sessions(&self) -> usize;

    async fn get_token(&self, session_id: &str) -> Option<String> {
        self.get_session(session_id).await.token().map(str::to_owned)
    }

    async fn get_principal(&self, session_id: &str) -> Option<Principal> {
        self.get_session(session_id).await.principal().cloned()
    }

    async fn is_authenticated(&self, session_id: &str) -> bool {
        self.get_session(session_id).await.is_authenticated()
    }
}
