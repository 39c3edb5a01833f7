use crate::{abstract_trait::DynSessionStore, utils::Metrics};
use std::time::Duration;
use tracing::debug;

/// Periodically drops idle sessions and publishes the live count.
pub async fn run_session_sweeper(store: DynSessionStore, every: Duration, metrics: Metrics) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let purged = store.purge_expired().await;
        let active = store.active_sessions().await;
        metrics.set_active_sessions(active);
        debug!("Session sweep: {} purged, {} active", purged, active);
    }
}
