use crate::di::DependenciesInject;
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynBackendClient, DynSessionStore},
    cache::{SessionRegistry, run_session_sweeper},
    client::BackendHttpClient,
    config::{Config, SessionConfig},
    utils::{Metrics, SystemMetrics, run_metrics_collector},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub session_config: SessionConfig,
    pub session_store: DynSessionStore,
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub metrics: Metrics,
    pub system_metrics: Arc<SystemMetrics>,
}

impl AppState {
    /// Wires the real backend client and starts the background tasks.
    pub async fn new(config: &Config) -> Result<Self> {
        let metrics = Metrics::new();

        info!("Using document backend at {}", config.backend.base_url);
        let backend = BackendHttpClient::new(config.backend.clone(), metrics.clone())
            .context("Failed to build backend HTTP client")?;

        let store: DynSessionStore = Arc::new(SessionRegistry::new(config.session.ttl));

        let state = Self::build(
            Arc::new(backend),
            store,
            config.session.clone(),
            metrics,
        )
        .await;

        tokio::spawn(run_metrics_collector(state.system_metrics.clone()));
        tokio::spawn(run_session_sweeper(
            state.session_store.clone(),
            state.session_config.sweep_interval,
            state.metrics.clone(),
        ));

        Ok(state)
    }

    /// Assembles the state around an existing backend without spawning tasks.
    pub async fn build(
        backend: DynBackendClient,
        session_store: DynSessionStore,
        session_config: SessionConfig,
        metrics: Metrics,
    ) -> Self {
        let registry = Arc::new(Mutex::new(Registry::default()));
        let system_metrics = Arc::new(SystemMetrics::new());

        {
            let mut registry = registry.lock().await;
            metrics.register(&mut registry);
            system_metrics.register(&mut registry);
        }

        let di_container = DependenciesInject::new(backend, session_store.clone());

        Self {
            session_config,
            session_store,
            di_container,
            registry,
            metrics,
            system_metrics,
        }
    }
}
