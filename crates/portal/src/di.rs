use shared::{
    abstract_trait::{DynBackendClient, DynSessionStore},
    service::{CredentialGateway, PortalService, PortalServiceDeps, SessionService},
};

#[derive(Clone)]
pub struct DependenciesInject {
    pub session_service: SessionService,
    pub portal_service: PortalService,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("session_service", &"SessionService")
            .field("portal_service", &"PortalService")
            .finish()
    }
}

impl DependenciesInject {
    pub fn new(backend: DynBackendClient, store: DynSessionStore) -> Self {
        let gateway = CredentialGateway::new(backend.clone());
        let session_service = SessionService::new(gateway, store.clone());
        let portal_service = PortalService::new(PortalServiceDeps { backend, store });

        Self {
            session_service,
            portal_service,
        }
    }
}
