mod auth;
pub mod guard;
mod portal;
mod session;

pub use self::auth::CredentialGateway;
pub use self::guard::{Access, Capability, Grant};
pub use self::portal::{DEFAULT_TOP_K, PortalService, PortalServiceDeps};
pub use self::session::SessionService;
