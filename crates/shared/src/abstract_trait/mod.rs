mod backend;
mod session;

pub use self::backend::{BackendClientTrait, DynBackendClient};
pub use self::session::{DynSessionStore, SessionStoreTrait};
