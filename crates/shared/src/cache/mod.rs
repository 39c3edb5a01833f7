mod local;
mod registry;
mod sweeper;

pub use self::local::LocalSessionStore;
pub use self::registry::SessionRegistry;
pub use self::sweeper::run_session_sweeper;
