mod principal;
mod role;
mod session;

pub use self::principal::Principal;
pub use self::role::Role;
pub use self::session::Session;
