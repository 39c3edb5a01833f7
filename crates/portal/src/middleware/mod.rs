pub mod guard;
pub mod session;
pub mod validate;
