mod myconfig;

pub use self::myconfig::{BackendConfig, BackendTimeouts, Config, SessionConfig};
