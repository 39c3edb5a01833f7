mod client;
mod error;
mod http;
mod service;

pub use self::client::ClientError;
pub use self::error::ErrorResponse;
pub use self::http::HttpError;
pub use self::service::{LOGIN_FAILED_MESSAGE, ServiceError};
