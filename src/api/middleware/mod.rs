pub mod auth;
pub mod logging;

pub use auth::{require_api_key, Principal};
pub use logging::request_logger;
