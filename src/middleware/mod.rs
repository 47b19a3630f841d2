//! Request interceptors, outermost first:
//! [`RequestLogger`], [`SecurityHeaders`], [`ErrorCatcher`], then CORS.

pub mod error_catcher;
pub mod request_logger;
pub mod security_headers;

pub use error_catcher::ErrorCatcher;
pub use request_logger::RequestLogger;
pub use security_headers::SecurityHeaders;
