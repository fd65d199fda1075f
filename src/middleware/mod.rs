//! Request logging. Access control lives in [`crate::auth::middleware`].

pub mod logging;

pub use logging::request_logging;
