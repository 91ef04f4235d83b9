pub mod config;
pub mod endpoints;
pub mod error;
pub mod http_transport;
pub mod logging;
pub mod session_storage;
