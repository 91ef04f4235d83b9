pub mod api_client;
pub mod bootstrap;
pub mod context;
pub mod dashboard;
pub mod resources;
pub mod session;
