//! In-memory stand-ins for external services.

pub mod model_server;

pub use model_server::MockModelServer;
