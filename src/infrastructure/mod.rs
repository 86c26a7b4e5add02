//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging initialisation (tracing)

pub mod config;
pub mod logging;
