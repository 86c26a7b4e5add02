//! Adapters for external systems.

pub mod http;
pub mod mock;
pub mod ollama;
pub mod sqlite;
