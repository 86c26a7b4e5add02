//! Domain layer for the lesson assistant
//!
//! Plain data models, the error taxonomy, and the port traits that adapters
//! implement. Nothing in here talks to a database or the network.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
