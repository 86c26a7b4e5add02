//! CLI command implementations.

pub mod ask;
pub mod index;
pub mod init;
pub mod serve;
pub mod usage;
