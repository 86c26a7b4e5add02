//! Ollama-compatible model server adapter.

pub mod client;

pub use client::{OllamaClient, OllamaConfig};
