//! Lesson Assist - retrieval-augmented study assistant
//!
//! Lesson content is chunked, embedded and stored in SQLite. Student
//! questions are answered by retrieving the nearest chunks, composing a
//! prompt with the student's profile, and calling a chat model, subject to
//! a per-user daily question limit.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): chunking, retrieval, quota, indexing, orchestration
//! - **Adapters** (`adapters`): SQLite, Ollama, in-memory mocks, HTTP API
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::Config;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AskRequest, AskResponse, AssistantError, AssistantService, LessonIndexer, TextChunker};
