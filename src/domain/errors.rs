//! Domain errors for the lesson assistant.

use thiserror::Error;

use super::models::LessonId;

/// Domain-level errors that can occur while indexing or answering questions.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Lesson not found: {0}")]
    LessonNotFound(LessonId),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Model server request failed: {0}")]
    UpstreamFailed(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
