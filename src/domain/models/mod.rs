pub mod chat;
pub mod chunk;
pub mod config;
pub mod lesson;
pub mod question;

/// Primary key of a lesson in the learning platform.
pub type LessonId = i64;

/// Primary key of a platform user.
pub type UserId = i64;

pub use chat::{estimate_tokens, ChatMessage, ChatRole};
pub use chunk::{
    ChunkingConfig, ContextChunk, DocumentChunk, IndexOutcome, LessonScope, NewChunk, ScoredChunk,
};
pub use config::{
    AssistantConfig, Config, DatabaseConfig, LoggingConfig, ModelServerConfig, RetrievalConfig,
    ServerConfig, VectorConfig, VectorSearch,
};
pub use lesson::{Lesson, LessonStatus, ReadingItem};
pub use question::{NewStudentQuestion, StudentQuestion};
