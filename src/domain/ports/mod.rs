//! Port trait definitions
//!
//! Async traits at every seam where the assistant touches something outside
//! its own process:
//! - EmbeddingProvider / CompletionProvider: the model server
//! - ChunkStore: vector persistence and nearest-neighbour search
//! - QuestionLog: the append-only interaction log
//! - LessonSource / ProfileProvider: read-only views of platform data

pub mod chunk_store;
pub mod completion;
pub mod embedding;
pub mod lesson_source;
pub mod profile;
pub mod question_log;

pub use chunk_store::ChunkStore;
pub use completion::CompletionProvider;
pub use embedding::EmbeddingProvider;
pub use lesson_source::LessonSource;
pub use profile::ProfileProvider;
pub use question_log::QuestionLog;
