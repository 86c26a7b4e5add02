pub mod assistant;
pub mod chunker;
pub mod indexer;
pub mod prompt;
pub mod retriever;
pub mod usage_gate;

pub use assistant::{AskRequest, AskResponse, AssistantError, AssistantService, Source, UsageReport};
pub use chunker::TextChunker;
pub use indexer::{IndexOptions, IndexReport, LessonIndexResult, LessonIndexStatus, LessonIndexer};
pub use retriever::ContextRetriever;
pub use usage_gate::{Admission, UsageGate};
