//! Offline lesson indexing
//!
//! For each published lesson: assemble its text, chunk, embed, and write
//! the chunks. A lesson that fails is recorded in the report and the run
//! moves on to the next one.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{estimate_tokens, IndexOutcome, Lesson, LessonId, NewChunk};
use crate::domain::ports::{ChunkStore, EmbeddingProvider, LessonSource};
use crate::services::chunker::TextChunker;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOptions {
    /// Restrict the run to one lesson
    pub lesson_id: Option<LessonId>,
    /// Replace existing chunks instead of skipping indexed lessons
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LessonIndexStatus {
    Indexed { chunks: usize, replaced: bool },
    Skipped { existing: usize },
    /// The lesson produced no chunk text
    Empty,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonIndexResult {
    pub lesson_id: LessonId,
    pub unit_code: String,
    pub title: String,
    #[serde(flatten)]
    pub status: LessonIndexStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub lessons: Vec<LessonIndexResult>,
    pub lessons_indexed: usize,
    pub chunks_created: usize,
    pub lessons_skipped: usize,
    pub lessons_failed: usize,
}

impl IndexReport {
    fn push(&mut self, result: LessonIndexResult) {
        match &result.status {
            LessonIndexStatus::Indexed { chunks, .. } => {
                self.lessons_indexed += 1;
                self.chunks_created += chunks;
            }
            LessonIndexStatus::Skipped { .. } | LessonIndexStatus::Empty => self.lessons_skipped += 1,
            LessonIndexStatus::Failed { .. } => self.lessons_failed += 1,
        }
        self.lessons.push(result);
    }
}

pub struct LessonIndexer {
    source: Arc<dyn LessonSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
    chunker: TextChunker,
}

impl LessonIndexer {
    pub fn new(
        source: Arc<dyn LessonSource>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ChunkStore>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            source,
            embedder,
            store,
            chunker,
        }
    }

    /// Index every eligible lesson
    ///
    /// # Errors
    /// Returns error if:
    /// - The lesson listing fails
    /// - `options.lesson_id` names no published lesson
    pub async fn run(&self, options: IndexOptions) -> DomainResult<IndexReport> {
        let lessons = self.source.published_lessons(options.lesson_id).await?;
        if let (Some(lesson_id), true) = (options.lesson_id, lessons.is_empty()) {
            return Err(DomainError::LessonNotFound(lesson_id));
        }

        info!(lessons = lessons.len(), force = options.force, "indexing lessons");

        let mut report = IndexReport::default();
        for lesson in &lessons {
            let status = self.index_lesson(lesson, options.force).await;
            report.push(LessonIndexResult {
                lesson_id: lesson.id,
                unit_code: lesson.unit_code.clone(),
                title: lesson.title.clone(),
                status,
            });
        }

        info!(
            lessons_indexed = report.lessons_indexed,
            chunks_created = report.chunks_created,
            lessons_skipped = report.lessons_skipped,
            lessons_failed = report.lessons_failed,
            "indexing finished"
        );
        Ok(report)
    }

    pub async fn index_lesson(&self, lesson: &Lesson, force: bool) -> LessonIndexStatus {
        match self.try_index_lesson(lesson, force).await {
            Ok(status) => status,
            Err(e) => {
                warn!(lesson_id = lesson.id, error = %e, "failed to index lesson");
                LessonIndexStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_index_lesson(&self, lesson: &Lesson, force: bool) -> DomainResult<LessonIndexStatus> {
        if !force {
            let existing = self.store.count_for_lesson(lesson.id).await?;
            if existing > 0 {
                return Ok(LessonIndexStatus::Skipped { existing });
            }
        }

        let texts = self.chunker.chunk(&lesson.index_text());
        if texts.is_empty() {
            return Ok(LessonIndexStatus::Empty);
        }

        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(DomainError::UpstreamFailed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let chunks = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| {
                let tokens = estimate_tokens(&text);
                NewChunk::new(text, embedding, tokens)
            })
            .collect();

        let status = match self.store.index(lesson.id, chunks, force).await? {
            IndexOutcome::Inserted { chunks } => LessonIndexStatus::Indexed {
                chunks,
                replaced: false,
            },
            IndexOutcome::Replaced { chunks, .. } => LessonIndexStatus::Indexed {
                chunks,
                replaced: true,
            },
            IndexOutcome::Skipped { existing } => LessonIndexStatus::Skipped { existing },
        };

        info!(lesson_id = lesson.id, unit_code = %lesson.unit_code, ?status, "indexed lesson");
        Ok(status)
    }
}
