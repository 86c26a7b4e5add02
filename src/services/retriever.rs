//! Context retrieval for grounding answers
//!
//! Embeds the question and pulls the nearest stored chunks. With a lesson
//! hint, the lesson's own chunks fill the first slots and the remainder
//! comes from every other lesson.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ContextChunk, LessonId, LessonScope};
use crate::domain::ports::{ChunkStore, EmbeddingProvider};

/// Minimum number of lesson-local slots when a lesson hint is given.
const MIN_LESSON_SLOTS: usize = 3;

pub struct ContextRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
}

impl ContextRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn ChunkStore>) -> Self {
        Self { embedder, store }
    }

    /// Number of slots reserved for the hinted lesson, never more than `top_k`.
    pub fn lesson_slots(top_k: usize) -> usize {
        MIN_LESSON_SLOTS.max(top_k / 2).min(top_k)
    }

    /// Up to `top_k` chunks relevant to `question`, most relevant first
    /// within each tier.
    ///
    /// A failed question embedding yields an empty list. Store failures are
    /// returned to the caller.
    pub async fn retrieve(
        &self,
        question: &str,
        lesson_id: Option<LessonId>,
        top_k: usize,
    ) -> DomainResult<Vec<ContextChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query = match self.embedder.embed_one(question).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "question embedding failed, continuing without context");
                return Ok(Vec::new());
            }
        };

        let hits = match lesson_id {
            None => self.store.nearest(&query, top_k, LessonScope::All).await?,
            Some(lesson_id) => {
                let mut hits = self
                    .store
                    .nearest(&query, Self::lesson_slots(top_k), LessonScope::Only(lesson_id))
                    .await?;
                let remaining = top_k.saturating_sub(hits.len());
                if remaining > 0 {
                    hits.extend(
                        self.store
                            .nearest(&query, remaining, LessonScope::Except(lesson_id))
                            .await?,
                    );
                }
                hits
            }
        };

        debug!(lesson_id, top_k, chunks = hits.len(), "retrieved context");
        Ok(hits.into_iter().map(ContextChunk::from).collect())
    }
}
