use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DocumentChunk, IndexOutcome, LessonId, LessonScope, NewChunk, ScoredChunk};

/// Persistence of lesson chunks with nearest-neighbour search
///
/// Distances follow the cosine convention: 0 is identical direction, larger
/// is less similar. Every stored and queried vector has `dimension()`
/// components.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Why the store cannot serve vector queries, if it cannot.
    fn unavailable_reason(&self) -> Option<String>;

    fn is_available(&self) -> bool {
        self.unavailable_reason().is_none()
    }

    fn dimension(&self) -> usize;

    /// Write a lesson's chunks
    ///
    /// Without `force`, a lesson that already has chunks is left untouched
    /// and `IndexOutcome::Skipped` is returned. With `force`, the old chunks
    /// are deleted and the new ones inserted in a single transaction.
    ///
    /// # Errors
    /// Returns error if:
    /// - Any embedding has the wrong dimension (nothing is written)
    /// - Database operation fails (the transaction is rolled back)
    async fn index(
        &self,
        lesson_id: LessonId,
        chunks: Vec<NewChunk>,
        force: bool,
    ) -> DomainResult<IndexOutcome>;

    /// Up to `limit` chunks in `scope`, ordered by ascending distance to `query`.
    async fn nearest(
        &self,
        query: &[f32],
        limit: usize,
        scope: LessonScope,
    ) -> DomainResult<Vec<ScoredChunk>>;

    async fn count_for_lesson(&self, lesson_id: LessonId) -> DomainResult<usize>;

    /// All chunks for a lesson in chunk order.
    async fn chunks_for_lesson(&self, lesson_id: LessonId) -> DomainResult<Vec<DocumentChunk>>;
}
