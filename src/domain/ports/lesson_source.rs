use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Lesson, LessonId};

/// Read-only access to lessons owned by the learning platform
#[async_trait]
pub trait LessonSource: Send + Sync {
    /// Published lessons with their reading lists, ordered by id.
    ///
    /// With `only`, the result holds at most that one lesson; an unknown or
    /// unpublished id yields an empty list.
    async fn published_lessons(&self, only: Option<LessonId>) -> DomainResult<Vec<Lesson>>;
}
