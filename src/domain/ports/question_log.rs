use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewStudentQuestion, StudentQuestion, UserId};

/// Append-only log of question/answer exchanges
#[async_trait]
pub trait QuestionLog: Send + Sync {
    /// Append one interaction
    async fn record(&self, entry: NewStudentQuestion) -> DomainResult<StudentQuestion>;

    /// Count a user's interactions with `start <= created_at < end`
    async fn count_between(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<u32>;

    /// Most recent interactions for a user, newest first
    async fn recent(&self, user_id: UserId, limit: usize) -> DomainResult<Vec<StudentQuestion>>;
}
