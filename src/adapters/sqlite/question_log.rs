//! SQLite implementation of the QuestionLog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{format_datetime, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewStudentQuestion, StudentQuestion, UserId};
use crate::domain::ports::QuestionLog;

#[derive(Clone)]
pub struct SqliteQuestionLog {
    pool: SqlitePool,
}

impl SqliteQuestionLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionLog for SqliteQuestionLog {
    async fn record(&self, entry: NewStudentQuestion) -> DomainResult<StudentQuestion> {
        let result = sqlx::query(
            r#"INSERT INTO student_questions (user_id, question, answer, tokens_in, tokens_out, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.user_id)
        .bind(&entry.question)
        .bind(&entry.answer)
        .bind(i64::from(entry.tokens_in))
        .bind(i64::from(entry.tokens_out))
        .bind(format_datetime(&entry.created_at))
        .execute(&self.pool)
        .await?;

        Ok(StudentQuestion {
            id: result.last_insert_rowid(),
            user_id: entry.user_id,
            question: entry.question,
            answer: entry.answer,
            tokens_in: entry.tokens_in,
            tokens_out: entry.tokens_out,
            created_at: entry.created_at,
        })
    }

    async fn count_between(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM student_questions WHERE user_id = ? AND created_at >= ? AND created_at < ?",
        )
        .bind(user_id)
        .bind(format_datetime(&start))
        .bind(format_datetime(&end))
        .fetch_one(&self.pool)
        .await?;

        u32::try_from(count).map_err(|e| DomainError::SerializationError(e.to_string()))
    }

    async fn recent(&self, user_id: UserId, limit: usize) -> DomainResult<Vec<StudentQuestion>> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            "SELECT id, user_id, question, answer, tokens_in, tokens_out, created_at
             FROM student_questions WHERE user_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    user_id: i64,
    question: String,
    answer: String,
    tokens_in: i64,
    tokens_out: i64,
    created_at: String,
}

impl TryFrom<QuestionRow> for StudentQuestion {
    type Error = DomainError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let to_u32 = |v: i64| u32::try_from(v).map_err(|e| DomainError::SerializationError(e.to_string()));
        Ok(StudentQuestion {
            id: row.id,
            user_id: row.user_id,
            question: row.question,
            answer: row.answer,
            tokens_in: to_u32(row.tokens_in)?,
            tokens_out: to_u32(row.tokens_out)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
