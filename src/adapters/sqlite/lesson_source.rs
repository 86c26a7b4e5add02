//! Reads published lessons and their reading lists from platform tables.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Lesson, LessonId, LessonStatus, ReadingItem};
use crate::domain::ports::LessonSource;

#[derive(Clone)]
pub struct SqliteLessonSource {
    pool: SqlitePool,
}

impl SqliteLessonSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn reading_list(&self, lesson_id: LessonId) -> DomainResult<Vec<ReadingItem>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT title, description FROM reading_list_items WHERE lesson_id = ? ORDER BY position, id",
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(title, description)| ReadingItem { title, description })
            .collect())
    }
}

#[async_trait]
impl LessonSource for SqliteLessonSource {
    async fn published_lessons(&self, only: Option<LessonId>) -> DomainResult<Vec<Lesson>> {
        let rows: Vec<LessonRow> = sqlx::query_as(
            "SELECT id, unit_code, title, description, objectives, status FROM lessons
             WHERE status = 'published' AND (? IS NULL OR id = ?)
             ORDER BY id",
        )
        .bind(only)
        .bind(only)
        .fetch_all(&self.pool)
        .await?;

        let mut lessons = Vec::with_capacity(rows.len());
        for row in rows {
            let reading_list = self.reading_list(row.id).await?;
            let mut lesson: Lesson = row.try_into()?;
            lesson.reading_list = reading_list;
            lessons.push(lesson);
        }
        Ok(lessons)
    }
}

#[derive(sqlx::FromRow)]
struct LessonRow {
    id: i64,
    unit_code: String,
    title: String,
    description: String,
    objectives: String,
    status: String,
}

impl TryFrom<LessonRow> for Lesson {
    type Error = DomainError;

    fn try_from(row: LessonRow) -> Result<Self, Self::Error> {
        let status = LessonStatus::from_str(&row.status).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid lesson status: {}", row.status))
        })?;

        Ok(Lesson {
            id: row.id,
            unit_code: row.unit_code,
            title: row.title,
            description: row.description,
            objectives: row.objectives,
            status,
            reading_list: Vec::new(),
        })
    }
}
