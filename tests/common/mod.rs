//! Common test utilities for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use lesson_assist::adapters::mock::MockModelServer;
use lesson_assist::adapters::sqlite::{
    create_migrated_test_pool, SqliteChunkStore, SqliteLessonSource, SqliteProfileProvider,
    SqliteQuestionLog, VectorBackend,
};
use lesson_assist::domain::models::{
    AssistantConfig, ChunkingConfig, LessonId, NewChunk, RetrievalConfig, UserId,
};
use lesson_assist::domain::ports::{ChunkStore, EmbeddingProvider};
use lesson_assist::services::{AssistantService, LessonIndexer, TextChunker};
use sqlx::SqlitePool;

pub const DIM: usize = 64;

/// In-memory database, mock model server and scan-backed chunk store.
pub struct TestApp {
    pub pool: SqlitePool,
    pub model: Arc<MockModelServer>,
    pub store: Arc<SqliteChunkStore>,
    pub log: Arc<SqliteQuestionLog>,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = create_migrated_test_pool()
            .await
            .expect("Failed to create test database");
        Self {
            model: Arc::new(MockModelServer::new(DIM)),
            store: Arc::new(SqliteChunkStore::new(pool.clone(), DIM, VectorBackend::Scan)),
            log: Arc::new(SqliteQuestionLog::new(pool.clone())),
            pool,
        }
    }

    pub fn assistant(&self, daily_limit: u32) -> AssistantService {
        self.assistant_with_store(daily_limit, self.store.clone())
    }

    pub fn assistant_with_store(&self, daily_limit: u32, store: Arc<dyn ChunkStore>) -> AssistantService {
        AssistantService::new(
            store,
            self.model.clone(),
            self.model.clone(),
            Arc::new(SqliteProfileProvider::new(self.pool.clone())),
            self.log.clone(),
            AssistantConfig {
                daily_question_limit: daily_limit,
            },
            RetrievalConfig::default(),
        )
    }

    /// Store variant whose vector backend is missing.
    pub fn unavailable_store(&self) -> Arc<dyn ChunkStore> {
        Arc::new(SqliteChunkStore::new(
            self.pool.clone(),
            DIM,
            VectorBackend::Unavailable("the sqlite-vec extension is not loaded".to_string()),
        ))
    }

    pub fn indexer(&self) -> LessonIndexer {
        self.indexer_with(self.model.clone())
    }

    pub fn indexer_with(&self, embedder: Arc<dyn EmbeddingProvider>) -> LessonIndexer {
        LessonIndexer::new(
            Arc::new(SqliteLessonSource::new(self.pool.clone())),
            embedder,
            self.store.clone(),
            TextChunker::new(ChunkingConfig::new(400, 50)),
        )
    }

    pub async fn seed_user(&self, id: UserId, username: &str) {
        sqlx::query("INSERT INTO users (id, username, full_name, email) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(username)
            .bind(format!("{username} Student"))
            .bind(format!("{username}@example.edu"))
            .execute(&self.pool)
            .await
            .expect("Failed to seed user");
    }

    pub async fn seed_lesson(&self, id: LessonId, unit_code: &str, title: &str, description: &str) {
        sqlx::query(
            "INSERT INTO lessons (id, unit_code, title, description, objectives, status) \
             VALUES (?, ?, ?, ?, ?, 'published')",
        )
        .bind(id)
        .bind(unit_code)
        .bind(title)
        .bind(description)
        .bind(format!("Apply {title} in practice."))
        .execute(&self.pool)
        .await
        .expect("Failed to seed lesson");
    }

    pub async fn seed_draft_lesson(&self, id: LessonId, unit_code: &str, title: &str) {
        sqlx::query("INSERT INTO lessons (id, unit_code, title, status) VALUES (?, ?, ?, 'draft')")
            .bind(id)
            .bind(unit_code)
            .bind(title)
            .execute(&self.pool)
            .await
            .expect("Failed to seed lesson");
    }

    pub async fn enroll(&self, user_id: UserId, lesson_id: LessonId) {
        sqlx::query("INSERT INTO lesson_enrollments (user_id, lesson_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(lesson_id)
            .execute(&self.pool)
            .await
            .expect("Failed to enroll user");
    }

    /// Store chunks directly, embedding each with the mock model.
    pub async fn store_chunks(&self, lesson_id: LessonId, texts: &[&str]) {
        let chunks = texts
            .iter()
            .map(|text| NewChunk::new(*text, self.model.embed_text(text), 0))
            .collect();
        self.store
            .index(lesson_id, chunks, true)
            .await
            .expect("Failed to store chunks");
    }

    pub async fn logged_questions(&self, user_id: UserId) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM student_questions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count questions")
    }
}
