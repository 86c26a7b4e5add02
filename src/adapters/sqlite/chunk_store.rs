//! SQLite implementation of the ChunkStore.
//!
//! Distances come from sqlite-vec's `vec_distance_cosine()` when the
//! extension is loaded, or from an exact scan in Rust otherwise.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{bytes_to_embedding, embedding_to_bytes, format_datetime, parse_datetime, to_count};
use crate::adapters::sqlite::extensions::is_vec_available;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    DocumentChunk, IndexOutcome, LessonId, LessonScope, NewChunk, ScoredChunk, VectorSearch,
};
use crate::domain::ports::ChunkStore;

/// How `nearest` computes distances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorBackend {
    SqliteVec,
    Scan,
    /// sqlite-vec was required but does not respond
    Unavailable(String),
}

impl VectorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SqliteVec => "sqlite-vec",
            Self::Scan => "scan",
            Self::Unavailable(_) => "unavailable",
        }
    }

    /// Resolve the configured search mode against what the pool supports.
    pub async fn probe(pool: &SqlitePool, search: VectorSearch) -> Self {
        match search {
            VectorSearch::Scan => Self::Scan,
            VectorSearch::Auto => {
                if is_vec_available(pool).await {
                    Self::SqliteVec
                } else {
                    Self::Scan
                }
            }
            VectorSearch::SqliteVec => {
                if is_vec_available(pool).await {
                    Self::SqliteVec
                } else {
                    Self::Unavailable("the sqlite-vec extension is not loaded".to_string())
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct SqliteChunkStore {
    pool: SqlitePool,
    dimension: usize,
    backend: VectorBackend,
}

impl SqliteChunkStore {
    pub fn new(pool: SqlitePool, dimension: usize, backend: VectorBackend) -> Self {
        Self {
            pool,
            dimension,
            backend,
        }
    }

    /// Build a store, probing the pool for the configured search backend.
    pub async fn connect(pool: SqlitePool, dimension: usize, search: VectorSearch) -> Self {
        let backend = VectorBackend::probe(&pool, search).await;
        tracing::info!(backend = backend.as_str(), dimension, "chunk store ready");
        Self::new(pool, dimension, backend)
    }

    fn check_dimension(&self, vector: &[f32]) -> DomainResult<()> {
        if vector.len() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// A zero vector has no direction, so cosine distance is undefined.
    fn check_norm(vector: &[f32], what: &str) -> DomainResult<()> {
        if vector.iter().all(|x| *x == 0.0) {
            return Err(DomainError::ValidationFailed(format!("{what} is a zero vector")));
        }
        Ok(())
    }

    async fn nearest_sqlite_vec(
        &self,
        query: &[f32],
        limit: usize,
        scope: LessonScope,
    ) -> DomainResult<Vec<ScoredChunk>> {
        // Rows stored as zero vectors sort last, as they do in the scan.
        let (clause, lesson_id) = scope_clause(scope);
        let sql = format!(
            "SELECT c.id, c.lesson_id, l.unit_code, l.title, c.content,
                    CASE WHEN vec_distance_l2(c.embedding, ?) = 0 THEN ?
                         ELSE vec_distance_cosine(c.embedding, ?) END AS distance
             FROM document_chunks c
             JOIN lessons l ON l.id = c.lesson_id
             WHERE {clause}
             ORDER BY distance ASC, c.id ASC
             LIMIT ?"
        );

        let mut q = sqlx::query_as::<_, ScoredRow>(&sql)
            .bind(embedding_to_bytes(&vec![0.0; self.dimension]))
            .bind(f64::from(f32::MAX))
            .bind(embedding_to_bytes(query));
        if let Some(lesson_id) = lesson_id {
            q = q.bind(lesson_id);
        }
        let rows = q.bind(limit_param(limit)).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(ScoredChunk::from).collect())
    }

    async fn nearest_scan(
        &self,
        query: &[f32],
        limit: usize,
        scope: LessonScope,
    ) -> DomainResult<Vec<ScoredChunk>> {
        let (clause, lesson_id) = scope_clause(scope);
        let sql = format!(
            "SELECT c.id, c.lesson_id, l.unit_code, l.title, c.content, c.embedding
             FROM document_chunks c
             JOIN lessons l ON l.id = c.lesson_id
             WHERE {clause}"
        );

        let mut q = sqlx::query_as::<_, ScanRow>(&sql);
        if let Some(lesson_id) = lesson_id {
            q = q.bind(lesson_id);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let mut scored = rows
            .into_iter()
            .map(|row| {
                let embedding = bytes_to_embedding(&row.embedding)?;
                Ok(ScoredChunk {
                    chunk_id: row.id,
                    lesson_id: row.lesson_id,
                    lesson_code: row.unit_code,
                    lesson_title: row.title,
                    content: row.content,
                    distance: cosine_distance(query, &embedding),
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        scored.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        scored.truncate(limit);
        Ok(scored)
    }
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    fn unavailable_reason(&self) -> Option<String> {
        match &self.backend {
            VectorBackend::Unavailable(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn index(
        &self,
        lesson_id: LessonId,
        chunks: Vec<NewChunk>,
        force: bool,
    ) -> DomainResult<IndexOutcome> {
        if chunks.is_empty() {
            return Err(DomainError::ValidationFailed(format!(
                "no chunks to index for lesson {lesson_id}"
            )));
        }
        for chunk in &chunks {
            self.check_dimension(&chunk.embedding)?;
            Self::check_norm(&chunk.embedding, "chunk embedding")?;
        }

        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document_chunks WHERE lesson_id = ?")
            .bind(lesson_id)
            .fetch_one(&mut *tx)
            .await?;
        let existing = to_count(existing);

        if existing > 0 && !force {
            return Ok(IndexOutcome::Skipped { existing });
        }

        if existing > 0 {
            sqlx::query("DELETE FROM document_chunks WHERE lesson_id = ?")
                .bind(lesson_id)
                .execute(&mut *tx)
                .await?;
        }

        let created_at = format_datetime(&Utc::now());
        let count = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO document_chunks (lesson_id, chunk_index, content, embedding, token_count, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(lesson_id)
            .bind(i64::try_from(index).unwrap_or(i64::MAX))
            .bind(&chunk.content)
            .bind(embedding_to_bytes(&chunk.embedding))
            .bind(i64::from(chunk.token_count))
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        if existing > 0 {
            Ok(IndexOutcome::Replaced {
                removed: existing,
                chunks: count,
            })
        } else {
            Ok(IndexOutcome::Inserted { chunks: count })
        }
    }

    async fn nearest(
        &self,
        query: &[f32],
        limit: usize,
        scope: LessonScope,
    ) -> DomainResult<Vec<ScoredChunk>> {
        self.check_dimension(query)?;
        Self::check_norm(query, "query embedding")?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        match &self.backend {
            VectorBackend::SqliteVec => self.nearest_sqlite_vec(query, limit, scope).await,
            VectorBackend::Scan => self.nearest_scan(query, limit, scope).await,
            VectorBackend::Unavailable(reason) => Err(DomainError::StoreUnavailable(reason.clone())),
        }
    }

    async fn count_for_lesson(&self, lesson_id: LessonId) -> DomainResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document_chunks WHERE lesson_id = ?")
            .bind(lesson_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(count))
    }

    async fn chunks_for_lesson(&self, lesson_id: LessonId) -> DomainResult<Vec<DocumentChunk>> {
        let rows: Vec<ChunkRow> = sqlx::query_as(
            "SELECT id, lesson_id, chunk_index, content, embedding, token_count, created_at
             FROM document_chunks WHERE lesson_id = ? ORDER BY chunk_index",
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

/// Cosine distance, `1 - cos(a, b)`. Mismatched lengths and zero vectors
/// sort last.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return f32::MAX;
    }

    1.0 - (dot / (mag_a * mag_b))
}

fn scope_clause(scope: LessonScope) -> (&'static str, Option<LessonId>) {
    match scope {
        LessonScope::All => ("1 = 1", None),
        LessonScope::Only(id) => ("c.lesson_id = ?", Some(id)),
        LessonScope::Except(id) => ("c.lesson_id <> ?", Some(id)),
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[derive(sqlx::FromRow)]
struct ScoredRow {
    id: i64,
    lesson_id: i64,
    unit_code: String,
    title: String,
    content: String,
    distance: f64,
}

impl From<ScoredRow> for ScoredChunk {
    fn from(row: ScoredRow) -> Self {
        Self {
            chunk_id: row.id,
            lesson_id: row.lesson_id,
            lesson_code: row.unit_code,
            lesson_title: row.title,
            content: row.content,
            distance: row.distance as f32,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScanRow {
    id: i64,
    lesson_id: i64,
    unit_code: String,
    title: String,
    content: String,
    embedding: Vec<u8>,
}

#[derive(sqlx::FromRow)]
struct ChunkRow {
    id: i64,
    lesson_id: i64,
    chunk_index: i64,
    content: String,
    embedding: Vec<u8>,
    token_count: i64,
    created_at: String,
}

impl TryFrom<ChunkRow> for DocumentChunk {
    type Error = DomainError;

    fn try_from(row: ChunkRow) -> Result<Self, Self::Error> {
        Ok(DocumentChunk {
            id: row.id,
            lesson_id: row.lesson_id,
            chunk_index: u32::try_from(row.chunk_index)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
            content: row.content,
            embedding: bytes_to_embedding(&row.embedding)?,
            token_count: u32::try_from(row.token_count)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
