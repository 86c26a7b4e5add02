mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::TestApp;
use lesson_assist::adapters::mock::MockModelServer;
use lesson_assist::adapters::sqlite::{initialize_database, PoolConfig, SqliteChunkStore, VectorBackend};
use lesson_assist::domain::errors::{DomainError, DomainResult};
use lesson_assist::domain::models::{IndexOutcome, NewChunk};
use lesson_assist::domain::ports::{ChunkStore, EmbeddingProvider};
use lesson_assist::services::{IndexOptions, LessonIndexStatus};

/// Embedder that fails any batch mentioning `marker`.
struct FailingFor {
    inner: Arc<MockModelServer>,
    marker: &'static str,
}

#[async_trait]
impl EmbeddingProvider for FailingFor {
    fn name(&self) -> &'static str {
        "failing-for"
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, texts: &[String]) -> DomainResult<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.contains(self.marker)) {
            return Err(DomainError::UpstreamFailed("embedding endpoint timed out".to_string()));
        }
        self.inner.embed(texts).await
    }
}

async fn seeded_app() -> TestApp {
    let app = TestApp::new().await;
    app.seed_lesson(1, "CS101", "Variables", "Names bound to values.").await;
    app.seed_lesson(2, "CS102", "Loops", "Repeating work with for and while.").await;
    app.seed_draft_lesson(3, "CS103", "Recursion").await;
    app
}

#[tokio::test]
async fn test_indexes_published_lessons_only() {
    let app = seeded_app().await;

    let report = app.indexer().run(IndexOptions::default()).await.unwrap();

    assert_eq!(report.lessons.len(), 2);
    assert_eq!(report.lessons_indexed, 2);
    assert_eq!(report.lessons_failed, 0);
    assert!(report.chunks_created >= 2);
    assert_eq!(app.store.count_for_lesson(3).await.unwrap(), 0);

    let chunks = app.store.chunks_for_lesson(1).await.unwrap();
    assert!(chunks[0].content.starts_with("Unit Code: CS101\n\nTitle: Variables"));
    assert!(chunks.iter().all(|c| c.token_count > 0));
}

#[tokio::test]
async fn test_second_run_without_force_is_idempotent() {
    let app = seeded_app().await;
    let indexer = app.indexer();

    indexer.run(IndexOptions::default()).await.unwrap();
    let before = app.store.chunks_for_lesson(1).await.unwrap();
    let embeds_after_first_run = app.model.embed_requests();

    let report = indexer.run(IndexOptions::default()).await.unwrap();

    assert_eq!(report.lessons_indexed, 0);
    assert_eq!(report.lessons_skipped, 2);
    assert_eq!(report.chunks_created, 0);
    assert!(matches!(
        report.lessons[0].status,
        LessonIndexStatus::Skipped { existing } if existing == before.len()
    ));
    // Skipped lessons are never embedded
    assert_eq!(app.model.embed_requests(), embeds_after_first_run);
    assert_eq!(app.store.chunks_for_lesson(1).await.unwrap(), before);
}

#[tokio::test]
async fn test_force_replaces_chunks() {
    let app = seeded_app().await;
    let indexer = app.indexer();

    indexer
        .run(IndexOptions { lesson_id: Some(1), force: false })
        .await
        .unwrap();
    let before = app.store.chunks_for_lesson(1).await.unwrap();

    let report = indexer
        .run(IndexOptions { lesson_id: Some(1), force: true })
        .await
        .unwrap();

    assert_eq!(report.lessons.len(), 1);
    assert_eq!(
        report.lessons[0].status,
        LessonIndexStatus::Indexed { chunks: before.len(), replaced: true }
    );

    let after = app.store.chunks_for_lesson(1).await.unwrap();
    assert_eq!(after.len(), before.len());
    assert_eq!(
        after.iter().map(|c| &c.content).collect::<Vec<_>>(),
        before.iter().map(|c| &c.content).collect::<Vec<_>>()
    );
    assert!(after.iter().zip(&before).all(|(a, b)| a.id != b.id));
}

#[tokio::test]
async fn test_failed_lesson_does_not_stop_the_run() {
    let app = seeded_app().await;
    let indexer = app.indexer_with(Arc::new(FailingFor {
        inner: app.model.clone(),
        marker: "Loops",
    }));

    let report = indexer.run(IndexOptions::default()).await.unwrap();

    assert_eq!(report.lessons_indexed, 1);
    assert_eq!(report.lessons_failed, 1);
    match &report.lessons[1].status {
        LessonIndexStatus::Failed { error } => assert!(error.contains("timed out")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(app.store.count_for_lesson(1).await.unwrap() > 0);
    assert_eq!(app.store.count_for_lesson(2).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_lesson_filter() {
    let app = seeded_app().await;

    let result = app
        .indexer()
        .run(IndexOptions { lesson_id: Some(3), force: false })
        .await;

    assert!(matches!(result, Err(DomainError::LessonNotFound(3))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_reader_never_sees_empty_lesson_during_reindex() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("assist.db").display());
    let pool = initialize_database(&url, Some(PoolConfig::with_max_connections(4)))
        .await
        .unwrap();
    sqlx::query("INSERT INTO lessons (id, unit_code, title, status) VALUES (1, 'CS101', 'Variables', 'published')")
        .execute(&pool)
        .await
        .unwrap();

    let model = MockModelServer::new(common::DIM);
    let chunks = |round: usize| -> Vec<NewChunk> {
        (0..3)
            .map(|i| {
                let text = format!("round {round} chunk {i}");
                NewChunk::new(text.as_str(), model.embed_text(&text), 4)
            })
            .collect()
    };

    let writer = SqliteChunkStore::new(pool.clone(), common::DIM, VectorBackend::Scan);
    writer.index(1, chunks(0), false).await.unwrap();

    let reader = SqliteChunkStore::new(pool.clone(), common::DIM, VectorBackend::Scan);
    let done = Arc::new(AtomicBool::new(false));
    let reader_task = {
        let done = done.clone();
        tokio::spawn(async move {
            let mut observed = Vec::new();
            while !done.load(Ordering::SeqCst) {
                observed.push(reader.count_for_lesson(1).await.unwrap());
                tokio::task::yield_now().await;
            }
            observed
        })
    };

    for round in 1..=25 {
        let outcome = writer.index(1, chunks(round), true).await.unwrap();
        assert_eq!(outcome, IndexOutcome::Replaced { removed: 3, chunks: 3 });
    }
    done.store(true, Ordering::SeqCst);

    let observed = reader_task.await.unwrap();
    assert!(!observed.is_empty());
    assert!(observed.iter().all(|&count| count == 3), "reader saw {observed:?}");

    let stored = writer.chunks_for_lesson(1).await.unwrap();
    assert!(stored.iter().all(|c| c.content.starts_with("round 25 ")));
}
