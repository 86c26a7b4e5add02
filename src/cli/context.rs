//! Wiring from configuration to services.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::ollama::{OllamaClient, OllamaConfig};
use crate::adapters::sqlite::{
    initialize_database, PoolConfig, SqliteChunkStore, SqliteLessonSource, SqliteProfileProvider,
    SqliteQuestionLog,
};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{AssistantService, LessonIndexer, TextChunker};

/// Load configuration from an explicit file, or from the project layers.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Shared handles for one CLI invocation.
pub struct AppContext {
    pub config: Config,
    pub pool: SqlitePool,
    pub store: Arc<SqliteChunkStore>,
    pub model_server: Arc<OllamaClient>,
}

impl AppContext {
    /// Open the database (applying migrations) and build the adapters.
    pub async fn connect(config: Config) -> Result<Self> {
        let pool = initialize_database(
            &config.database.url(),
            Some(PoolConfig::with_max_connections(config.database.max_connections)),
        )
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;

        let store = Arc::new(
            SqliteChunkStore::connect(
                pool.clone(),
                config.model_server.embedding_dimension,
                config.vector.search,
            )
            .await,
        );

        let model_server = Arc::new(
            OllamaClient::new(OllamaConfig::from(&config.model_server))
                .context("Failed to build model server client")?,
        );

        Ok(Self {
            config,
            pool,
            store,
            model_server,
        })
    }

    pub fn assistant(&self) -> AssistantService {
        AssistantService::new(
            self.store.clone(),
            self.model_server.clone(),
            self.model_server.clone(),
            Arc::new(SqliteProfileProvider::new(self.pool.clone())),
            Arc::new(SqliteQuestionLog::new(self.pool.clone())),
            self.config.assistant.clone(),
            self.config.retrieval.clone(),
        )
    }

    pub fn indexer(&self) -> LessonIndexer {
        LessonIndexer::new(
            Arc::new(SqliteLessonSource::new(self.pool.clone())),
            self.model_server.clone(),
            self.store.clone(),
            TextChunker::new(self.config.chunking.clone()),
        )
    }
}
