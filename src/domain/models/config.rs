use serde::{Deserialize, Serialize};

use super::chunk::ChunkingConfig;

/// Main configuration structure for the lesson assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Model server (embeddings and chat completions)
    #[serde(default)]
    pub model_server: ModelServerConfig,

    /// Chunk boundary parameters used at index time
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Context retrieval parameters
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Assistant quota configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Vector search backend selection
    #[serde(default)]
    pub vector: VectorConfig,

    /// HTTP API configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".lesson-assist/assist.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// sqlx connection URL for the configured path.
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Ollama-compatible model server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,

    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,

    /// Dimension every stored and queried vector must have
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Outbound request throttle; unthrottled when unset
    #[serde(default)]
    pub requests_per_second: Option<f64>,

    /// Burst size for the outbound throttle
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_chat_model() -> String {
    "llama3.1:8b-instruct".to_string()
}

const fn default_embed_timeout_secs() -> u64 {
    60
}

const fn default_chat_timeout_secs() -> u64 {
    120
}

const fn default_embedding_dimension() -> usize {
    768
}

const fn default_burst_size() -> u32 {
    10
}

impl Default for ModelServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_embed_model(),
            chat_model: default_chat_model(),
            embed_timeout_secs: default_embed_timeout_secs(),
            chat_timeout_secs: default_chat_timeout_secs(),
            embedding_dimension: default_embedding_dimension(),
            requests_per_second: None,
            burst_size: default_burst_size(),
        }
    }
}

/// Context retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Characters of chunk content echoed back as a source excerpt
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

const fn default_top_k() -> usize {
    5
}

const fn default_excerpt_chars() -> usize {
    150
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssistantConfig {
    /// Questions a user may ask per calendar day
    #[serde(default = "default_daily_question_limit")]
    pub daily_question_limit: u32,
}

const fn default_daily_question_limit() -> u32 {
    100
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            daily_question_limit: default_daily_question_limit(),
        }
    }
}

/// How nearest-neighbour distances are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorSearch {
    /// sqlite-vec when the extension responds, Rust scan otherwise
    #[default]
    Auto,
    /// Require sqlite-vec; the store is unavailable without it
    SqliteVec,
    /// Always compute distances in Rust
    Scan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VectorConfig {
    #[serde(default)]
    pub search: VectorSearch,
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    9200
}

const fn default_enable_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_enable_cors(),
        }
    }
}
