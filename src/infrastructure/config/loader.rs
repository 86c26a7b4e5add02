use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::Config;

/// Directory holding project-local configuration and the default database.
pub const CONFIG_DIR: &str = ".lesson-assist";

const ENV_PREFIX: &str = "LESSON_ASSIST_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Invalid chunking: overlap ({overlap}) must be smaller than target_size ({target_size})")]
    InvalidChunking { target_size: usize, overlap: usize },

    #[error("Invalid top_k: {0}. Must be at least 1")]
    InvalidTopK(usize),

    #[error("Invalid daily_question_limit: {0}. Must be at least 1")]
    InvalidDailyLimit(u32),

    #[error("Invalid embedding_dimension: {0}. Must be at least 1")]
    InvalidEmbeddingDimension(usize),

    #[error("Invalid requests_per_second: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .lesson-assist/config.yaml (project config, created by init)
    /// 3. .lesson-assist/local.yaml (local overrides, optional)
    /// 4. Environment variables (LESSON_ASSIST_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(format!("{CONFIG_DIR}/config.yaml")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// The file takes the place of the project config layers; environment
    /// variables still override it.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        if config.chunking.validate().is_err() {
            return Err(ConfigError::InvalidChunking {
                target_size: config.chunking.target_size,
                overlap: config.chunking.overlap,
            });
        }

        if config.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidTopK(config.retrieval.top_k));
        }

        if config.assistant.daily_question_limit == 0 {
            return Err(ConfigError::InvalidDailyLimit(
                config.assistant.daily_question_limit,
            ));
        }

        let model_server = &config.model_server;
        if model_server.embedding_dimension == 0 {
            return Err(ConfigError::InvalidEmbeddingDimension(
                model_server.embedding_dimension,
            ));
        }

        if let Some(rps) = model_server.requests_per_second {
            if !(rps > 0.0 && rps.is_finite()) {
                return Err(ConfigError::InvalidRateLimit(rps));
            }
        }

        if model_server.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(model_server.burst_size));
        }

        if model_server.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model_server.base_url cannot be empty".to_string(),
            ));
        }
        if model_server.embed_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model_server.embed_model cannot be empty".to_string(),
            ));
        }
        if model_server.chat_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model_server.chat_model cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
