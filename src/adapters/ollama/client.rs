//! HTTP client for an Ollama-compatible model server.
//!
//! Embeddings go to `/api/embeddings`, one request per text. Chat goes to
//! the OpenAI-compatible `/v1/chat/completions` endpoint.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ChatMessage, ModelServerConfig};
use crate::domain::ports::{CompletionProvider, EmbeddingProvider};

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server root. Default: `http://localhost:11434`.
    pub base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    /// Per-request timeout for embeddings. Default: 60s.
    pub embed_timeout: Duration,
    /// Per-request timeout for chat completions. Default: 120s.
    pub chat_timeout: Duration,
    /// Expected embedding dimension. Default: 768.
    pub dimension: usize,
    /// Outbound throttle; unthrottled when `None`.
    pub requests_per_second: Option<f64>,
    pub burst_size: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::from(&ModelServerConfig::default())
    }
}

impl From<&ModelServerConfig> for OllamaConfig {
    fn from(config: &ModelServerConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            embed_timeout: Duration::from_secs(config.embed_timeout_secs),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
            dimension: config.embedding_dimension,
            requests_per_second: config.requests_per_second,
            burst_size: config.burst_size,
        }
    }
}

/// Model server client implementing both embedding and completion ports.
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::Client,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DomainError::UpstreamFailed(format!("Failed to build HTTP client: {e}")))?;

        let limiter = config
            .requests_per_second
            .and_then(|rps| build_quota(rps, config.burst_size))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn post_json<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> DomainResult<R> {
        self.throttle().await;

        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::UpstreamFailed(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(DomainError::UpstreamFailed(format!(
                "POST {path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::UpstreamFailed(format!("Malformed response from {path}: {e}")))
    }
}

fn build_quota(requests_per_second: f64, burst_size: u32) -> Option<Quota> {
    if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
        return None;
    }
    let burst = NonZeroU32::new(burst_size.max(1))?;
    Quota::with_period(Duration::from_secs_f64(1.0 / requests_per_second))
        .map(|quota| quota.allow_burst(burst))
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, texts: &[String]) -> DomainResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let request = EmbeddingRequest {
                model: &self.config.embed_model,
                prompt: text,
            };
            let response: EmbeddingResponse = self
                .post_json("/api/embeddings", &request, self.config.embed_timeout)
                .await?;
            embeddings.push(response.embedding);
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl CompletionProvider for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> DomainResult<String> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            stream: false,
        };
        let response: ChatResponse = self
            .post_json("/v1/chat/completions", &request, self.config.chat_timeout)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DomainError::UpstreamFailed("Chat response contained no choices".to_string()))
    }
}

// -- Model server request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.embed_model, "nomic-embed-text");
        assert_eq!(config.dimension, 768);
        assert_eq!(config.embed_timeout, Duration::from_secs(60));
        assert_eq!(config.chat_timeout, Duration::from_secs(120));
        assert!(config.requests_per_second.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = OllamaConfig::from(&ModelServerConfig {
            base_url: "http://models:11434/".to_string(),
            ..ModelServerConfig::default()
        });
        assert_eq!(config.base_url, "http://models:11434");
    }

    #[test]
    fn test_build_quota() {
        assert!(build_quota(2.0, 5).is_some());
        assert!(build_quota(0.5, 1).is_some());
        assert!(build_quota(0.0, 5).is_none());
        assert!(build_quota(-1.0, 5).is_none());
        assert!(build_quota(f64::NAN, 5).is_none());
    }

    #[tokio::test]
    async fn test_empty_batch_needs_no_server() {
        let client = OllamaClient::new(OllamaConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..OllamaConfig::default()
        })
        .unwrap();
        assert!(client.embed(&[]).await.unwrap().is_empty());
    }
}
