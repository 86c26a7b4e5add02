//! Deterministic in-memory model server.
//!
//! Embeddings are hashed bag-of-words vectors, normalized to unit length,
//! so texts sharing words land close together. Completions return a
//! scripted reply. Both sides can be switched to fail, and every request is
//! counted.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ChatMessage;
use crate::domain::ports::{CompletionProvider, EmbeddingProvider};

const DEFAULT_REPLY: &str = "Here is an explanation based on your course material.";

pub struct MockModelServer {
    dimension: usize,
    reply: Mutex<String>,
    last_messages: Mutex<Vec<ChatMessage>>,
    fail_embeddings: AtomicBool,
    fail_completions: AtomicBool,
    embed_requests: AtomicUsize,
    completion_requests: AtomicUsize,
}

impl MockModelServer {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            reply: Mutex::new(DEFAULT_REPLY.to_string()),
            last_messages: Mutex::new(Vec::new()),
            fail_embeddings: AtomicBool::new(false),
            fail_completions: AtomicBool::new(false),
            embed_requests: AtomicUsize::new(0),
            completion_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.set_reply(reply);
        self
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *lock(&self.reply) = reply.into();
    }

    pub fn fail_embeddings(&self, fail: bool) {
        self.fail_embeddings.store(fail, Ordering::SeqCst);
    }

    pub fn fail_completions(&self, fail: bool) {
        self.fail_completions.store(fail, Ordering::SeqCst);
    }

    /// Embedding requests issued so far, one per text.
    pub fn embed_requests(&self) -> usize {
        self.embed_requests.load(Ordering::SeqCst)
    }

    pub fn completion_requests(&self) -> usize {
        self.completion_requests.load(Ordering::SeqCst)
    }

    /// Messages sent with the most recent completion request.
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        lock(&self.last_messages).clone()
    }

    /// The vector `embed` returns for `text`.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = fnv1a(&word.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            vector[0] = 1.0;
        } else {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl EmbeddingProvider for MockModelServer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> DomainResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            self.embed_requests.fetch_add(1, Ordering::SeqCst);
            if self.fail_embeddings.load(Ordering::SeqCst) {
                return Err(DomainError::UpstreamFailed(
                    "mock embedding endpoint is failing".to_string(),
                ));
            }
            embeddings.push(self.embed_text(text));
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl CompletionProvider for MockModelServer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> DomainResult<String> {
        self.completion_requests.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_messages) = messages.to_vec();

        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(DomainError::UpstreamFailed(
                "mock completion endpoint is failing".to_string(),
            ));
        }
        Ok(lock(&self.reply).clone())
    }
}
